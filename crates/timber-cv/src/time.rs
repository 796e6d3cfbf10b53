use chrono::{DateTime, Utc};
use timber_tree::Instance;

/// Derives the timestamp of an instance.
///
/// Must be a total, deterministic function of the instance; it drives both
/// sorting and windowing. Closures `Fn(&Instance<L>) -> DateTime<Utc>`
/// implement it.
pub trait TimeExtractor<L> {
    /// Return the instance's timestamp.
    fn extract_time(&self, instance: &Instance<L>) -> DateTime<Utc>;
}

impl<L, F> TimeExtractor<L> for F
where
    F: Fn(&Instance<L>) -> DateTime<Utc>,
{
    fn extract_time(&self, instance: &Instance<L>) -> DateTime<Utc> {
        self(instance)
    }
}
