//! Per-round progress reporting.

use chrono::{DateTime, Utc};
use tracing::debug;

/// Outcome of one train/validate round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    /// Zero-based round index.
    pub round: usize,
    /// Number of instances the model was trained on.
    pub training_instances: usize,
    /// Number of instances validated.
    pub validation_instances: usize,
    /// Total weight of the validated instances.
    pub validation_weight: f64,
    /// Inclusive lower time bound of the validation window.
    pub validation_start: DateTime<Utc>,
    /// Exclusive upper time bound of the validation window.
    pub validation_end: DateTime<Utc>,
    /// Loss over this round's validation window.
    pub loss: f64,
    /// Weighted average loss over all rounds so far; `None` while the
    /// accumulated weight is zero.
    pub running_average_loss: Option<f64>,
}

/// Receives a [`RoundSummary`] after every completed round.
///
/// Closures `FnMut(&RoundSummary)` implement it.
pub trait RoundObserver {
    /// Called once per round, in round order.
    fn on_round(&mut self, summary: &RoundSummary);
}

impl<F> RoundObserver for F
where
    F: FnMut(&RoundSummary),
{
    fn on_round(&mut self, summary: &RoundSummary) {
        self(summary);
    }
}

/// Emits each round as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl RoundObserver for LoggingObserver {
    fn on_round(&mut self, summary: &RoundSummary) {
        debug!(
            round = summary.round,
            training = summary.training_instances,
            validation = summary.validation_instances,
            validation_weight = summary.validation_weight,
            start = %summary.validation_start,
            loss = summary.loss,
            running_average = ?summary.running_average_loss,
            "round complete"
        );
    }
}
