//! Configuration for out-of-time cross-validation.

use chrono::TimeDelta;

use crate::error::CvError;

/// Validation fraction used by [`OutOfTimeConfig::with_slice_hours`].
pub const DEFAULT_FRACTION_FOR_VALIDATION: f64 = 0.25;

/// Sliding-window parameters.
///
/// # Defaults
///
/// | Parameter                 | Default |
/// |---------------------------|---------|
/// | `fraction_for_validation` | 0.25    |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfTimeConfig {
    fraction_for_validation: f64,
    slice_duration: TimeDelta,
}

impl OutOfTimeConfig {
    /// Create a config holding out `fraction_for_validation` of the
    /// time-sorted data, validated in slices of `slice_duration`.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                  |
    /// |-----------------------------------|---------------------------------------|
    /// | [`CvError::InvalidFraction`]      | fraction not in (0.0, 1.0) or NaN     |
    /// | [`CvError::InvalidSliceDuration`] | `slice_duration` is zero or negative  |
    pub fn new(fraction_for_validation: f64, slice_duration: TimeDelta) -> Result<Self, CvError> {
        if !(fraction_for_validation > 0.0 && fraction_for_validation < 1.0) {
            return Err(CvError::InvalidFraction {
                fraction: fraction_for_validation,
            });
        }
        if slice_duration <= TimeDelta::zero() {
            return Err(CvError::InvalidSliceDuration {
                duration: slice_duration,
            });
        }
        Ok(Self {
            fraction_for_validation,
            slice_duration,
        })
    }

    /// Create a config with the default fraction and slices of `hours` hours.
    ///
    /// # Errors
    ///
    /// Returns [`CvError::InvalidSliceDuration`] when `hours` is zero.
    pub fn with_slice_hours(hours: u32) -> Result<Self, CvError> {
        Self::new(
            DEFAULT_FRACTION_FOR_VALIDATION,
            TimeDelta::hours(i64::from(hours)),
        )
    }

    /// Return the fraction of data held out for validation.
    #[must_use]
    pub fn fraction_for_validation(&self) -> f64 {
        self.fraction_for_validation
    }

    /// Return the width of each validation slice.
    #[must_use]
    pub fn slice_duration(&self) -> TimeDelta {
        self.slice_duration
    }

    /// Return the initial training-window size for `n_instances` instances:
    /// `floor(n * (1 - fraction))`.
    #[must_use]
    pub fn initial_training_size(&self, n_instances: usize) -> usize {
        ((n_instances as f64) * (1.0 - self.fraction_for_validation)).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_bounds() {
        let day = TimeDelta::days(1);
        assert!(OutOfTimeConfig::new(0.25, day).is_ok());
        for bad in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(matches!(
                OutOfTimeConfig::new(bad, day),
                Err(CvError::InvalidFraction { .. })
            ));
        }
    }

    #[test]
    fn non_positive_duration_rejected() {
        assert!(matches!(
            OutOfTimeConfig::new(0.25, TimeDelta::zero()),
            Err(CvError::InvalidSliceDuration { .. })
        ));
        assert!(OutOfTimeConfig::new(0.25, TimeDelta::hours(-1)).is_err());
        assert!(OutOfTimeConfig::with_slice_hours(0).is_err());
    }

    #[test]
    fn slice_hours_uses_default_fraction() {
        let config = OutOfTimeConfig::with_slice_hours(24).unwrap();
        assert_eq!(config.slice_duration(), TimeDelta::days(1));
        assert!((config.fraction_for_validation() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn initial_training_size_floors() {
        let config = OutOfTimeConfig::new(0.25, TimeDelta::hours(1)).unwrap();
        assert_eq!(config.initial_training_size(1000), 750);
        assert_eq!(config.initial_training_size(10), 7);
        assert_eq!(config.initial_training_size(1), 0);
        let tiny = OutOfTimeConfig::new(0.01, TimeDelta::hours(1)).unwrap();
        assert_eq!(tiny.initial_training_size(50), 49);
        assert_eq!(tiny.initial_training_size(10), 9);
    }
}
