//! Out-of-time cross-validation for predictive models.
//!
//! Instances are sorted by a caller-supplied timestamp. A model is trained on
//! everything before a validation window, scored on the window, and the
//! window slides forward until the held-out suffix is exhausted. Per-round
//! losses are averaged, weighted by each window's total instance weight.

mod config;
mod error;
mod loss;
mod observer;
mod time;
mod validator;
mod window;

pub use config::{DEFAULT_FRACTION_FOR_VALIDATION, OutOfTimeConfig};
pub use error::CvError;
pub use loss::{LossFunction, NonWeightedAucLoss};
pub use observer::{LoggingObserver, RoundObserver, RoundSummary};
pub use time::TimeExtractor;
pub use validator::{CancellationFlag, CrossValidationResult, OutOfTimeCrossValidator, RunningLoss};
pub use window::{SortedDataset, TimeSlice, TimeSlices};
