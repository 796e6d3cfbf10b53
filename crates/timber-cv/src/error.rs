use chrono::TimeDelta;

/// Errors from out-of-time cross-validation.
#[derive(Debug, thiserror::Error)]
pub enum CvError {
    /// Returned when the validation fraction is not strictly between 0 and 1.
    #[error("fraction_for_validation must be in (0.0, 1.0), got {fraction}")]
    InvalidFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },

    /// Returned when the validation slice duration is zero or negative.
    #[error("validation slice duration must be positive, got {duration}")]
    InvalidSliceDuration {
        /// The invalid duration provided.
        duration: TimeDelta,
    },

    /// Returned when there are no instances to cross-validate on.
    #[error("cross-validation dataset has zero instances")]
    EmptyDataset,

    /// Returned when the fraction leaves no instance for the first validation window.
    #[error(
        "fraction_for_validation {fraction} leaves no validation instances out of {n_instances}"
    )]
    EmptyValidationSet {
        /// Number of instances in the dataset.
        n_instances: usize,
        /// The configured validation fraction.
        fraction: f64,
    },

    /// Returned when the model builder fails; the run stops at that round.
    #[error("model build failed in round {round}")]
    ModelBuild {
        /// Zero-based round index.
        round: usize,
        /// The builder's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Returned when an average loss is requested but no round ran.
    #[error("no validation round was executed")]
    NoValidationRounds,

    /// Returned when every validation window had zero total weight.
    #[error("validation windows over {rounds} rounds have zero total weight")]
    ZeroValidationWeight {
        /// Number of rounds executed.
        rounds: usize,
    },

    /// Returned when the run was cancelled at a round boundary.
    #[error("cross-validation cancelled after {completed_rounds} rounds")]
    Cancelled {
        /// Rounds fully completed before cancellation.
        completed_rounds: usize,
    },
}
