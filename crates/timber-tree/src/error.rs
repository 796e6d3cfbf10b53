/// Errors from decision-tree construction.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Returned when the training dataset has zero instances.
    #[error("training dataset has zero instances")]
    EmptyDataset,

    /// Returned when an instance weight is negative, NaN or infinite.
    #[error("instance weight must be finite and non-negative, got {weight}")]
    InvalidWeight {
        /// The invalid weight provided.
        weight: f64,
    },

    /// Returned when min_leaf_instances is zero.
    #[error("min_leaf_instances must be at least 1, got {min_leaf_instances}")]
    InvalidMinLeafInstances {
        /// The invalid min_leaf_instances value provided.
        min_leaf_instances: usize,
    },

    /// Returned when min_leaf_weight is negative or non-finite.
    #[error("min_leaf_weight must be finite and non-negative, got {min_leaf_weight}")]
    InvalidMinLeafWeight {
        /// The invalid min_leaf_weight value provided.
        min_leaf_weight: f64,
    },

    /// Returned when min_score_gain is negative or non-finite.
    #[error("min_score_gain must be finite and non-negative, got {min_score_gain}")]
    InvalidMinScoreGain {
        /// The invalid min_score_gain value provided.
        min_score_gain: f64,
    },
}
