//! Stopping rules for recursive tree growth.

use crate::error::TreeError;

/// Immutable set of conditions deciding whether a node may split.
///
/// Construct via [`TerminationPolicy::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter            | Default |
/// |----------------------|---------|
/// | `max_depth`          | 10      |
/// | `min_leaf_instances` | 1       |
/// | `min_leaf_weight`    | 0.0     |
/// | `min_score_gain`     | 0.0     |
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TerminationPolicy {
    pub(crate) max_depth: usize,
    pub(crate) min_leaf_instances: usize,
    pub(crate) min_leaf_weight: f64,
    pub(crate) min_score_gain: f64,
}

impl TerminationPolicy {
    /// Create a policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 10,
            min_leaf_instances: 1,
            min_leaf_weight: 0.0,
            min_score_gain: 0.0,
        }
    }

    /// Set the maximum tree depth (root is depth 0; 0 yields a single leaf).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of instances each child of a split must receive.
    #[must_use]
    pub fn with_min_leaf_instances(mut self, min_leaf_instances: usize) -> Self {
        self.min_leaf_instances = min_leaf_instances;
        self
    }

    /// Set the minimum total weight each child of a split must receive.
    #[must_use]
    pub fn with_min_leaf_weight(mut self, min_leaf_weight: f64) -> Self {
        self.min_leaf_weight = min_leaf_weight;
        self
    }

    /// Set the score gain a split must exceed to be accepted.
    #[must_use]
    pub fn with_min_score_gain(mut self, min_score_gain: f64) -> Self {
        self.min_score_gain = min_score_gain;
        self
    }

    // --- Getters ---

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the minimum instance count per child.
    #[must_use]
    pub fn min_leaf_instances(&self) -> usize {
        self.min_leaf_instances
    }

    /// Return the minimum weight per child.
    #[must_use]
    pub fn min_leaf_weight(&self) -> f64 {
        self.min_leaf_weight
    }

    /// Return the minimum score gain.
    #[must_use]
    pub fn min_score_gain(&self) -> f64 {
        self.min_score_gain
    }

    /// Check that every threshold is in range.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                    |
    /// |---------------------------------------|-----------------------------------------|
    /// | [`TreeError::InvalidMinLeafInstances`]| `min_leaf_instances` is 0               |
    /// | [`TreeError::InvalidMinLeafWeight`]   | `min_leaf_weight` negative or non-finite|
    /// | [`TreeError::InvalidMinScoreGain`]    | `min_score_gain` negative or non-finite |
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.min_leaf_instances < 1 {
            return Err(TreeError::InvalidMinLeafInstances {
                min_leaf_instances: self.min_leaf_instances,
            });
        }
        if !self.min_leaf_weight.is_finite() || self.min_leaf_weight < 0.0 {
            return Err(TreeError::InvalidMinLeafWeight {
                min_leaf_weight: self.min_leaf_weight,
            });
        }
        if !self.min_score_gain.is_finite() || self.min_score_gain < 0.0 {
            return Err(TreeError::InvalidMinScoreGain {
                min_score_gain: self.min_score_gain,
            });
        }
        Ok(())
    }

    /// Pre-split check: `true` when a node at `depth` with `n_instances`
    /// instances of total `weight` cannot be split.
    ///
    /// A node stops at the depth limit, or when it is too small to give both
    /// children their minimum count and weight.
    #[must_use]
    pub fn should_stop(&self, depth: usize, n_instances: usize, weight: f64) -> bool {
        depth >= self.max_depth
            || n_instances < self.min_leaf_instances.saturating_mul(2)
            || weight < 2.0 * self.min_leaf_weight
    }

    /// Return `true` if a child with `n_instances` and `weight` is large enough.
    #[must_use]
    pub fn admits_child(&self, n_instances: usize, weight: f64) -> bool {
        n_instances >= self.min_leaf_instances && weight >= self.min_leaf_weight
    }

    /// Post-split check: `true` when `gain` is worth splitting for.
    #[must_use]
    pub fn accepts_gain(&self, gain: f64) -> bool {
        gain > self.min_score_gain
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::new()
    }
}
