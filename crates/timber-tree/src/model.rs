//! Capabilities shared by predictive models and the harnesses that evaluate them.

use crate::instance::{Attributes, Instance, Label};
use crate::prediction::PredictionMap;

/// A validation instance's true label, the model's prediction and the
/// instance weight.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPredictionWeight<L: Label> {
    /// True label.
    pub label: L,
    /// Predicted label distribution.
    pub prediction: PredictionMap<L>,
    /// Instance weight.
    pub weight: f64,
}

/// A fitted model producing label distributions.
pub trait PredictiveModel<L: Label> {
    /// Predict a label distribution for `attributes`.
    fn predict(&self, attributes: &Attributes) -> PredictionMap<L>;

    /// Score every instance, in order.
    fn score_all(&self, instances: &[Instance<L>]) -> Vec<LabelPredictionWeight<L>> {
        instances
            .iter()
            .map(|instance| LabelPredictionWeight {
                label: instance.label().clone(),
                prediction: self.predict(instance.attributes()),
                weight: instance.weight(),
            })
            .collect()
    }
}

/// Builds a [`PredictiveModel`] from training instances.
pub trait PredictiveModelBuilder<L: Label> {
    /// The model produced.
    type Model: PredictiveModel<L>;
    /// Error raised when a model cannot be built.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a model from `training_data`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; see [`Self::Error`].
    fn build(&self, training_data: &[Instance<L>]) -> Result<Self::Model, Self::Error>;
}
