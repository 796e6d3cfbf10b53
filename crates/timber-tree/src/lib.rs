//! Decision-tree induction: instances, label summaries, split scoring,
//! termination rules, and the recursive tree builder.
//!
//! Trees are grown greedily over attribute maps holding numeric and
//! categorical values. Split candidates are scored by a pluggable
//! [`Scorer`], evaluated in parallel across attributes via rayon, and
//! reduced in a fixed order so repeated builds are identical.

mod classification;
mod error;
mod instance;
mod model;
mod node;
mod prediction;
mod split;
mod termination;
mod tree;

pub use classification::{BinaryClassificationProperties, ClassificationProperties};
pub use error::TreeError;
pub use instance::{AttributeValue, Attributes, Instance, Label};
pub use model::{LabelPredictionWeight, PredictiveModel, PredictiveModelBuilder};
pub use node::{Node, NodeIndex, SplitPredicate};
pub use prediction::PredictionMap;
pub use split::{Impurity, Scorer, SplitCriterion};
pub use termination::TerminationPolicy;
pub use tree::{DecisionTree, DecisionTreeBuilder};
