use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    TreeError,
    classification::ClassificationProperties,
    instance::{Attributes, Instance, Label},
    model::{PredictiveModel, PredictiveModelBuilder},
    node::{Node, NodeIndex},
    prediction::PredictionMap,
    split::{Scorer, SplitCriterion, find_best_split},
    termination::TerminationPolicy,
};

/// Builder for a binary classification tree.
///
/// Construct via [`DecisionTreeBuilder::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter     | Default                        |
/// |---------------|--------------------------------|
/// | `scorer`      | [`SplitCriterion::Gini`]       |
/// | `termination` | [`TerminationPolicy::default`] |
#[derive(Debug, Clone)]
pub struct DecisionTreeBuilder {
    scorer: Arc<dyn Scorer>,
    termination: TerminationPolicy,
}

impl DecisionTreeBuilder {
    /// Create a builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            scorer: Arc::new(SplitCriterion::Gini),
            termination: TerminationPolicy::default(),
        }
    }

    /// Set the split scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: impl Scorer + 'static) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    /// Set the termination policy.
    #[must_use]
    pub fn with_termination(mut self, termination: TerminationPolicy) -> Self {
        self.termination = termination;
        self
    }

    /// Return the split scorer.
    #[must_use]
    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Return the termination policy.
    #[must_use]
    pub fn termination(&self) -> &TerminationPolicy {
        &self.termination
    }

    /// Build a decision tree from `instances`.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                |
    /// |----------------------------------------|-------------------------------------|
    /// | [`TreeError::EmptyDataset`]            | `instances` is empty                |
    /// | [`TreeError::InvalidMinLeafInstances`] | policy `min_leaf_instances` is 0    |
    /// | [`TreeError::InvalidMinLeafWeight`]    | policy `min_leaf_weight` is invalid |
    /// | [`TreeError::InvalidMinScoreGain`]     | policy `min_score_gain` is invalid  |
    #[instrument(skip(self, instances), fields(n_instances = instances.len()))]
    pub fn build<L: Label>(&self, instances: &[Instance<L>]) -> Result<DecisionTree<L>, TreeError> {
        if instances.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        self.termination.validate()?;

        let labels: Vec<L> = ClassificationProperties::from_instances(instances)
            .labels()
            .into_iter()
            .collect();
        let label_ids: Vec<usize> = instances
            .iter()
            .map(|instance| labels.partition_point(|l| l < instance.label()))
            .collect();

        debug!(n_labels = labels.len(), "building decision tree");

        let grower = Grower {
            instances,
            label_ids: &label_ids,
            n_labels: labels.len(),
            scorer: self.scorer.as_ref(),
            termination: &self.termination,
        };
        let sample_indices: Vec<usize> = (0..instances.len()).collect();
        let mut arena: Vec<Node<L>> = Vec::new();
        let root = grower.grow(&sample_indices, 0, &mut arena);

        debug!(
            root_index = root.index(),
            n_nodes = arena.len(),
            "decision tree built"
        );

        Ok(DecisionTree {
            nodes: arena,
            labels,
        })
    }
}

impl Default for DecisionTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> PredictiveModelBuilder<L> for DecisionTreeBuilder {
    type Model = DecisionTree<L>;
    type Error = TreeError;

    fn build(&self, training_data: &[Instance<L>]) -> Result<DecisionTree<L>, TreeError> {
        DecisionTreeBuilder::build(self, training_data)
    }
}

/// Per-build state shared by every recursion step.
struct Grower<'a, L> {
    instances: &'a [Instance<L>],
    label_ids: &'a [usize],
    n_labels: usize,
    scorer: &'a dyn Scorer,
    termination: &'a TerminationPolicy,
}

impl<L: Label> Grower<'_, L> {
    /// Recursively grow the subtree over `sample_indices`.
    ///
    /// Returns the [`NodeIndex`] of the node just created in `arena`.
    fn grow(&self, sample_indices: &[usize], depth: usize, arena: &mut Vec<Node<L>>) -> NodeIndex {
        let n_instances = sample_indices.len();
        let classification = ClassificationProperties::from_instances(
            sample_indices.iter().map(|&si| &self.instances[si]),
        );

        let mut class_weights = vec![0.0f64; self.n_labels];
        for &si in sample_indices {
            class_weights[self.label_ids[si]] += self.instances[si].weight();
        }
        let weight: f64 = class_weights.iter().sum();

        let make_leaf = |arena: &mut Vec<Node<L>>, classification: ClassificationProperties<L>| {
            let idx = arena.len();
            arena.push(Node::Leaf {
                classification,
                weight,
            });
            NodeIndex::new(idx)
        };

        // Stopping conditions → leaf.
        let pure = classification.n_labels() <= 1;
        if pure || self.termination.should_stop(depth, n_instances, weight) {
            return make_leaf(arena, classification);
        }

        let split = match find_best_split(
            self.instances,
            self.label_ids,
            sample_indices,
            &class_weights,
            self.scorer,
            self.termination,
        ) {
            Some(s) if self.termination.accepts_gain(s.score_gain) => s,
            _ => return make_leaf(arena, classification),
        };

        // Arena pattern: reserve index, recurse, then overwrite with the split.
        let node_idx = arena.len();
        arena.push(Node::Leaf {
            classification,
            weight,
        });

        let left = self.grow(&split.left_indices, depth + 1, arena);
        let right = self.grow(&split.right_indices, depth + 1, arena);

        arena[node_idx] = Node::Split {
            attribute: split.attribute,
            predicate: split.predicate,
            left,
            right,
            n_instances,
            weight,
            score_gain: split.score_gain,
        };

        NodeIndex::new(node_idx)
    }
}

/// A fitted classification tree.
///
/// Stored as an arena-based `Vec<Node>` rooted at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree<L> {
    nodes: Vec<Node<L>>,
    labels: Vec<L>,
}

impl<L: Label> DecisionTree<L> {
    /// Return the label counts of the leaf `attributes` reaches.
    ///
    /// Traverses from the root: at each split, goes left when the predicate
    /// matches, right otherwise (including when the attribute is missing).
    #[must_use]
    pub fn classification_for(&self, attributes: &Attributes) -> &ClassificationProperties<L> {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { classification, .. } => return classification,
                Node::Split {
                    attribute,
                    predicate,
                    left,
                    right,
                    ..
                } => {
                    idx = if predicate.matches(attributes.get(attribute)) {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    /// Return the probability the tree assigns to `label` for `attributes`.
    #[must_use]
    pub fn probability(&self, attributes: &Attributes, label: &L) -> f64 {
        self.classification_for(attributes).probability(label)
    }

    /// Return the labels seen during training, in ascending order.
    #[must_use]
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Return the node arena; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node<L>] {
        &self.nodes
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }

        // BFS: (node_index, current_depth)
        let mut max_depth = 0usize;
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0usize, 0usize));

        while let Some((node_idx, d)) = queue.pop_front() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    queue.push_back((left.index(), d + 1));
                    queue.push_back((right.index(), d + 1));
                }
            }
        }

        max_depth
    }
}

impl<L: Label> PredictiveModel<L> for DecisionTree<L> {
    /// Return the leaf's label frequencies over every training label.
    fn predict(&self, attributes: &Attributes) -> PredictionMap<L> {
        self.classification_for(attributes).prediction_map(&self.labels)
    }
}
