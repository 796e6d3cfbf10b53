use std::collections::BTreeMap;
use std::fmt;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::instance::{AttributeValue, Instance, Label};
use crate::node::SplitPredicate;
use crate::termination::TerminationPolicy;

/// Scores a candidate partition; higher is better.
///
/// Each slice holds the total instance weight per class, indexed by label
/// ordinal. `total` is the element-wise sum of `left` and `right`. An empty
/// side arrives as all zeros and must be handled (zero impurity, zero weight).
pub trait Scorer: fmt::Debug + Send + Sync {
    /// Score splitting `total` into `left` and `right`.
    fn score(&self, left: &[f64], right: &[f64], total: &[f64]) -> f64;
}

/// Impurity value at a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Impurity measure; as a [`Scorer`] it scores the weighted impurity reduction
/// `I(total) - wL/w * I(left) - wR/w * I(right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    #[default]
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its per-class weights.
    ///
    /// Returns zero impurity when the total weight is zero. Non-positive
    /// entries are ignored.
    #[must_use]
    pub fn impurity(&self, class_weights: &[f64]) -> Impurity {
        let total: f64 = class_weights.iter().filter(|&&w| w > 0.0).sum();
        if total <= 0.0 {
            return Impurity(0.0);
        }
        let probabilities = class_weights
            .iter()
            .filter(|&&w| w > 0.0)
            .map(|&w| w / total);
        let value = match self {
            SplitCriterion::Gini => 1.0 - probabilities.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -probabilities.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity(value)
    }
}

impl Scorer for SplitCriterion {
    fn score(&self, left: &[f64], right: &[f64], total: &[f64]) -> f64 {
        let w: f64 = total.iter().sum();
        if w <= 0.0 {
            return 0.0;
        }
        let w_left: f64 = left.iter().sum();
        let w_right: f64 = right.iter().sum();
        self.impurity(total).value()
            - (w_left / w) * self.impurity(left).value()
            - (w_right / w) * self.impurity(right).value()
    }
}

/// Result of finding the best split for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Attribute used for the split.
    pub(crate) attribute: String,
    /// Predicate sending instances left.
    pub(crate) predicate: SplitPredicate,
    /// Scorer value of this split.
    pub(crate) score_gain: f64,
    /// Instance indices going to the left child.
    pub(crate) left_indices: Vec<usize>,
    /// Instance indices going to the right child.
    pub(crate) right_indices: Vec<usize>,
}

/// Best candidate for one attribute.
#[derive(Debug, Clone)]
struct Candidate {
    predicate: SplitPredicate,
    score: f64,
}

/// Per-class weights and instance count on one side of a partition.
#[derive(Debug, Clone)]
struct Side {
    class_weights: Vec<f64>,
    n_instances: usize,
}

impl Side {
    fn empty(n_classes: usize) -> Self {
        Self {
            class_weights: vec![0.0; n_classes],
            n_instances: 0,
        }
    }

    fn weight(&self) -> f64 {
        self.class_weights.iter().sum()
    }

    fn add(&mut self, class: usize, weight: f64) {
        self.class_weights[class] += weight;
        self.n_instances += 1;
    }

    /// The complement of `self` within `parent`.
    fn complement(&self, parent: &Side) -> Side {
        Side {
            class_weights: parent
                .class_weights
                .iter()
                .zip(&self.class_weights)
                .map(|(p, s)| (p - s).max(0.0))
                .collect(),
            n_instances: parent.n_instances - self.n_instances,
        }
    }
}

/// Shared read-only inputs for evaluating candidates at one node.
struct NodeView<'a, L> {
    instances: &'a [Instance<L>],
    label_ids: &'a [usize],
    sample_indices: &'a [usize],
    parent: Side,
    scorer: &'a dyn Scorer,
    policy: &'a TerminationPolicy,
}

impl<L: Label> NodeView<'_, L> {
    /// Score a partition, or `None` if either child is too small.
    fn score(&self, left: &Side) -> Option<f64> {
        let right = left.complement(&self.parent);
        if !self.policy.admits_child(left.n_instances, left.weight())
            || !self.policy.admits_child(right.n_instances, right.weight())
        {
            return None;
        }
        Some(self.scorer.score(
            &left.class_weights,
            &right.class_weights,
            &self.parent.class_weights,
        ))
    }

    fn best_for_attribute(&self, name: &str) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        let mut consider = |predicate: SplitPredicate, score: f64| {
            if !score.is_nan() && best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(Candidate { predicate, score });
            }
        };

        // Numeric thresholds, ascending.
        let mut numeric: Vec<(f64, usize)> = self
            .sample_indices
            .iter()
            .filter_map(|&si| {
                self.instances[si]
                    .attributes()
                    .get(name)
                    .and_then(AttributeValue::as_numeric)
                    .filter(|v| !v.is_nan())
                    .map(|v| (v, si))
            })
            .collect();
        numeric.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n_classes = self.parent.class_weights.len();
        let mut left = Side::empty(n_classes);
        for (i, &(value, si)) in numeric.iter().enumerate() {
            left.add(self.label_ids[si], self.instances[si].weight());
            let threshold = match numeric.get(i + 1) {
                Some(&(next, _)) if next == value => continue,
                Some(&(next, _)) => {
                    // Threshold must stay strictly below `next`.
                    let mid = value + (next - value) / 2.0;
                    if mid < next { mid } else { value }
                }
                // Every numeric value goes left; only useful when some
                // instances lack the attribute and fall right.
                None if left.n_instances < self.parent.n_instances => value,
                None => break,
            };
            if let Some(score) = self.score(&left) {
                consider(SplitPredicate::LessOrEqual(threshold), score);
            }
        }

        // Categories, one-vs-rest in lexicographic order.
        let mut categories: BTreeMap<&str, Side> = BTreeMap::new();
        for &si in self.sample_indices {
            if let Some(category) = self.instances[si]
                .attributes()
                .get(name)
                .and_then(AttributeValue::as_categorical)
            {
                categories
                    .entry(category)
                    .or_insert_with(|| Side::empty(n_classes))
                    .add(self.label_ids[si], self.instances[si].weight());
            }
        }
        for (category, side) in &categories {
            if let Some(score) = self.score(side) {
                consider(SplitPredicate::Equals((*category).to_owned()), score);
            }
        }

        best
    }
}

/// Find the best split over every attribute seen at this node.
///
/// Attributes are evaluated in parallel but reduced in name order, and within
/// an attribute candidates are visited in ascending threshold / category
/// order; the first candidate with the maximal score wins.
///
/// Returns `None` when no candidate gives both children their minimum
/// count and weight.
pub(crate) fn find_best_split<L: Label>(
    instances: &[Instance<L>],
    label_ids: &[usize],
    sample_indices: &[usize],
    class_weights: &[f64],
    scorer: &dyn Scorer,
    policy: &TerminationPolicy,
) -> Option<SplitResult> {
    if sample_indices.is_empty() {
        return None;
    }

    let mut names: Vec<&str> = sample_indices
        .iter()
        .flat_map(|&si| instances[si].attributes().names())
        .collect();
    names.sort_unstable();
    names.dedup();

    let view = NodeView {
        instances,
        label_ids,
        sample_indices,
        parent: Side {
            class_weights: class_weights.to_vec(),
            n_instances: sample_indices.len(),
        },
        scorer,
        policy,
    };

    let per_attribute: Vec<Option<Candidate>> = names
        .par_iter()
        .map(|name| view.best_for_attribute(name))
        .collect();

    let (attribute, best) = names
        .iter()
        .zip(per_attribute)
        .filter_map(|(name, candidate)| candidate.map(|c| (*name, c)))
        .fold(None::<(&str, Candidate)>, |acc, (name, c)| {
            if acc.as_ref().is_some_and(|(_, b)| b.score >= c.score) {
                acc
            } else {
                Some((name, c))
            }
        })?;

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| best.predicate.matches(instances[si].attributes().get(attribute)));

    Some(SplitResult {
        attribute: attribute.to_owned(),
        predicate: best.predicate,
        score_gain: best.score,
        left_indices,
        right_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Attributes;

    fn weights_and_ids(labels: &[usize], n_classes: usize) -> (Vec<f64>, Vec<usize>) {
        let mut w = vec![0.0; n_classes];
        for &l in labels {
            w[l] += 1.0;
        }
        (w, labels.to_vec())
    }

    fn numeric_instances(values: &[f64], labels: &[usize]) -> Vec<Instance<usize>> {
        values
            .iter()
            .zip(labels)
            .map(|(&v, &l)| Instance::new(Attributes::new().with("x", v), l))
            .collect()
    }

    #[test]
    fn gini_pure() {
        let imp = SplitCriterion::Gini.impurity(&[10.0, 0.0, 0.0]);
        assert!(imp.value().abs() < f64::EPSILON);
    }

    #[test]
    fn gini_binary_balanced() {
        let imp = SplitCriterion::Gini.impurity(&[5.0, 5.0]);
        assert!((imp.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_binary_balanced() {
        let imp = SplitCriterion::Entropy.impurity(&[5.0, 5.0]);
        assert!((imp.value() - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn empty_side_scores_as_no_reduction() {
        let score = SplitCriterion::Gini.score(&[0.0, 0.0], &[3.0, 3.0], &[3.0, 3.0]);
        assert!(score.abs() < 1e-12);
        assert_eq!(SplitCriterion::Gini.score(&[0.0], &[0.0], &[0.0]), 0.0);
    }

    #[test]
    fn perfect_split_scores_parent_impurity() {
        let score = SplitCriterion::Gini.score(&[4.0, 0.0], &[0.0, 4.0], &[4.0, 4.0]);
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn separable_data_finds_correct_split() {
        let labels = [0, 0, 0, 1, 1, 1];
        let data = numeric_instances(&[1.0, 2.0, 3.0, 10.0, 11.0, 12.0], &labels);
        let (w, ids) = weights_and_ids(&labels, 2);
        let indices: Vec<usize> = (0..6).collect();
        let split = find_best_split(
            &data,
            &ids,
            &indices,
            &w,
            &SplitCriterion::Gini,
            &TerminationPolicy::new(),
        )
        .expect("should find a split");
        assert_eq!(split.attribute, "x");
        assert_eq!(split.predicate, SplitPredicate::LessOrEqual(6.5));
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
    }

    #[test]
    fn threshold_separates_extreme_neighbours() {
        let adjacent = f64::from_bits(1.0_f64.to_bits() + 1);
        let pairs = [
            (adjacent, f64::from_bits(adjacent.to_bits() + 1)),
            (1e308, 1.7e308),
            (1.0, f64::INFINITY),
            (f64::NEG_INFINITY, 0.0),
        ];
        for (low, high) in pairs {
            let labels = [0, 1];
            let data = numeric_instances(&[low, high], &labels);
            let (w, ids) = weights_and_ids(&labels, 2);
            let split = find_best_split(
                &data,
                &ids,
                &[0, 1],
                &w,
                &SplitCriterion::Gini,
                &TerminationPolicy::new(),
            )
            .expect("distinct values should split");
            let SplitPredicate::LessOrEqual(threshold) = split.predicate else {
                panic!("expected a numeric predicate for ({low}, {high})");
            };
            assert!(low <= threshold && threshold < high, "({low}, {high}) -> {threshold}");
            assert_eq!(split.left_indices, vec![0], "({low}, {high})");
            assert_eq!(split.right_indices, vec![1], "({low}, {high})");
        }
    }

    #[test]
    fn constant_attribute_returns_none() {
        let labels = [0, 0, 1, 1];
        let data = numeric_instances(&[5.0; 4], &labels);
        let (w, ids) = weights_and_ids(&labels, 2);
        let indices: Vec<usize> = (0..4).collect();
        let split = find_best_split(
            &data,
            &ids,
            &indices,
            &w,
            &SplitCriterion::Gini,
            &TerminationPolicy::new(),
        );
        assert!(split.is_none());
    }

    #[test]
    fn min_leaf_instances_enforced() {
        let labels = [0, 1];
        let data = numeric_instances(&[1.0, 10.0], &labels);
        let (w, ids) = weights_and_ids(&labels, 2);
        let split = find_best_split(
            &data,
            &ids,
            &[0, 1],
            &w,
            &SplitCriterion::Gini,
            &TerminationPolicy::new().with_min_leaf_instances(2),
        );
        assert!(split.is_none());
    }

    #[test]
    fn categorical_one_vs_rest() {
        let colours = ["red", "blue", "red", "green"];
        let labels = [1, 0, 1, 0];
        let data: Vec<Instance<usize>> = colours
            .iter()
            .zip(labels)
            .map(|(&c, l)| Instance::new(Attributes::new().with("colour", c), l))
            .collect();
        let (w, ids) = weights_and_ids(&labels, 2);
        let split = find_best_split(
            &data,
            &ids,
            &[0, 1, 2, 3],
            &w,
            &SplitCriterion::Gini,
            &TerminationPolicy::new(),
        )
        .unwrap();
        assert_eq!(split.predicate, SplitPredicate::Equals("red".into()));
        assert_eq!(split.left_indices, vec![0, 2]);
    }

    #[test]
    fn missing_values_can_be_split_off() {
        let data = vec![
            Instance::new(Attributes::new().with("x", 1.0), 0usize),
            Instance::new(Attributes::new().with("x", 1.0), 0),
            Instance::new(Attributes::new(), 1),
            Instance::new(Attributes::new(), 1),
        ];
        let labels = [0, 0, 1, 1];
        let (w, ids) = weights_and_ids(&labels, 2);
        let split = find_best_split(
            &data,
            &ids,
            &[0, 1, 2, 3],
            &w,
            &SplitCriterion::Gini,
            &TerminationPolicy::new(),
        )
        .unwrap();
        assert_eq!(split.predicate, SplitPredicate::LessOrEqual(1.0));
        assert_eq!(split.right_indices, vec![2, 3]);
    }

    #[test]
    fn ties_go_to_first_attribute() {
        // "a" and "b" separate the labels equally well.
        let data: Vec<Instance<usize>> = [(0.0, 0.0, 0), (1.0, 1.0, 1)]
            .iter()
            .cycle()
            .take(6)
            .map(|&(a, b, l)| Instance::new(Attributes::new().with("b", b).with("a", a), l))
            .collect();
        let labels: Vec<usize> = data.iter().map(|i| *i.label()).collect();
        let (w, ids) = weights_and_ids(&labels, 2);
        let indices: Vec<usize> = (0..6).collect();
        for _ in 0..10 {
            let split = find_best_split(
                &data,
                &ids,
                &indices,
                &w,
                &SplitCriterion::Gini,
                &TerminationPolicy::new(),
            )
            .unwrap();
            assert_eq!(split.attribute, "a");
        }
    }
}
