use std::fmt;

use crate::classification::ClassificationProperties;
use crate::instance::AttributeValue;

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Test applied at an internal node; matching instances go left.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitPredicate {
    /// Numeric attribute `<= threshold`.
    LessOrEqual(f64),
    /// Categorical attribute equal to the given category.
    Equals(String),
}

impl SplitPredicate {
    /// Return `true` if `value` satisfies the predicate.
    ///
    /// A missing attribute, or one of the other kind, never matches.
    #[must_use]
    pub fn matches(&self, value: Option<&AttributeValue>) -> bool {
        match (self, value) {
            (SplitPredicate::LessOrEqual(threshold), Some(AttributeValue::Numeric(v))) => {
                v <= threshold
            }
            (SplitPredicate::Equals(category), Some(AttributeValue::Categorical(c))) => {
                c == category
            }
            _ => false,
        }
    }
}

impl fmt::Display for SplitPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPredicate::LessOrEqual(t) => write!(f, "<= {t}"),
            SplitPredicate::Equals(c) => write!(f, "== {c:?}"),
        }
    }
}

/// A node in a decision tree arena.
///
/// Trees are stored as `Vec<Node>` where children are referenced by
/// [`NodeIndex`]; the root is index 0.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<L> {
    /// An interior split node.
    Split {
        /// Attribute tested at this node.
        attribute: String,
        /// Test deciding the branch; matching instances go left.
        predicate: SplitPredicate,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Number of training instances that reached this node.
        n_instances: usize,
        /// Total weight of those instances.
        weight: f64,
        /// Scorer value of the chosen split.
        score_gain: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Label counts of the training instances in this leaf.
        classification: ClassificationProperties<L>,
        /// Total weight of those instances.
        weight: f64,
    },
}

impl<L> Node<L> {
    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Return the total training weight that reached this node.
    #[must_use]
    pub fn weight(&self) -> f64 {
        match self {
            Node::Split { weight, .. } | Node::Leaf { weight, .. } => *weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_index_roundtrip() {
        let ni = NodeIndex::new(42);
        assert_eq!(ni.index(), 42);
        assert_eq!(format!("{ni}"), "42");
    }

    #[test]
    fn numeric_predicate() {
        let p = SplitPredicate::LessOrEqual(1.5);
        assert!(p.matches(Some(&AttributeValue::Numeric(1.5))));
        assert!(!p.matches(Some(&AttributeValue::Numeric(1.6))));
        assert!(!p.matches(Some(&AttributeValue::Categorical("1".into()))));
        assert!(!p.matches(None));
    }

    #[test]
    fn categorical_predicate() {
        let p = SplitPredicate::Equals("red".into());
        assert!(p.matches(Some(&AttributeValue::Categorical("red".into()))));
        assert!(!p.matches(Some(&AttributeValue::Categorical("blue".into()))));
        assert!(!p.matches(None));
    }

    #[test]
    fn leaf_weight_and_kind() {
        let leaf: Node<bool> = Node::Leaf {
            classification: ClassificationProperties::General {
                counts: [(true, 3)].into_iter().collect(),
                total: 3,
            },
            weight: 2.5,
        };
        assert!(leaf.is_leaf());
        assert!((leaf.weight() - 2.5).abs() < f64::EPSILON);
    }
}
