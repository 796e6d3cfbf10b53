//! Labeled observations and their attribute maps.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use crate::error::TreeError;

/// Marker for types usable as class labels.
///
/// Labels are compared by equality and kept in sorted order wherever the
/// tree needs a canonical ordering (class-count vectors, prediction maps).
pub trait Label: Clone + Ord + fmt::Debug + Send + Sync {}

impl<T> Label for T where T: Clone + Ord + fmt::Debug + Send + Sync {}

/// A single attribute value: numeric or categorical.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A real-valued attribute, split on with `<=` thresholds.
    Numeric(f64),
    /// A categorical attribute, split on with equality.
    Categorical(String),
}

impl AttributeValue {
    /// Return the numeric value, if this is a numeric attribute.
    #[must_use]
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            AttributeValue::Numeric(v) => Some(*v),
            AttributeValue::Categorical(_) => None,
        }
    }

    /// Return the category, if this is a categorical attribute.
    #[must_use]
    pub fn as_categorical(&self) -> Option<&str> {
        match self {
            AttributeValue::Categorical(c) => Some(c),
            AttributeValue::Numeric(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Numeric(v) => write!(f, "{v}"),
            AttributeValue::Categorical(c) => write!(f, "{c:?}"),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Numeric(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Numeric(f64::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Numeric(value as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Categorical(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Categorical(value)
    }
}

/// Attribute name → value map, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add an attribute, replacing any previous value under the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert an attribute, returning the value it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Option<AttributeValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, AttributeValue> {
        self.0.iter()
    }

    /// Iterate over attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Return the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = btree_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An immutable labeled observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<L> {
    attributes: Attributes,
    label: L,
    weight: f64,
}

impl<L: Label> Instance<L> {
    /// Create an instance with weight 1.0.
    #[must_use]
    pub fn new(attributes: Attributes, label: L) -> Self {
        Self {
            attributes,
            label,
            weight: 1.0,
        }
    }

    /// Create an instance with an explicit weight.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidWeight`] when `weight` is negative or not finite.
    pub fn weighted(attributes: Attributes, label: L, weight: f64) -> Result<Self, TreeError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(TreeError::InvalidWeight { weight });
        }
        Ok(Self {
            attributes,
            label,
            weight,
        })
    }

    /// Return the attribute map.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Return the label.
    #[must_use]
    pub fn label(&self) -> &L {
        &self.label
    }

    /// Return the instance weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}
