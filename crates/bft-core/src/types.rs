use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// User-declared row or link estimate.
///
/// The raw number is kept as written so that zero, negative and fractional
/// values survive loading and are reported by the validator instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Count(#[schemars(with = "f64")] serde_json::Number);

impl Count {
    /// Returns the value when it is an integer greater than zero.
    ///
    /// Integral floats such as `800.0` count as integers.
    pub fn as_positive_integer(&self) -> Option<u64> {
        if let Some(value) = self.0.as_u64() {
            return (value > 0).then_some(value);
        }
        let value = self.0.as_f64()?;
        (value.is_finite() && value.fract() == 0.0 && value >= 1.0 && value <= u64::MAX as f64)
            .then_some(value as u64)
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Self(serde_json::Number::from(value))
    }
}

impl From<i64> for Count {
    fn from(value: i64) -> Self {
        Self(serde_json::Number::from(value))
    }
}

impl From<serde_json::Number> for Count {
    fn from(value: serde_json::Number) -> Self {
        Self(value)
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Informational role of an entity in the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    #[default]
    Leaf,
    Bridge,
}

/// Value type carried by a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Currency,
    Integer,
    Float,
    Rating,
    Percentage,
}

/// Whether a metric can be summed across rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MetricNature {
    #[default]
    Additive,
    NonAdditive,
}

impl fmt::Display for MetricNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Additive => f.write_str("additive"),
            Self::NonAdditive => f.write_str("non-additive"),
        }
    }
}

/// Declared cardinality of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    ManyToMany,
    ManyToOne,
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManyToMany => f.write_str("many-to-many"),
            Self::ManyToOne => f.write_str("many-to-one"),
        }
    }
}
