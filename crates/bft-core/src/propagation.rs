use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::MetricNature;

/// How a metric's value is treated on rows of a foreign entity.
///
/// Unknown spellings load as [`Strategy::Unrecognized`] so the validator can
/// report them alongside every other problem in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Zero on foreign rows, full value on a placeholder row.
    Reserve,
    /// Full value repeated on foreign rows, offset by a negative placeholder row.
    Elimination,
    /// Value split across foreign rows by a declared weight.
    Allocation,
    /// Raw value plus companion weight column, never summed directly.
    SumOverSum,
    Unrecognized(String),
}

impl Strategy {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Reserve => "reserve",
            Self::Elimination => "elimination",
            Self::Allocation => "allocation",
            Self::SumOverSum => "sum_over_sum",
            Self::Unrecognized(value) => value.as_str(),
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "reserve" => Self::Reserve,
            "elimination" => Self::Elimination,
            "allocation" => Self::Allocation,
            "sum_over_sum" => Self::SumOverSum,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }

    /// Allocation and sum/sum need a weight column to split or pair with.
    pub fn requires_weight(&self) -> bool {
        matches!(self, Self::Allocation | Self::SumOverSum)
    }

    /// Non-additive values cannot be split or offset; only sum/sum and
    /// reserve keep them meaningful.
    pub fn allowed_for(&self, nature: MetricNature) -> bool {
        match nature {
            MetricNature::Additive => true,
            MetricNature::NonAdditive => !matches!(self, Self::Allocation | Self::Elimination),
        }
    }

    /// Strategies that emit one placeholder row per home entity value.
    pub fn needs_placeholder(&self) -> bool {
        matches!(self, Self::Reserve | Self::Elimination)
    }

    pub fn placeholder_kind(&self) -> Option<PlaceholderKind> {
        match self {
            Self::Reserve => Some(PlaceholderKind::Reserve),
            Self::Elimination => Some(PlaceholderKind::Elimination),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Strategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// Placeholder row flavour, used to pick a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Reserve,
    Elimination,
}

impl PlaceholderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reserve => "reserve",
            Self::Elimination => "elimination",
        }
    }
}

/// One hop of a metric's outward path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropagationEdge {
    /// Relationship traversed by this hop.
    pub relationship: String,
    /// Entity reached by this hop.
    pub target: String,
    #[schemars(with = "String")]
    pub strategy: Strategy,
    /// Weight column reference, required for allocation and sum/sum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

/// Ordered propagation path for one metric, starting at its home entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricPropagation {
    pub metric: String,
    #[serde(default)]
    pub path: Vec<PropagationEdge>,
}

impl MetricPropagation {
    /// First hop reaching `entity`, if any.
    pub fn edge_to(&self, entity: &str) -> Option<&PropagationEdge> {
        self.path.iter().find(|edge| edge.target == entity)
    }
}
