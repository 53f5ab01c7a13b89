use bft_core::{PlaceholderKind, Strategy};
use serde::{Deserialize, Serialize};

/// Row-count projection for a set of grain entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowEstimate {
    pub rows: u64,
    /// Human-readable derivation, one step per line.
    pub breakdown: Vec<String>,
}

/// Projection for one active-entity chain of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEstimate {
    /// Chain entities in grain order.
    pub entities: Vec<String>,
    /// Metrics whose values live on this chain's rows.
    pub metrics: Vec<String>,
    pub rows: u64,
    pub breakdown: Vec<String>,
}

/// Placeholder rows contributed by one home entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderContribution {
    pub entity: String,
    pub rows: u64,
    /// Metrics that triggered the placeholder rows.
    pub metrics: Vec<String>,
    pub kinds: Vec<PlaceholderKind>,
}

/// Full row projection for a report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEstimate {
    pub table: String,
    /// Sum of chain rows.
    pub rows: u64,
    pub placeholder_row_count: u64,
    pub total: u64,
    pub chains: Vec<ChainEstimate>,
    pub placeholders: Vec<PlaceholderContribution>,
    pub breakdown: Vec<String>,
}

/// How a metric's value is produced on rows of one grain entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Governance {
    /// The entity owns the metric.
    Home,
    /// The value reaches the entity through a strategy.
    Strategy(Strategy),
}

/// Strategy governing a metric on one grain entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStrategy {
    pub entity: String,
    pub governance: Governance,
}

/// Per-entity strategies for one table metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricStrategies {
    pub metric: String,
    pub home: String,
    pub entities: Vec<EntityStrategy>,
    /// Placeholder flavours this metric needs in the table, if any.
    pub placeholders: Vec<PlaceholderKind>,
    /// Display label for the placeholder row, when one is needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_label: Option<String>,
}
