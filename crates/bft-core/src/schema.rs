use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::propagation::{MetricPropagation, PlaceholderKind, Strategy};
use crate::types::{Count, EntityRole, MetricNature, RelationshipType, ValueType};

/// Label shown on placeholder rows when none is configured.
pub const DEFAULT_PLACEHOLDER_LABEL: &str = "<Unallocated>";

/// Top-level manifest describing entities, relationships, propagation and tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Manifest {
    /// Contract version of the manifest document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Per-metric propagation paths. Metrics not listed reserve toward every other entity.
    #[serde(default)]
    pub propagations: Vec<MetricPropagation>,
    /// Report tables with explicitly declared grain.
    #[serde(default)]
    pub tables: Vec<BftTable>,
    /// Display labels for placeholder rows.
    #[serde(default, skip_serializing_if = "PlaceholderLabels::is_default")]
    pub placeholders: PlaceholderLabels,
}

/// A named thing that may have its own rows and owns metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub role: EntityRole,
    /// Whether the entity contributes its own rows to output.
    #[serde(default)]
    pub detail: bool,
    pub estimated_rows: Count,
    #[serde(default)]
    pub metrics: Vec<MetricDef>,
}

/// A metric owned by exactly one entity. Names are unique across the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricDef {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub nature: MetricNature,
}

/// Undirected edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub name: String,
    /// Endpoint entity names; exactly two are expected.
    pub between: Vec<String>,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    /// Number of join rows this relationship produces.
    pub estimated_links: Count,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

impl Relationship {
    /// The endpoint pair, when exactly two names are declared.
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        match self.between.as_slice() {
            [left, right] => Some((left.as_str(), right.as_str())),
            _ => None,
        }
    }

    /// Undirected adjacency test.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        match self.endpoints() {
            Some((left, right)) => (left == a && right == b) || (left == b && right == a),
            None => false,
        }
    }

    pub fn is_many_to_many(&self) -> bool {
        self.kind == RelationshipType::ManyToMany
    }
}

/// Report table declaration: explicit grain plus included metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BftTable {
    pub name: String,
    /// Grain entities, in declaration order.
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl BftTable {
    pub fn includes_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|entity| entity == name)
    }
}

/// Placeholder row labels, configurable per strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlaceholderLabels {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elimination: Option<String>,
}

impl PlaceholderLabels {
    pub fn label_for(&self, kind: PlaceholderKind) -> &str {
        let configured = match kind {
            PlaceholderKind::Reserve => self.reserve.as_deref(),
            PlaceholderKind::Elimination => self.elimination.as_deref(),
        };
        configured.unwrap_or(DEFAULT_PLACEHOLDER_LABEL)
    }

    pub fn is_default(&self) -> bool {
        self.reserve.is_none() && self.elimination.is_none()
    }
}

impl Manifest {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|relationship| relationship.name == name)
    }

    /// Resolve a metric together with its home entity.
    pub fn metric(&self, name: &str) -> Option<(&Entity, &MetricDef)> {
        self.entities.iter().find_map(|entity| {
            entity
                .metrics
                .iter()
                .find(|metric| metric.name == name)
                .map(|metric| (entity, metric))
        })
    }

    pub fn propagation(&self, metric: &str) -> Option<&MetricPropagation> {
        self.propagations
            .iter()
            .find(|propagation| propagation.metric == metric)
    }

    pub fn table(&self, name: &str) -> Option<&BftTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Strategy governing `metric` on rows of `target`.
    ///
    /// Total: falls back to [`Strategy::Reserve`] when the metric has no
    /// propagation or its path never reaches `target`.
    pub fn strategy_for(&self, metric: &str, target: &str) -> Strategy {
        self.propagation(metric)
            .and_then(|propagation| propagation.edge_to(target))
            .map(|edge| edge.strategy.clone())
            .unwrap_or(Strategy::Reserve)
    }
}
