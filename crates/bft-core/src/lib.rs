//! Core contracts and helpers for BFT manifests.
//!
//! This crate defines the manifest model (entities, relationships, metric
//! propagation and report tables), the graph utilities shared by the
//! validator and estimator, and the loader that turns TOML or JSON
//! documents into the in-memory model and back.

pub mod error;
pub mod graph;
pub mod io;
pub mod json_schema;
pub mod propagation;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use graph::{connected_components, spanning_tree, TreeEdge};
pub use io::{load_manifest, parse_manifest, serialize_manifest, write_manifest, ManifestFormat};
pub use json_schema::manifest_json_schema;
pub use propagation::{MetricPropagation, PlaceholderKind, PropagationEdge, Strategy};
pub use schema::{
    BftTable, Entity, Manifest, MetricDef, PlaceholderLabels, Relationship,
    DEFAULT_PLACEHOLDER_LABEL,
};
pub use types::{Count, EntityRole, MetricNature, RelationshipType, ValueType};
