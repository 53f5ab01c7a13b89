use std::collections::{BTreeMap, BTreeSet};

use bft_core::{Count, Manifest, MetricNature, PropagationEdge, Relationship};

use crate::errors::{rules, ValidationError, ValidationReport};

const RECOGNIZED_STRATEGIES: &str = "reserve, elimination, allocation, sum_over_sum";

/// Validate a manifest, returning every error found in check order.
pub fn validate(manifest: &Manifest) -> Vec<ValidationError> {
    validate_manifest(manifest).errors
}

/// Validate a manifest into a report.
///
/// Checks run independently and in a fixed order: uniqueness, positive
/// cardinalities, relationship endpoints, propagation paths, table metrics.
pub fn validate_manifest(manifest: &Manifest) -> ValidationReport {
    let mut report = ValidationReport::default();

    validate_uniqueness(manifest, &mut report);
    validate_cardinalities(manifest, &mut report);
    validate_relationships(manifest, &mut report);

    let index = ManifestIndex::build(manifest);
    validate_propagations(manifest, &index, &mut report);
    validate_tables(manifest, &index, &mut report);

    tracing::debug!(event = "manifest_validated", errors = report.errors.len());

    report
}

fn validate_uniqueness(manifest: &Manifest, report: &mut ValidationReport) {
    report_duplicates(
        "entity",
        manifest
            .entities
            .iter()
            .enumerate()
            .map(|(idx, entity)| (format!("/entities/{idx}/name"), entity.name.as_str())),
        report,
    );

    report_duplicates(
        "metric",
        manifest
            .entities
            .iter()
            .enumerate()
            .flat_map(|(entity_idx, entity)| {
                entity.metrics.iter().enumerate().map(move |(idx, metric)| {
                    (
                        format!("/entities/{entity_idx}/metrics/{idx}/name"),
                        metric.name.as_str(),
                    )
                })
            }),
        report,
    );

    report_duplicates(
        "relationship",
        manifest
            .relationships
            .iter()
            .enumerate()
            .map(|(idx, rel)| (format!("/relationships/{idx}/name"), rel.name.as_str())),
        report,
    );

    report_duplicates(
        "propagation metric",
        manifest
            .propagations
            .iter()
            .enumerate()
            .map(|(idx, prop)| (format!("/propagations/{idx}/metric"), prop.metric.as_str())),
        report,
    );

    report_duplicates(
        "table",
        manifest
            .tables
            .iter()
            .enumerate()
            .map(|(idx, table)| (format!("/tables/{idx}/name"), table.name.as_str())),
        report,
    );
}

/// Flag every occurrence of a name declared more than once.
fn report_duplicates<'a>(
    kind: &str,
    items: impl Iterator<Item = (String, &'a str)>,
    report: &mut ValidationReport,
) {
    let items: Vec<(String, &str)> = items.collect();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, name) in &items {
        *counts.entry(*name).or_insert(0) += 1;
    }

    for (path, name) in items {
        let count = counts.get(name).copied().unwrap_or(0);
        if count > 1 {
            report.push(ValidationError::new(
                rules::NO_DUPLICATES,
                path,
                format!("duplicate {kind} name '{name}' (declared {count} times)"),
                Some(format!("{kind} names must be unique")),
            ));
        }
    }
}

fn validate_cardinalities(manifest: &Manifest, report: &mut ValidationReport) {
    for (idx, entity) in manifest.entities.iter().enumerate() {
        check_positive(
            &entity.estimated_rows,
            format!("/entities/{idx}/estimated_rows"),
            format!("estimated_rows of entity '{}'", entity.name),
            report,
        );
    }

    for (idx, rel) in manifest.relationships.iter().enumerate() {
        check_positive(
            &rel.estimated_links,
            format!("/relationships/{idx}/estimated_links"),
            format!("estimated_links of relationship '{}'", rel.name),
            report,
        );
    }
}

fn check_positive(count: &Count, path: String, subject: String, report: &mut ValidationReport) {
    if count.as_positive_integer().is_none() {
        report.push(ValidationError::new(
            rules::POSITIVE_INTEGER,
            path,
            format!("{subject} must be a positive integer, got {count}"),
            None,
        ));
    }
}

fn validate_relationships(manifest: &Manifest, report: &mut ValidationReport) {
    let entities: BTreeSet<&str> = manifest
        .entities
        .iter()
        .map(|entity| entity.name.as_str())
        .collect();

    for (idx, rel) in manifest.relationships.iter().enumerate() {
        let base_path = format!("/relationships/{idx}");

        if rel.between.len() != 2 {
            report.push(ValidationError::new(
                rules::RELATIONSHIP_BETWEEN_PAIR,
                format!("{base_path}/between"),
                format!(
                    "relationship '{}' must list exactly two entities in between, got {}",
                    rel.name,
                    rel.between.len()
                ),
                None,
            ));
            continue;
        }

        for (pos, name) in rel.between.iter().enumerate() {
            if !entities.contains(name.as_str()) {
                report.push(ValidationError::new(
                    rules::RELATIONSHIP_ENTITY_EXISTS,
                    format!("{base_path}/between/{pos}"),
                    format!("relationship '{}' references unknown entity '{name}'", rel.name),
                    None,
                ));
            }
        }
    }
}

fn validate_propagations(manifest: &Manifest, index: &ManifestIndex, report: &mut ValidationReport) {
    for (idx, propagation) in manifest.propagations.iter().enumerate() {
        let base_path = format!("/propagations/{idx}");
        let metric_name = propagation.metric.as_str();

        let home = index.metrics.get(metric_name).copied();
        if home.is_none() {
            report.push(ValidationError::new(
                rules::PROPAGATION_METRIC_EXISTS,
                format!("{base_path}/metric"),
                format!("propagation references unknown metric '{metric_name}'"),
                None,
            ));
        }

        if propagation.path.is_empty() {
            report.push(ValidationError::new(
                rules::PROPAGATION_NON_EMPTY,
                format!("{base_path}/path"),
                format!("propagation for metric '{metric_name}' has an empty path"),
                Some("omit the propagation entirely to reserve toward every entity".to_string()),
            ));
            continue;
        }

        // Without a home entity hops cannot be placed, but repeated targets
        // are still cycles.
        let mut walk = PathWalk {
            current: home.map(|home| home.entity),
            visited: home.map(|home| vec![home.entity]).unwrap_or_default(),
        };

        for (hop, edge) in propagation.path.iter().enumerate() {
            let hop_path = format!("{base_path}/path/{hop}");
            validate_hop_strategy(metric_name, home.map(|home| home.nature), edge, &hop_path, report);

            let rel = index.relationships.get(edge.relationship.as_str()).copied();
            if rel.is_none() {
                report.push(ValidationError::new(
                    rules::PROPAGATION_RELATIONSHIP_EXISTS,
                    format!("{hop_path}/relationship"),
                    format!(
                        "propagation for metric '{metric_name}' references unknown relationship '{}'",
                        edge.relationship
                    ),
                    None,
                ));
            }

            if let Some(rel) = rel
                && let Some(current) = walk.current
                && !rel.connects(current, &edge.target)
            {
                report.push(ValidationError::new(
                    rules::PROPAGATION_RELATIONSHIP_CONNECTS,
                    format!("{hop_path}/target"),
                    format!(
                        "relationship '{}' does not connect '{current}' to '{}'",
                        rel.name, edge.target
                    ),
                    Some(format!(
                        "relationship '{}' is between {}",
                        rel.name,
                        rel.between.join(" and ")
                    )),
                ));
            }

            if walk.visited.contains(&edge.target.as_str()) {
                report.push(ValidationError::new(
                    rules::PROPAGATION_NO_CYCLE,
                    format!("{hop_path}/target"),
                    format!(
                        "propagation for metric '{metric_name}' revisits entity '{}'",
                        edge.target
                    ),
                    Some("a propagation path must not return to an entity it already reached".to_string()),
                ));
            }

            walk.visited.push(edge.target.as_str());
            walk.current = walk.current.map(|_| edge.target.as_str());
        }
    }
}

fn validate_hop_strategy(
    metric_name: &str,
    nature: Option<MetricNature>,
    edge: &PropagationEdge,
    hop_path: &str,
    report: &mut ValidationReport,
) {
    if !edge.strategy.is_recognized() {
        report.push(ValidationError::new(
            rules::PROPAGATION_STRATEGY_KNOWN,
            format!("{hop_path}/strategy"),
            format!("unrecognized strategy '{}'", edge.strategy),
            Some(format!("use one of {RECOGNIZED_STRATEGIES}")),
        ));
        return;
    }

    let has_weight = edge
        .weight
        .as_deref()
        .is_some_and(|weight| !weight.trim().is_empty());
    if edge.strategy.requires_weight() && !has_weight {
        report.push(ValidationError::new(
            rules::PROPAGATION_WEIGHT_REQUIRED,
            format!("{hop_path}/weight"),
            format!(
                "strategy '{}' toward '{}' requires a weight",
                edge.strategy, edge.target
            ),
            None,
        ));
    }

    if let Some(nature) = nature
        && !edge.strategy.allowed_for(nature)
    {
        report.push(ValidationError::new(
            rules::NON_ADDITIVE_STRATEGY,
            format!("{hop_path}/strategy"),
            format!(
                "metric '{metric_name}' is {nature} and cannot use strategy '{}'",
                edge.strategy
            ),
            Some("non-additive metrics may only use sum_over_sum or reserve".to_string()),
        ));
    }
}

fn validate_tables(manifest: &Manifest, index: &ManifestIndex, report: &mut ValidationReport) {
    for (idx, table) in manifest.tables.iter().enumerate() {
        let base_path = format!("/tables/{idx}");

        for (pos, entity) in table.entities.iter().enumerate() {
            if !index.entities.contains(entity.as_str()) {
                report.push(ValidationError::new(
                    rules::TABLE_ENTITY_EXISTS,
                    format!("{base_path}/entities/{pos}"),
                    format!("table '{}' references unknown entity '{entity}'", table.name),
                    None,
                ));
            }
        }

        let mut seen = BTreeSet::new();
        for (pos, metric) in table.metrics.iter().enumerate() {
            let metric_path = format!("{base_path}/metrics/{pos}");
            if !index.metrics.contains_key(metric.as_str()) {
                report.push(ValidationError::new(
                    rules::TABLE_METRIC_EXISTS,
                    metric_path.clone(),
                    format!("table '{}' references unknown metric '{metric}'", table.name),
                    None,
                ));
            }
            if !seen.insert(metric.as_str()) {
                report.push(ValidationError::new(
                    rules::TABLE_METRIC_UNIQUE,
                    metric_path,
                    format!("table '{}' lists metric '{metric}' more than once", table.name),
                    None,
                ));
            }
        }
    }
}

struct PathWalk<'a> {
    current: Option<&'a str>,
    visited: Vec<&'a str>,
}

#[derive(Clone, Copy)]
struct MetricHome<'a> {
    entity: &'a str,
    nature: MetricNature,
}

/// Name lookups keyed on first declaration; duplicates are reported separately.
struct ManifestIndex<'a> {
    entities: BTreeSet<&'a str>,
    metrics: BTreeMap<&'a str, MetricHome<'a>>,
    relationships: BTreeMap<&'a str, &'a Relationship>,
}

impl<'a> ManifestIndex<'a> {
    fn build(manifest: &'a Manifest) -> Self {
        let mut entities = BTreeSet::new();
        let mut metrics = BTreeMap::new();
        let mut relationships = BTreeMap::new();

        for entity in &manifest.entities {
            entities.insert(entity.name.as_str());
            for metric in &entity.metrics {
                metrics.entry(metric.name.as_str()).or_insert(MetricHome {
                    entity: entity.name.as_str(),
                    nature: metric.nature,
                });
            }
        }

        for rel in &manifest.relationships {
            relationships.entry(rel.name.as_str()).or_insert(rel);
        }

        Self {
            entities,
            metrics,
            relationships,
        }
    }
}
