use std::collections::BTreeSet;

use bft_core::{Entity, Relationship, connected_components, spanning_tree};

use crate::model::RowEstimate;

/// Estimate the rows produced by flattening `grain` over its relationships.
///
/// Only many-to-many relationships with both endpoints in the grain join
/// entities together. Each connected group is sized along a breadth-first
/// spanning tree: the first tree edge contributes its links, every later edge
/// multiplies by `links / rows(known endpoint)`, rounding after each step.
/// Disconnected groups are added, never multiplied.
///
/// No validation happens here; entities or relationships that cannot be
/// resolved contribute nothing.
pub fn estimate_rows(entities: &[Entity], relationships: &[Relationship], grain: &[String]) -> RowEstimate {
    let grain = distinct(grain);
    let members: BTreeSet<&str> = grain.iter().map(String::as_str).collect();

    let joins: Vec<&Relationship> = relationships
        .iter()
        .filter(|rel| rel.is_many_to_many())
        .filter(|rel| {
            rel.endpoints()
                .is_some_and(|(left, right)| members.contains(left) && members.contains(right))
        })
        .collect();
    let edges: Vec<(String, String)> = joins
        .iter()
        .filter_map(|rel| rel.endpoints())
        .map(|(left, right)| (left.to_string(), right.to_string()))
        .collect();

    let components = connected_components(&grain, &edges);
    let mut rows = 0u64;
    let mut breakdown = Vec::new();

    for component in &components {
        let component_rows = if let [single] = component.as_slice() {
            match entity_rows(entities, single) {
                Some(count) => {
                    breakdown.push(format!("{single}: {count} rows"));
                    count
                }
                None => {
                    breakdown.push(format!("{single}: no resolvable row estimate, skipped"));
                    0
                }
            }
        } else {
            estimate_component(entities, &joins, &edges, component, &mut breakdown)
        };

        rows += component_rows;
    }

    if components.len() > 1 {
        breakdown.push(format!(
            "sparse union of {} groups: {rows} rows",
            components.len()
        ));
    }

    RowEstimate { rows, breakdown }
}

fn estimate_component(
    entities: &[Entity],
    joins: &[&Relationship],
    edges: &[(String, String)],
    component: &[String],
    breakdown: &mut Vec<String>,
) -> u64 {
    let mut running: Option<f64> = None;

    for tree_edge in spanning_tree(component, edges) {
        let rel = joins[tree_edge.edge];
        let Some(links) = rel.estimated_links.as_positive_integer() else {
            breakdown.push(format!(
                "{}: no resolvable link estimate, skipped",
                rel.name
            ));
            continue;
        };

        match running {
            None => {
                breakdown.push(format!(
                    "{} ({} <-> {}): {links} links",
                    rel.name, tree_edge.known, tree_edge.discovered
                ));
                running = Some(links as f64);
            }
            Some(current) => {
                let Some(known_rows) = entity_rows(entities, &tree_edge.known) else {
                    breakdown.push(format!(
                        "{}: no resolvable row estimate for '{}', skipped",
                        rel.name, tree_edge.known
                    ));
                    continue;
                };
                let factor = links as f64 / known_rows as f64;
                let next = (current * factor).round();
                breakdown.push(format!(
                    "x {} ({} -> {}): fan-out {links} / {known_rows} = {factor:.4}, {current} -> {next} rows",
                    rel.name, tree_edge.known, tree_edge.discovered
                ));
                running = Some(next);
            }
        }
    }

    let total = running.unwrap_or(0.0) as u64;
    breakdown.push(format!("[{}]: {total} rows", component.join(", ")));
    total
}

fn entity_rows(entities: &[Entity], name: &str) -> Option<u64> {
    entities
        .iter()
        .find(|entity| entity.name == name)
        .and_then(|entity| entity.estimated_rows.as_positive_integer())
}

fn distinct(names: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
