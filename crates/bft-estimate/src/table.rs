use std::collections::BTreeSet;

use bft_core::{BftTable, Manifest, PlaceholderKind};

use crate::model::{ChainEstimate, PlaceholderContribution, TableEstimate};
use crate::rows::estimate_rows;

/// Grain entities whose rows carry a set of metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChain {
    /// Entities in grain order.
    pub entities: Vec<String>,
    pub metrics: Vec<String>,
}

/// Chain members plus the metrics that produced them.
type ChainDraft = (BTreeSet<String>, Vec<String>);

/// Estimate the rows of a report table.
///
/// Each active-entity chain is sized independently and the results are
/// summed (union, not join). Placeholder rows are then added once per home
/// entity whose metrics reserve or eliminate toward the grain.
pub fn estimate_table_rows(manifest: &Manifest, table: &BftTable) -> TableEstimate {
    let chains = active_chains(manifest, table);
    let mut breakdown = Vec::new();
    let mut chain_estimates = Vec::with_capacity(chains.len());
    let mut rows = 0u64;

    for chain in chains {
        let estimate = estimate_rows(&manifest.entities, &manifest.relationships, &chain.entities);
        tracing::debug!(
            event = "chain_estimated",
            table = %table.name,
            entities = ?chain.entities,
            rows = estimate.rows,
        );

        let metrics = if chain.metrics.is_empty() {
            "no metrics".to_string()
        } else {
            chain.metrics.join(", ")
        };
        breakdown.push(format!(
            "chain [{}] ({metrics}): {} rows",
            chain.entities.join(", "),
            estimate.rows
        ));
        breakdown.extend(estimate.breakdown.iter().map(|line| format!("  {line}")));

        rows += estimate.rows;
        chain_estimates.push(ChainEstimate {
            entities: chain.entities,
            metrics: chain.metrics,
            rows: estimate.rows,
            breakdown: estimate.breakdown,
        });
    }

    if chain_estimates.len() > 1 {
        breakdown.push(format!(
            "union of {} chains: {rows} rows",
            chain_estimates.len()
        ));
    }

    let placeholders = placeholder_contributions(manifest, table);
    let mut placeholder_row_count = 0u64;
    for contribution in &placeholders {
        tracing::debug!(
            event = "placeholder_rows",
            table = %table.name,
            entity = %contribution.entity,
            rows = contribution.rows,
        );
        breakdown.push(format!(
            "placeholders +{} (one per {}; {})",
            contribution.rows,
            contribution.entity,
            contribution.metrics.join(", ")
        ));
        placeholder_row_count += contribution.rows;
    }

    let total = rows + placeholder_row_count;
    breakdown.push(format!(
        "total: {rows} + {placeholder_row_count} placeholder = {total} rows"
    ));

    TableEstimate {
        table: table.name.clone(),
        rows,
        placeholder_row_count,
        total,
        chains: chain_estimates,
        placeholders,
        breakdown,
    }
}

/// Active-entity chains of a table, after dedup, subset removal and folding.
///
/// A metric's chain is its home entity plus every propagation target, kept
/// only where the entity belongs to the table grain. A grain entity no chain
/// touches joins the first metric chain it directly many-to-many connects to,
/// else it becomes a singleton chain. Untouched entities never join each other.
pub fn active_chains(manifest: &Manifest, table: &BftTable) -> Vec<ActiveChain> {
    let grain = grain_of(table);
    let mut chains: Vec<ChainDraft> = Vec::new();

    for metric in distinct_metrics(table) {
        let Some((home, _)) = manifest.metric(metric) else {
            continue;
        };

        let mut members = BTreeSet::new();
        if grain.contains(&home.name) {
            members.insert(home.name.clone());
        }
        if let Some(propagation) = manifest.propagation(metric) {
            for edge in &propagation.path {
                if grain.contains(&edge.target) {
                    members.insert(edge.target.clone());
                }
            }
        }
        if members.is_empty() {
            continue;
        }

        match chains.iter_mut().find(|(existing, _)| *existing == members) {
            Some((_, metrics)) => metrics.push(metric.to_string()),
            None => chains.push((members, vec![metric.to_string()])),
        }
    }

    let chains = drop_subset_chains(chains);
    let chains = fold_untouched(manifest, &grain, chains);

    chains
        .into_iter()
        .map(|(members, metrics)| ActiveChain {
            entities: grain
                .iter()
                .filter(|entity| members.contains(*entity))
                .cloned()
                .collect(),
            metrics,
        })
        .collect()
}

/// Placeholder rows per home entity, accumulated once per entity.
pub fn placeholder_contributions(manifest: &Manifest, table: &BftTable) -> Vec<PlaceholderContribution> {
    let mut contributions: Vec<PlaceholderContribution> = Vec::new();

    for metric in distinct_metrics(table) {
        let kinds = placeholder_kinds(manifest, table, metric);
        if kinds.is_empty() {
            continue;
        }
        let Some((home, _)) = manifest.metric(metric) else {
            continue;
        };

        match contributions
            .iter_mut()
            .find(|contribution| contribution.entity == home.name)
        {
            Some(contribution) => {
                contribution.metrics.push(metric.to_string());
                for kind in kinds {
                    if !contribution.kinds.contains(&kind) {
                        contribution.kinds.push(kind);
                    }
                }
                contribution.kinds.sort();
            }
            None => contributions.push(PlaceholderContribution {
                entity: home.name.clone(),
                rows: home.estimated_rows.as_positive_integer().unwrap_or(0),
                metrics: vec![metric.to_string()],
                kinds,
            }),
        }
    }

    contributions
}

/// Placeholder flavours a metric needs inside a table's grain.
///
/// Without a declared propagation the metric reserves toward every other
/// entity, which matters only when the grain holds more than one entity.
/// With one, only hops landing inside the grain count.
pub fn placeholder_kinds(manifest: &Manifest, table: &BftTable, metric: &str) -> Vec<PlaceholderKind> {
    if manifest.metric(metric).is_none() {
        return Vec::new();
    }

    let grain = grain_of(table);
    let mut kinds: Vec<PlaceholderKind> = match manifest.propagation(metric) {
        None if grain.len() > 1 => vec![PlaceholderKind::Reserve],
        None => Vec::new(),
        Some(propagation) => propagation
            .path
            .iter()
            .filter(|edge| grain.contains(&edge.target))
            .filter_map(|edge| edge.strategy.placeholder_kind())
            .collect(),
    };

    kinds.sort();
    kinds.dedup();
    kinds
}

fn drop_subset_chains(chains: Vec<ChainDraft>) -> Vec<ChainDraft> {
    let sets: Vec<BTreeSet<String>> = chains.iter().map(|(members, _)| members.clone()).collect();
    let mut kept: Vec<ChainDraft> = Vec::new();
    let mut absorbed: Vec<(usize, Vec<String>)> = Vec::new();

    for (members, metrics) in chains {
        let superset = sets
            .iter()
            .position(|other| other.len() > members.len() && members.is_subset(other));
        match superset {
            Some(target) => absorbed.push((target, metrics)),
            None => kept.push((members, metrics)),
        }
    }

    for (target, metrics) in absorbed {
        let target_set = &sets[target];
        if let Some((_, kept_metrics)) = kept
            .iter_mut()
            .find(|(members, _)| target_set.is_subset(members))
        {
            kept_metrics.extend(metrics);
        }
    }

    kept
}

fn fold_untouched(manifest: &Manifest, grain: &[String], mut chains: Vec<ChainDraft>) -> Vec<ChainDraft> {
    let joined = |left: &str, right: &str| {
        manifest
            .relationships
            .iter()
            .any(|rel| rel.is_many_to_many() && rel.connects(left, right))
    };

    // Only members contributed by metrics attract untouched entities.
    let touched: Vec<BTreeSet<String>> = chains.iter().map(|(members, _)| members.clone()).collect();
    let mut singletons: Vec<ChainDraft> = Vec::new();

    for entity in grain {
        if touched.iter().any(|members| members.contains(entity)) {
            continue;
        }
        let target = touched.iter().position(|members| {
            members
                .iter()
                .any(|member| joined(member.as_str(), entity.as_str()))
        });
        match target {
            Some(idx) => {
                chains[idx].0.insert(entity.clone());
            }
            None => singletons.push((BTreeSet::from([entity.clone()]), Vec::new())),
        }
    }

    chains.extend(singletons);
    chains
}

fn grain_of(table: &BftTable) -> Vec<String> {
    let mut seen = BTreeSet::new();
    table
        .entities
        .iter()
        .filter(|entity| seen.insert(entity.as_str()))
        .cloned()
        .collect()
}

fn distinct_metrics(table: &BftTable) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    table
        .metrics
        .iter()
        .map(String::as_str)
        .filter(|metric| seen.insert(*metric))
        .collect()
}
