use bft_core::{BftTable, Manifest};

use crate::model::{EntityStrategy, Governance, MetricStrategies};
use crate::table::placeholder_kinds;

/// Enumerate, for every table metric, the strategy governing it on each grain entity.
///
/// Deterministic: metrics follow the table's metric order and entities the
/// grain order. Metrics that do not resolve are skipped.
pub fn table_strategies(manifest: &Manifest, table: &BftTable) -> Vec<MetricStrategies> {
    let mut seen = Vec::new();
    let mut result = Vec::new();

    for metric in &table.metrics {
        if seen.contains(&metric) {
            continue;
        }
        seen.push(metric);

        let Some((home, _)) = manifest.metric(metric) else {
            continue;
        };

        let mut entities = Vec::new();
        for entity in &table.entities {
            if entities
                .iter()
                .any(|existing: &EntityStrategy| &existing.entity == entity)
            {
                continue;
            }
            let governance = if *entity == home.name {
                Governance::Home
            } else {
                Governance::Strategy(manifest.strategy_for(metric, entity))
            };
            entities.push(EntityStrategy {
                entity: entity.clone(),
                governance,
            });
        }

        let placeholders = placeholder_kinds(manifest, table, metric);
        let placeholder_label = placeholders
            .first()
            .map(|kind| manifest.placeholders.label_for(*kind).to_string());

        result.push(MetricStrategies {
            metric: metric.clone(),
            home: home.name.clone(),
            entities,
            placeholders,
            placeholder_label,
        });
    }

    result
}
