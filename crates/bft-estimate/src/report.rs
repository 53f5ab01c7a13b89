use crate::model::{Governance, MetricStrategies, TableEstimate};

/// Render a deterministic markdown summary of a table estimate.
pub fn render_table_estimate(estimate: &TableEstimate) -> String {
    let mut lines = Vec::new();

    lines.push(format!("# Table `{}`", estimate.table));
    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(format!("- chain_rows: {}", estimate.rows));
    lines.push(format!(
        "- placeholder_rows: {}",
        estimate.placeholder_row_count
    ));
    lines.push(format!("- total_rows: {}", estimate.total));
    lines.push(String::new());

    lines.push("## Chains".to_string());
    lines.push("| entities | metrics | rows |".to_string());
    lines.push("| --- | --- | --- |".to_string());
    for chain in &estimate.chains {
        let metrics = if chain.metrics.is_empty() {
            "-".to_string()
        } else {
            chain.metrics.join(", ")
        };
        lines.push(format!(
            "| {} | {} | {} |",
            chain.entities.join(", "),
            metrics,
            chain.rows
        ));
    }
    lines.push(String::new());

    if !estimate.placeholders.is_empty() {
        lines.push("## Placeholders".to_string());
        lines.push("| entity | kinds | metrics | rows |".to_string());
        lines.push("| --- | --- | --- | --- |".to_string());
        for contribution in &estimate.placeholders {
            let kinds: Vec<&str> = contribution
                .kinds
                .iter()
                .map(|kind| kind.as_str())
                .collect();
            lines.push(format!(
                "| {} | {} | {} | {} |",
                contribution.entity,
                kinds.join(", "),
                contribution.metrics.join(", "),
                contribution.rows
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Breakdown".to_string());
    lines.extend(estimate.breakdown.iter().map(|line| format!("    {line}")));
    lines.join("\n")
}

/// Render the metric-by-entity strategy matrix for a table.
pub fn render_strategies(table: &str, strategies: &[MetricStrategies]) -> String {
    let mut lines = Vec::new();

    lines.push(format!("# Strategies for `{table}`"));
    lines.push(String::new());

    if strategies.is_empty() {
        lines.push("- no resolvable metrics.".to_string());
        return lines.join("\n");
    }

    for metric in strategies {
        lines.push(format!("## {} (home: {})", metric.metric, metric.home));
        for entity in &metric.entities {
            let governance = match &entity.governance {
                Governance::Home => "home".to_string(),
                Governance::Strategy(strategy) => strategy.to_string(),
            };
            lines.push(format!("- {}: {}", entity.entity, governance));
        }
        if let Some(label) = &metric.placeholder_label {
            lines.push(format!("- placeholder row: {label}"));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
