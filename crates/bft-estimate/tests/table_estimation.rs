use std::path::Path;

use bft_core::{
    BftTable, Count, Entity, EntityRole, Manifest, MetricDef, MetricNature, MetricPropagation,
    PlaceholderKind, PropagationEdge, Relationship, RelationshipType, Strategy, ValueType,
    load_manifest,
};
use bft_estimate::{
    Governance, active_chains, estimate_rows, estimate_table_rows, table_strategies,
};
use bft_validate::validate_manifest;

fn entity(name: &str, rows: u64, metrics: &[&str]) -> Entity {
    Entity {
        name: name.to_string(),
        role: EntityRole::Leaf,
        detail: true,
        estimated_rows: Count::from(rows),
        metrics: metrics
            .iter()
            .map(|metric| MetricDef {
                name: metric.to_string(),
                value_type: ValueType::Currency,
                nature: MetricNature::Additive,
            })
            .collect(),
    }
}

fn relationship(name: &str, left: &str, right: &str, links: u64) -> Relationship {
    Relationship {
        name: name.to_string(),
        between: vec![left.to_string(), right.to_string()],
        kind: RelationshipType::ManyToMany,
        estimated_links: Count::from(links),
        weight: None,
    }
}

fn allocation(metric: &str, relationship: &str, target: &str) -> MetricPropagation {
    MetricPropagation {
        metric: metric.to_string(),
        path: vec![PropagationEdge {
            relationship: relationship.to_string(),
            target: target.to_string(),
            strategy: Strategy::Allocation,
            weight: Some("share".to_string()),
        }],
    }
}

fn table(entities: &[&str], metrics: &[&str]) -> BftTable {
    BftTable {
        name: "report".to_string(),
        entities: entities.iter().map(|value| value.to_string()).collect(),
        metrics: metrics.iter().map(|value| value.to_string()).collect(),
    }
}

fn grain(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn university() -> Manifest {
    Manifest {
        entities: vec![
            entity("Student", 45_000, &["tuition"]),
            entity("Class", 1_200, &[]),
            entity("Professor", 800, &["salary"]),
        ],
        relationships: vec![
            relationship("Enrollment", "Student", "Class", 120_000),
            relationship("Assignment", "Class", "Professor", 1_800),
        ],
        ..Manifest::default()
    }
}

fn fixture() -> Manifest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../manifests/university.toml");
    load_manifest(&path).expect("load fixture")
}

#[test]
fn single_entity_uses_its_row_estimate() {
    let manifest = university();
    let estimate = estimate_rows(&manifest.entities, &manifest.relationships, &grain(&["Professor"]));
    assert_eq!(estimate.rows, 800);
}

#[test]
fn one_bridge_contributes_its_links() {
    let manifest = university();
    let estimate = estimate_rows(
        &manifest.entities,
        &manifest.relationships,
        &grain(&["Student", "Class"]),
    );
    assert_eq!(estimate.rows, 120_000);
}

#[test]
fn two_bridges_multiply_by_fan_out() {
    let manifest = university();
    let estimate = estimate_rows(
        &manifest.entities,
        &manifest.relationships,
        &grain(&["Student", "Class", "Professor"]),
    );
    assert_eq!(estimate.rows, 180_000);
    assert!(
        estimate
            .breakdown
            .iter()
            .any(|line| line.contains("fan-out 1800 / 1200")),
        "breakdown: {:?}",
        estimate.breakdown
    );
}

#[test]
fn unrelated_entities_are_added() {
    let manifest = Manifest {
        relationships: Vec::new(),
        ..university()
    };
    let estimate = estimate_rows(
        &manifest.entities,
        &manifest.relationships,
        &grain(&["Student", "Professor"]),
    );
    assert_eq!(estimate.rows, 45_800);
    assert!(estimate.breakdown.iter().any(|line| line.contains("sparse union")));
}

#[test]
fn metric_without_propagation_adds_one_placeholder_per_home_row() {
    let manifest = university();
    let table = table(&["Student", "Class", "Professor"], &["salary"]);

    let chains = active_chains(&manifest, &table);
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].entities, grain(&["Class", "Professor"]));
    assert_eq!(chains[0].metrics, vec!["salary"]);
    assert_eq!(chains[1].entities, grain(&["Student"]));
    assert!(chains[1].metrics.is_empty());

    let estimate = estimate_table_rows(&manifest, &table);
    assert_eq!(estimate.rows, 46_800);
    assert_eq!(estimate.placeholder_row_count, 800);
    assert_eq!(estimate.total, 47_600);
    assert_eq!(estimate.placeholders.len(), 1);
    assert_eq!(estimate.placeholders[0].entity, "Professor");
    assert_eq!(estimate.placeholders[0].kinds, vec![PlaceholderKind::Reserve]);
}

#[test]
fn table_without_metrics_sums_singleton_chains() {
    let manifest = university();
    let estimate = estimate_table_rows(&manifest, &table(&["Student", "Class"], &[]));

    assert_eq!(estimate.chains.len(), 2);
    assert_eq!(estimate.chains[0].entities, grain(&["Student"]));
    assert_eq!(estimate.chains[1].entities, grain(&["Class"]));
    assert_eq!(estimate.rows, 46_200);
    assert_eq!(estimate.placeholder_row_count, 0);
}

#[test]
fn untouched_entity_folds_into_directly_joined_chain() {
    let manifest = university();
    let table = table(&["Student", "Class"], &["tuition"]);

    let chains = active_chains(&manifest, &table);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].entities, grain(&["Student", "Class"]));

    let estimate = estimate_table_rows(&manifest, &table);
    assert_eq!(estimate.rows, 120_000);
    assert_eq!(estimate.placeholder_row_count, 45_000);
}

#[test]
fn untouched_entities_do_not_join_through_each_other() {
    let manifest = university();
    // Class folds into the Professor chain; Student only reaches Class.
    let table = table(&["Class", "Student", "Professor"], &["salary"]);

    let chains = active_chains(&manifest, &table);
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].entities, grain(&["Class", "Professor"]));
    assert_eq!(chains[1].entities, grain(&["Student"]));
}

#[test]
fn placeholders_count_once_per_home_entity() {
    let mut manifest = university();
    manifest.entities[1] = entity("Class", 1_200, &["lab_fee", "room_fee"]);
    let elimination = |metric: &str| MetricPropagation {
        metric: metric.to_string(),
        path: vec![PropagationEdge {
            relationship: "Enrollment".to_string(),
            target: "Student".to_string(),
            strategy: Strategy::Elimination,
            weight: None,
        }],
    };
    manifest.propagations = vec![elimination("lab_fee"), elimination("room_fee")];

    let estimate = estimate_table_rows(
        &manifest,
        &table(&["Student", "Class"], &["lab_fee", "room_fee"]),
    );

    assert_eq!(estimate.rows, 120_000);
    assert_eq!(estimate.placeholder_row_count, 1_200);
    assert_eq!(estimate.placeholders.len(), 1);
    assert_eq!(estimate.placeholders[0].entity, "Class");
    assert_eq!(estimate.placeholders[0].metrics, vec!["lab_fee", "room_fee"]);
    assert_eq!(estimate.placeholders[0].kinds, vec![PlaceholderKind::Elimination]);
    assert_eq!(estimate.total, 121_200);
}

#[test]
fn single_entity_table_needs_no_placeholder() {
    let manifest = university();
    let estimate = estimate_table_rows(&manifest, &table(&["Professor"], &["salary"]));
    assert_eq!(estimate.rows, 800);
    assert_eq!(estimate.placeholder_row_count, 0);
}

#[test]
fn disjoint_chains_are_summed() {
    let mut manifest = university();
    manifest.propagations = vec![
        allocation("tuition", "Enrollment", "Class"),
        allocation("salary", "Assignment", "Class"),
    ];
    let table = table(&["Student", "Class", "Professor"], &["tuition", "salary"]);

    let chains = active_chains(&manifest, &table);
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].entities, grain(&["Student", "Class"]));
    assert_eq!(chains[1].entities, grain(&["Class", "Professor"]));

    let estimate = estimate_table_rows(&manifest, &table);
    assert_eq!(estimate.rows, 121_800);
    assert_eq!(estimate.placeholder_row_count, 0);
    assert_eq!(estimate.total, 121_800);
}

#[test]
fn subset_chain_folds_into_superset() {
    let mut manifest = university();
    manifest.propagations = vec![MetricPropagation {
        metric: "tuition".to_string(),
        path: vec![
            PropagationEdge {
                relationship: "Enrollment".to_string(),
                target: "Class".to_string(),
                strategy: Strategy::Allocation,
                weight: Some("credit_share".to_string()),
            },
            PropagationEdge {
                relationship: "Assignment".to_string(),
                target: "Professor".to_string(),
                strategy: Strategy::Allocation,
                weight: Some("teaching_share".to_string()),
            },
        ],
    }];
    let table = table(&["Student", "Class", "Professor"], &["tuition", "salary"]);

    let chains = active_chains(&manifest, &table);
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].metrics, vec!["tuition", "salary"]);

    let estimate = estimate_table_rows(&manifest, &table);
    assert_eq!(estimate.rows, 180_000);
}

#[test]
fn untouched_entity_without_joins_forms_its_own_chain() {
    let mut manifest = university();
    manifest.entities.push(entity("Department", 40, &[]));
    let table = table(&["Student", "Department"], &["tuition"]);

    let estimate = estimate_table_rows(&manifest, &table);
    assert_eq!(estimate.chains.len(), 2);
    assert!(estimate.chains[1].metrics.is_empty());
    assert_eq!(estimate.rows, 45_040);
    assert_eq!(estimate.placeholder_row_count, 45_000);
    assert_eq!(estimate.total, 90_040);
}

#[test]
fn fixture_tables_estimate_deterministically() {
    let manifest = fixture();
    assert!(validate_manifest(&manifest).is_ok());

    let finance = manifest.table("enrollment_finance").expect("table");
    let estimate = estimate_table_rows(&manifest, finance);
    assert_eq!(estimate.chains.len(), 1);
    assert_eq!(estimate.chains[0].metrics, vec!["tuition", "class_rating"]);
    assert_eq!((estimate.rows, estimate.placeholder_row_count), (120_000, 0));

    let overview = manifest.table("campus_overview").expect("table");
    let estimate = estimate_table_rows(&manifest, overview);
    assert_eq!(estimate.rows, 180_000);
    assert_eq!(estimate.placeholder_row_count, 2_000);
    assert_eq!(estimate.total, 182_000);
    let homes: Vec<&str> = estimate
        .placeholders
        .iter()
        .map(|contribution| contribution.entity.as_str())
        .collect();
    assert_eq!(homes, vec!["Professor", "Class"]);
    assert_eq!(estimate, estimate_table_rows(&manifest, overview));

    let faculty = manifest.table("faculty").expect("table");
    let estimate = estimate_table_rows(&manifest, faculty);
    assert_eq!(estimate.total, 800);
}

#[test]
fn strategies_cover_every_grain_entity() {
    let manifest = fixture();
    let overview = manifest.table("campus_overview").expect("table");
    let strategies = table_strategies(&manifest, overview);

    let metrics: Vec<&str> = strategies.iter().map(|entry| entry.metric.as_str()).collect();
    assert_eq!(metrics, vec!["tuition", "salary", "lab_fee"]);

    let tuition = &strategies[0];
    assert_eq!(tuition.home, "Student");
    assert_eq!(tuition.entities[0].governance, Governance::Home);
    assert_eq!(
        tuition.entities[1].governance,
        Governance::Strategy(Strategy::Allocation)
    );
    assert!(tuition.placeholder_label.is_none());

    let salary = &strategies[1];
    assert_eq!(
        salary.entities[0].governance,
        Governance::Strategy(Strategy::Reserve)
    );
    assert_eq!(salary.entities[2].governance, Governance::Home);
    assert_eq!(salary.placeholder_label.as_deref(), Some("<Unallocated>"));

    let lab_fee = &strategies[2];
    assert_eq!(
        lab_fee.entities[0].governance,
        Governance::Strategy(Strategy::Elimination)
    );
    assert_eq!(
        lab_fee.entities[2].governance,
        Governance::Strategy(Strategy::Reserve)
    );
    assert_eq!(lab_fee.placeholders, vec![PlaceholderKind::Elimination]);
    assert_eq!(lab_fee.placeholder_label.as_deref(), Some("<Correction>"));
}

#[test]
fn estimate_serializes_for_machine_output() {
    let manifest = fixture();
    let faculty = manifest.table("faculty").expect("table");
    let estimate = estimate_table_rows(&manifest, faculty);
    let value = serde_json::to_value(&estimate).expect("serialize");
    assert_eq!(value["total"], 800);
    assert_eq!(value["table"], "faculty");
}
