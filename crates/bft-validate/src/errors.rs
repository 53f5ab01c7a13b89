use serde::{Deserialize, Serialize};

/// Rule identifiers attached to validation errors.
pub mod rules {
    pub const NO_DUPLICATES: &str = "no-duplicates";
    pub const POSITIVE_INTEGER: &str = "positive-integer";
    pub const RELATIONSHIP_BETWEEN_PAIR: &str = "relationship-between-pair";
    pub const RELATIONSHIP_ENTITY_EXISTS: &str = "relationship-entity-exists";
    pub const PROPAGATION_METRIC_EXISTS: &str = "propagation-metric-exists";
    pub const PROPAGATION_NON_EMPTY: &str = "propagation-non-empty";
    pub const PROPAGATION_RELATIONSHIP_EXISTS: &str = "propagation-relationship-exists";
    pub const PROPAGATION_RELATIONSHIP_CONNECTS: &str = "propagation-relationship-connects";
    pub const PROPAGATION_STRATEGY_KNOWN: &str = "propagation-strategy-known";
    pub const PROPAGATION_WEIGHT_REQUIRED: &str = "propagation-weight-required";
    pub const PROPAGATION_NO_CYCLE: &str = "propagation-no-cycle";
    pub const NON_ADDITIVE_STRATEGY: &str = "non-additive-strategy";
    pub const TABLE_METRIC_EXISTS: &str = "table-metric-exists";
    pub const TABLE_METRIC_UNIQUE: &str = "table-metric-unique";
    pub const TABLE_ENTITY_EXISTS: &str = "table-entity-exists";
}

/// Structured validation error with rule, location and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub rule: String,
    /// JSON pointer to the offending field, when one applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(
        rule: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            path: Some(path.into()),
            message: message.into(),
            hint,
        }
    }
}

/// Ordered list of validation errors, in check order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error.
    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Errors raised under `rule`.
    pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |error| error.rule == rule)
    }
}
