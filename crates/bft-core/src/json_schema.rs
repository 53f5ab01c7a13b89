use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::schema::Manifest;

/// Emit the JSON Schema for manifest documents.
pub fn manifest_json_schema() -> RootSchema {
    schema_for!(Manifest)
}
