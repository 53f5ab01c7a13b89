//! Semantic validation for BFT manifests.
//!
//! Every check runs on every call and all findings are collected; nothing
//! stops at the first problem and the manifest is never mutated.

pub mod errors;
pub mod validate;

pub use errors::{rules, ValidationError, ValidationReport};
pub use validate::{validate, validate_manifest};
