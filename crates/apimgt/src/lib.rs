// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! API Specification Compatibility Checking
//!
//! Decides whether clients written against a baseline Swagger description
//! keep working against a candidate (evolved) description.
//!
//! The work is split in two:
//! - [`normalize`] turns a parsed document into the immutable
//!   [`ApiSpecification`] model, rejecting malformed input with [`SpecError`]
//! - [`check_compatibility`] runs the ordered rule pipeline over two models and
//!   returns a [`CompatibilityVerdict`]
//!
//! An incompatible candidate is a normal result, never an error.
//!
//! ```
//! use apimgt::{IncompatibilityKind, is_api_compatible};
//! use serde_json::json;
//!
//! let baseline = json!({
//!     "swagger": "2.0",
//!     "basePath": "/v1",
//!     "paths": { "/items/{id}": { "get": {} } }
//! });
//! let candidate = json!({
//!     "swagger": "2.0",
//!     "basePath": "/v2",
//!     "paths": { "/items/{id}": { "get": {} } }
//! });
//!
//! let verdict = is_api_compatible(&baseline, &candidate).unwrap();
//! assert!(!verdict.is_compatible());
//! assert_eq!(verdict.kind(), Some(IncompatibilityKind::BasePath));
//! ```

pub mod compatibility;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;

pub use compatibility::{
    BreakingChange, CompatibilityPipeline, CompatibilityReport, CompatibilityRule,
    CompatibilityVerdict, CompatibleChange, CompatibleChangeType, IncompatibilityKind,
    check_compatibility, check_compatibility_report,
};
pub use config::{CheckerConfig, ConfigError, EvaluationMode};
pub use error::{Result, SpecError};
pub use model::{
    ApiSpecification, HttpMethod, Operation, Parameter, ParameterLocation, PathTemplate, Resource,
};
pub use normalize::{SpecDialect, normalize};

use serde_json::Value;

/// Normalize two parsed documents and run the fail-fast pipeline.
///
/// # Errors
///
/// Returns [`SpecError`] if either document is malformed. Incompatibility is
/// reported through the returned verdict.
pub fn is_api_compatible(baseline: &Value, candidate: &Value) -> Result<CompatibilityVerdict> {
    let baseline = normalize(baseline)?;
    let candidate = normalize(candidate)?;
    Ok(check_compatibility(&baseline, &candidate))
}
