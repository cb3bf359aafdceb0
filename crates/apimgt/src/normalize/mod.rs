// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Spec Normalization
//!
//! Reduces a parsed Swagger document to the canonical [`ApiSpecification`].
//! This is the only place that reads loosely-typed JSON; the compatibility
//! rules work exclusively on the resulting model.
//!
//! Supported dialects:
//! - Swagger 2.0 (`"swagger": "2.0"`, `basePath`, `paths` object)
//! - Swagger 1.2 API declarations (`"swaggerVersion": "1.2"`, `basePath`, `apis` array)

mod swagger12;
mod swagger2;

use crate::error::{Result, SpecError};
use crate::model::{ApiSpecification, HttpMethod, Parameter, ParameterLocation};
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// Source dialect of a specification document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecDialect {
    Swagger2,
    Swagger12,
}

/// Normalize a parsed specification document.
///
/// # Errors
///
/// Returns a [`SpecError`] when the document cannot be reduced to the
/// canonical model: duplicate paths, duplicate operations or parameters,
/// missing `basePath`/`paths`, unknown parameter locations or unresolvable
/// references.
pub fn normalize(raw: &Value) -> Result<ApiSpecification> {
    let dialect = detect_dialect(raw)?;
    debug!(?dialect, "Normalizing specification");

    let spec = match dialect {
        SpecDialect::Swagger2 => swagger2::normalize(raw)?,
        SpecDialect::Swagger12 => swagger12::normalize(raw)?,
    };

    debug!(
        base_path = spec.base_path(),
        resources = spec.resources().len(),
        "Specification normalized"
    );
    Ok(spec)
}

/// Work out which Swagger dialect a document is written in.
pub fn detect_dialect(raw: &Value) -> Result<SpecDialect> {
    let doc = raw
        .as_object()
        .ok_or_else(|| SpecError::invalid("document", "expected a JSON object"))?;

    if let Some(version) = doc.get("swagger") {
        return match version.as_str() {
            Some(v) if v.starts_with("2.") => Ok(SpecDialect::Swagger2),
            Some(v) => Err(SpecError::Unsupported(format!("swagger version {}", v))),
            None => Err(SpecError::invalid("swagger", "expected a string")),
        };
    }

    if let Some(version) = doc.get("swaggerVersion") {
        return match version.as_str() {
            Some(v) if v.starts_with("1.") => Ok(SpecDialect::Swagger12),
            Some(v) => Err(SpecError::Unsupported(format!("swaggerVersion {}", v))),
            None => Err(SpecError::invalid("swaggerVersion", "expected a string")),
        };
    }

    if doc.contains_key("openapi") {
        return Err(SpecError::Unsupported(
            "OpenAPI 3 documents have no basePath".to_string(),
        ));
    }

    if doc.contains_key("apis") && !doc.contains_key("paths") {
        Ok(SpecDialect::Swagger12)
    } else {
        Ok(SpecDialect::Swagger2)
    }
}

// ============================================================================
// Shared Field Helpers
// ============================================================================

/// Read a string field that must be present.
pub(crate) fn required_str<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    match value.get(field) {
        None | Some(Value::Null) => Err(SpecError::MissingField(field.to_string())),
        Some(v) => v
            .as_str()
            .ok_or_else(|| SpecError::invalid(field, "expected a string")),
    }
}

/// Read an optional string field, rejecting non-string values.
pub(crate) fn optional_str<'a>(value: &'a Value, field: &str) -> Result<Option<&'a str>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| SpecError::invalid(field, "expected a string")),
    }
}

/// Read an optional array field; absent means empty.
pub(crate) fn optional_array<'a>(
    value: &'a Value,
    field: &str,
    context: &str,
) -> Result<&'a [Value]> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SpecError::invalid(
            format!("{}.{}", context, field),
            "expected an array",
        )),
    }
}

pub(crate) fn parse_method(raw: &str, path: &str) -> Result<HttpMethod> {
    HttpMethod::from_str(raw).map_err(|_| {
        SpecError::invalid(
            format!("{}.method", path),
            format!("unknown HTTP method '{}'", raw),
        )
    })
}

/// Describe the type of a schema-like value.
///
/// `type` wins over `$ref`; arrays become `array[<item type>]`.
pub(crate) fn schema_type(schema: &Value) -> Option<String> {
    if let Some(ty) = schema.get("type").and_then(Value::as_str) {
        if ty == "array" {
            let item = schema
                .get("items")
                .and_then(schema_type)
                .unwrap_or_else(|| "any".to_string());
            return Some(format!("array[{}]", item));
        }
        return Some(ty.to_string());
    }

    schema
        .get("$ref")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// How a dialect spells its parameter fields.
pub(crate) struct ParameterFields {
    /// Field holding the location (`in` or `paramType`).
    pub location: &'static str,
    /// Path parameters are required whatever the document says.
    pub path_always_required: bool,
}

/// Build a [`Parameter`] from a parameter object.
pub(crate) fn build_parameter(
    param: &Value,
    fields: &ParameterFields,
    context: &str,
) -> Result<Parameter> {
    let name = required_str(param, "name")
        .map_err(|_| SpecError::MissingField(format!("{}.parameters[].name", context)))?;
    let param_context = format!("{}.parameters.{}", context, name);

    let raw_location = required_str(param, fields.location)
        .map_err(|_| SpecError::MissingField(format!("{}.{}", param_context, fields.location)))?;
    let location = ParameterLocation::from_str(raw_location).map_err(|_| {
        SpecError::invalid(
            format!("{}.{}", param_context, fields.location),
            format!("unknown parameter location '{}'", raw_location),
        )
    })?;

    let param_type = schema_type(param)
        .or_else(|| param.get("schema").and_then(schema_type))
        .ok_or_else(|| SpecError::invalid(&param_context, "parameter declares no type"))?;

    let declared_required = match param.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(SpecError::invalid(
                format!("{}.required", param_context),
                "expected a boolean",
            ));
        }
    };
    let required =
        declared_required || (fields.path_always_required && location == ParameterLocation::Path);

    Ok(Parameter::new(name, location, param_type, required))
}

/// Attach the path to a duplicate-parameter error raised by the model.
pub(crate) fn locate(err: SpecError, path: &str) -> SpecError {
    match err {
        SpecError::DuplicateParameter {
            operation,
            name,
            location,
        } => SpecError::DuplicateParameter {
            operation: format!("{} {}", operation, path),
            name,
            location,
        },
        other => other,
    }
}
