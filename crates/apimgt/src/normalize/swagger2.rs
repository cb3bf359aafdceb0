// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Swagger 2.0 reader.

use super::{ParameterFields, build_parameter, locate, optional_array, optional_str, required_str};
use crate::error::{Result, SpecError};
use crate::model::{ApiSpecification, HttpMethod, Operation, Parameter, Resource};
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::debug;

const FIELDS: ParameterFields = ParameterFields {
    location: "in",
    path_always_required: true,
};

pub(super) fn normalize(raw: &Value) -> Result<ApiSpecification> {
    let base_path = required_str(raw, "basePath")?;
    let paths = match raw.get("paths") {
        None | Some(Value::Null) => return Err(SpecError::MissingField("paths".to_string())),
        Some(Value::Object(paths)) => paths,
        Some(_) => return Err(SpecError::invalid("paths", "expected an object")),
    };

    let mut resources = Vec::with_capacity(paths.len());
    for (path, item) in paths {
        resources.push(normalize_path_item(raw, path, item)?);
    }

    let spec = ApiSpecification::new(base_path, resources)?;
    let version = raw
        .get("info")
        .map(|info| optional_str(info, "version"))
        .transpose()?
        .flatten();

    Ok(match version {
        Some(v) => spec.with_version(v),
        None => spec,
    })
}

fn normalize_path_item(raw: &Value, path: &str, item: &Value) -> Result<Resource> {
    let item = resolve_path_item(raw, path, item)?;

    let shared = resolve_parameters(raw, optional_array(&item, "parameters", path)?, path)?;
    let mut declared = HashSet::new();
    for param in &shared {
        if !declared.insert((param.name(), param.location())) {
            return Err(SpecError::DuplicateParameter {
                operation: path.to_string(),
                name: param.name().to_string(),
                location: param.location().to_string(),
            });
        }
    }

    let mut operations = Vec::new();
    for (key, op) in item.as_object().into_iter().flatten() {
        if key == "parameters" || key.starts_with("x-") {
            continue;
        }
        let Ok(method) = HttpMethod::from_str(key) else {
            debug!(path, key = key.as_str(), "Skipping unknown path item field");
            continue;
        };
        operations.push(normalize_operation(raw, path, method, op, &shared)?);
    }

    Resource::new(path, operations)
}

/// Inline a path item's `$ref` into a plain path item object. Fields declared
/// next to the reference win over the referenced ones.
fn resolve_path_item(raw: &Value, path: &str, item: &Value) -> Result<Value> {
    let local = item
        .as_object()
        .ok_or_else(|| SpecError::invalid(format!("paths.{}", path), "expected an object"))?;

    let Some(reference) = local.get("$ref") else {
        return Ok(item.clone());
    };
    let reference = reference
        .as_str()
        .ok_or_else(|| SpecError::invalid(format!("paths.{}.$ref", path), "expected a string"))?;
    let target = resolve_pointer(raw, reference)?
        .as_object()
        .ok_or_else(|| SpecError::invalid(reference, "expected a path item object"))?;
    if target.contains_key("$ref") {
        return Err(SpecError::Unsupported(format!(
            "chained path item reference {}",
            reference
        )));
    }

    debug!(path, reference, "Resolved path item reference");
    let mut merged = target.clone();
    for (key, value) in local {
        if key != "$ref" {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

fn normalize_operation(
    raw: &Value,
    path: &str,
    method: HttpMethod,
    op: &Value,
    shared: &[Parameter],
) -> Result<Operation> {
    let context = format!("{} {}", method, path);
    if !op.is_object() {
        return Err(SpecError::invalid(&context, "expected an object"));
    }

    let operation_id = optional_str(op, "operationId")?.map(str::to_string);
    let own = resolve_parameters(raw, optional_array(op, "parameters", &context)?, &context)?;

    // Operation-level parameters override path-level ones with the same (name, in).
    let mut merged = shared.to_vec();
    let mut declared = HashSet::new();
    for param in own {
        if !declared.insert((param.name().to_string(), param.location())) {
            return Err(SpecError::DuplicateParameter {
                operation: context,
                name: param.name().to_string(),
                location: param.location().to_string(),
            });
        }
        match merged
            .iter()
            .position(|p| p.name() == param.name() && p.location() == param.location())
        {
            Some(index) => merged[index] = param,
            None => merged.push(param),
        }
    }

    Operation::new(method, operation_id, merged).map_err(|e| locate(e, path))
}

/// Build parameters, following `#/parameters/...` references.
fn resolve_parameters(raw: &Value, params: &[Value], context: &str) -> Result<Vec<Parameter>> {
    params
        .iter()
        .map(|param| {
            let param = resolve_reference(raw, param)?;
            build_parameter(param, &FIELDS, context)
        })
        .collect()
}

fn resolve_reference<'a>(raw: &'a Value, param: &'a Value) -> Result<&'a Value> {
    let Some(reference) = param.get("$ref").and_then(Value::as_str) else {
        return Ok(param);
    };
    if param.get("name").is_some() {
        return Ok(param);
    }
    resolve_pointer(raw, reference)
}

/// Follow an in-document `#/...` pointer.
fn resolve_pointer<'a>(raw: &'a Value, reference: &str) -> Result<&'a Value> {
    reference
        .strip_prefix('#')
        .and_then(|pointer| raw.pointer(pointer))
        .ok_or_else(|| SpecError::UnresolvedReference(reference.to_string()))
}
