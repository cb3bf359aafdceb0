// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Swagger 1.2 API declaration reader.
//!
//! Paths live in an `apis` array, so unlike Swagger 2.0 a document can
//! declare the same path twice. That is rejected here.

use super::{
    ParameterFields, build_parameter, locate, optional_array, optional_str, parse_method,
    required_str,
};
use crate::error::{Result, SpecError};
use crate::model::{ApiSpecification, Operation, Resource};
use serde_json::Value;

const FIELDS: ParameterFields = ParameterFields {
    location: "paramType",
    path_always_required: false,
};

pub(super) fn normalize(raw: &Value) -> Result<ApiSpecification> {
    let base_path = required_str(raw, "basePath")?;
    let apis = match raw.get("apis") {
        None | Some(Value::Null) => return Err(SpecError::MissingField("apis".to_string())),
        Some(Value::Array(apis)) => apis,
        Some(_) => return Err(SpecError::invalid("apis", "expected an array")),
    };

    let resources = apis
        .iter()
        .map(normalize_api)
        .collect::<Result<Vec<_>>>()?;

    let spec = ApiSpecification::new(base_path, resources)?;
    Ok(match optional_str(raw, "apiVersion")? {
        Some(v) => spec.with_version(v),
        None => spec,
    })
}

fn normalize_api(api: &Value) -> Result<Resource> {
    let path = required_str(api, "path")
        .map_err(|_| SpecError::MissingField("apis[].path".to_string()))?;

    let operations = optional_array(api, "operations", path)?
        .iter()
        .map(|op| normalize_operation(path, op))
        .collect::<Result<Vec<_>>>()?;

    Resource::new(path, operations)
}

fn normalize_operation(path: &str, op: &Value) -> Result<Operation> {
    let raw_method = required_str(op, "method")
        .map_err(|_| SpecError::MissingField(format!("{}.operations[].method", path)))?;
    let method = parse_method(raw_method, path)?;
    let context = format!("{} {}", method, path);

    let operation_id = optional_str(op, "nickname")?.map(str::to_string);
    let parameters = optional_array(op, "parameters", &context)?
        .iter()
        .map(|param| build_parameter(param, &FIELDS, &context))
        .collect::<Result<Vec<_>>>()?;

    Operation::new(method, operation_id, parameters).map_err(|e| locate(e, path))
}
