// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Canonical API model.
//!
//! These types are the only input the compatibility rules ever see. They are
//! immutable once constructed: fields are private, constructors validate the
//! uniqueness invariants, and nothing exposes `&mut` access afterwards.
//!
//! - [`ApiSpecification`] - base path plus resources in declaration order
//! - [`Resource`] - a path template and at most one operation per method
//! - [`Operation`] - parameters in declaration order, unique by `(name, location)`
//! - [`Parameter`] - name, location, type and required flag

use crate::error::{Result, SpecError};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ============================================================================
// Enums
// ============================================================================

/// HTTP method of an operation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

/// Where a parameter is carried in the request.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    /// Form field (`formData` in Swagger 2.0, `form` in Swagger 1.2)
    #[strum(to_string = "formData", serialize = "form")]
    FormData,
}

// ============================================================================
// Path Templates
// ============================================================================

/// One `/`-separated segment of a path template.
///
/// The shape is the raw segment with every placeholder name erased, so
/// `{id}` and `{itemId}` share the shape `{}` and `pet.{format}` becomes
/// `pet.{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    raw: String,
    shape: String,
    placeholders: Vec<String>,
}

impl PathSegment {
    fn parse(raw: &str) -> Self {
        let mut shape = String::with_capacity(raw.len());
        let mut placeholders = Vec::new();
        let mut rest = raw;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            shape.push_str(&rest[..open]);
            shape.push_str("{}");
            placeholders.push(rest[open + 1..open + close].to_string());
            rest = &rest[open + close + 1..];
        }
        shape.push_str(rest);

        Self {
            raw: raw.to_string(),
            shape,
            placeholders,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when the whole segment is a single placeholder such as `{id}`.
    pub fn is_parameter(&self) -> bool {
        self.shape == "{}"
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Literal text must be equal; placeholders match any placeholder.
    pub fn matches(&self, other: &PathSegment) -> bool {
        self.shape == other.shape
    }
}

/// A resource path such as `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct PathTemplate {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw.split('/').map(PathSegment::parse).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Placeholder names in the order they appear in the template.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|s| s.placeholders.iter().map(String::as_str))
    }

    /// Position of a placeholder name within the template.
    pub fn placeholder_index(&self, name: &str) -> Option<usize> {
        self.placeholders().position(|p| p == name)
    }

    /// Segment-by-segment structural comparison. Placeholder names are
    /// ignored, segment counts must agree.
    pub fn structurally_matches(&self, other: &PathTemplate) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.matches(b))
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ============================================================================
// Parameter / Operation / Resource / ApiSpecification
// ============================================================================

/// A single operation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    name: String,
    location: ParameterLocation,
    #[serde(rename = "type")]
    param_type: String,
    required: bool,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        param_type: impl Into<String>,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            param_type: param_type.into(),
            required,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn param_type(&self) -> &str {
        &self.param_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// One HTTP-method-specific behavior of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_id: Option<String>,
    parameters: Vec<Parameter>,
}

impl Operation {
    /// Build an operation, rejecting a repeated `(name, location)` pair.
    pub fn new(
        method: HttpMethod,
        operation_id: Option<String>,
        parameters: Vec<Parameter>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        for param in &parameters {
            if !seen.insert((param.name.as_str(), param.location)) {
                return Err(SpecError::DuplicateParameter {
                    operation: method.to_string(),
                    name: param.name.clone(),
                    location: param.location.to_string(),
                });
            }
        }

        Ok(Self {
            method,
            operation_id,
            parameters,
        })
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str, location: ParameterLocation) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.location == location)
    }
}

/// An endpoint family identified by a path template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    path_template: PathTemplate,
    operations: BTreeMap<HttpMethod, Operation>,
}

impl Resource {
    /// Build a resource, rejecting two operations for the same method.
    pub fn new(path_template: impl Into<String>, operations: Vec<Operation>) -> Result<Self> {
        let path_template = PathTemplate::parse(path_template);
        let mut by_method = BTreeMap::new();

        for operation in operations {
            let method = operation.method;
            if by_method.insert(method, operation).is_some() {
                return Err(SpecError::DuplicateOperation {
                    path: path_template.raw.clone(),
                    method: method.to_string(),
                });
            }
        }

        Ok(Self {
            path_template,
            operations: by_method,
        })
    }

    pub fn path_template(&self) -> &PathTemplate {
        &self.path_template
    }

    pub fn path(&self) -> &str {
        self.path_template.as_str()
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Operations ordered by method.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn methods(&self) -> impl Iterator<Item = HttpMethod> + '_ {
        self.operations.keys().copied()
    }
}

/// A normalized API description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpecification {
    base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    resources: Vec<Resource>,
}

impl ApiSpecification {
    /// Build a specification, rejecting duplicate path templates.
    ///
    /// Resources keep the order they are given in.
    pub fn new(base_path: impl Into<String>, resources: Vec<Resource>) -> Result<Self> {
        let mut seen = HashSet::new();
        for resource in &resources {
            if !seen.insert(resource.path()) {
                return Err(SpecError::DuplicatePath(resource.path().to_string()));
            }
        }

        Ok(Self {
            base_path: base_path.into(),
            version: None,
            resources,
        })
    }

    /// Attach the declared API version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Resources in declaration order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Exact lookup by path template string.
    pub fn resource(&self, path: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.path() == path)
    }

    /// Find the resource that serves the same URLs as `template`.
    ///
    /// An exact string match wins; otherwise the first structural match in
    /// declaration order is returned.
    pub fn find_matching_resource(&self, template: &PathTemplate) -> Option<&Resource> {
        self.resource(template.as_str()).or_else(|| {
            self.resources
                .iter()
                .find(|r| r.path_template.structurally_matches(template))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    // ============================================================================
    // Enum Parsing Tests
    // ============================================================================

    #[test]
    fn test_http_method_parse_case_insensitive() {
        assert_eq!(HttpMethod::from_str("get").unwrap(), HttpMethod::Get);
        assert_eq!(HttpMethod::from_str("DELETE").unwrap(), HttpMethod::Delete);
        assert_eq!(HttpMethod::from_str("Patch").unwrap(), HttpMethod::Patch);
        assert!(HttpMethod::from_str("parameters").is_err());
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Options.as_ref(), "OPTIONS");
    }

    #[test]
    fn test_http_method_round_trips_in_any_case() {
        assert_eq!(HttpMethod::iter().count(), 7);
        for method in HttpMethod::iter() {
            let upper = method.to_string();
            assert_eq!(HttpMethod::from_str(&upper).unwrap(), method);
            assert_eq!(HttpMethod::from_str(&upper.to_lowercase()).unwrap(), method);
        }
    }

    #[test]
    fn test_parameter_location_round_trips() {
        for location in ParameterLocation::iter() {
            assert_eq!(
                ParameterLocation::from_str(&location.to_string()).unwrap(),
                location
            );
        }
    }

    #[test]
    fn test_parameter_location_parse() {
        assert_eq!(
            ParameterLocation::from_str("query").unwrap(),
            ParameterLocation::Query
        );
        assert_eq!(
            ParameterLocation::from_str("formData").unwrap(),
            ParameterLocation::FormData
        );
        assert_eq!(
            ParameterLocation::from_str("form").unwrap(),
            ParameterLocation::FormData
        );
        assert!(ParameterLocation::from_str("cookie").is_err());
    }

    #[test]
    fn test_parameter_location_display() {
        assert_eq!(ParameterLocation::FormData.to_string(), "formData");
        assert_eq!(ParameterLocation::Header.to_string(), "header");
    }

    // ============================================================================
    // PathTemplate Tests
    // ============================================================================

    #[test]
    fn test_path_template_placeholders() {
        let template = PathTemplate::parse("/users/{userId}/orders/{orderId}");
        let names: Vec<_> = template.placeholders().collect();
        assert_eq!(names, vec!["userId", "orderId"]);
        assert_eq!(template.placeholder_index("orderId"), Some(1));
        assert_eq!(template.placeholder_index("missing"), None);
    }

    #[test]
    fn test_path_template_renamed_placeholder_matches() {
        let a = PathTemplate::parse("/items/{id}");
        let b = PathTemplate::parse("/items/{itemId}");
        assert!(a.structurally_matches(&b));
    }

    #[test]
    fn test_path_template_literal_mismatch() {
        let a = PathTemplate::parse("/items/{id}");
        let b = PathTemplate::parse("/products/{id}");
        assert!(!a.structurally_matches(&b));
    }

    #[test]
    fn test_path_template_literal_does_not_match_placeholder() {
        let a = PathTemplate::parse("/items/{id}");
        let b = PathTemplate::parse("/items/latest");
        assert!(!a.structurally_matches(&b));
    }

    #[test]
    fn test_path_template_segment_count_matters() {
        let a = PathTemplate::parse("/items");
        let b = PathTemplate::parse("/items/{id}");
        assert!(!a.structurally_matches(&b));
        assert!(!PathTemplate::parse("/items/").structurally_matches(&a));
    }

    #[test]
    fn test_path_template_mixed_segment() {
        let a = PathTemplate::parse("/pet.{format}/{petId}");
        let b = PathTemplate::parse("/pet.{fmt}/{id}");
        let c = PathTemplate::parse("/pets.{format}/{petId}");
        assert!(a.structurally_matches(&b));
        assert!(!a.structurally_matches(&c));
        assert!(!a.segments()[1].is_parameter());
        assert!(a.segments()[2].is_parameter());
    }

    #[test]
    fn test_path_template_unclosed_brace_is_literal() {
        let template = PathTemplate::parse("/items/{id");
        assert_eq!(template.placeholders().count(), 0);
        assert!(!template.structurally_matches(&PathTemplate::parse("/items/{x}")));
    }

    // ============================================================================
    // Invariant Tests
    // ============================================================================

    #[test]
    fn test_operation_rejects_duplicate_parameter() {
        let params = vec![
            Parameter::new("id", ParameterLocation::Query, "string", false),
            Parameter::new("id", ParameterLocation::Query, "integer", true),
        ];
        let err = Operation::new(HttpMethod::Get, None, params).unwrap_err();
        assert!(matches!(err, SpecError::DuplicateParameter { .. }));
    }

    #[test]
    fn test_operation_allows_same_name_in_different_locations() {
        let params = vec![
            Parameter::new("id", ParameterLocation::Query, "string", false),
            Parameter::new("id", ParameterLocation::Header, "string", false),
        ];
        let op = Operation::new(HttpMethod::Get, None, params).unwrap();
        assert_eq!(op.parameters().len(), 2);
        assert!(op.parameter("id", ParameterLocation::Header).is_some());
        assert!(op.parameter("id", ParameterLocation::Body).is_none());
    }

    #[test]
    fn test_resource_rejects_duplicate_method() {
        let ops = vec![
            Operation::new(HttpMethod::Get, None, vec![]).unwrap(),
            Operation::new(HttpMethod::Get, Some("again".into()), vec![]).unwrap(),
        ];
        let err = Resource::new("/items", ops).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateOperation {
                path: "/items".to_string(),
                method: "GET".to_string(),
            }
        );
    }

    #[test]
    fn test_specification_rejects_duplicate_path() {
        let resources = vec![
            Resource::new("/items", vec![]).unwrap(),
            Resource::new("/items", vec![]).unwrap(),
        ];
        let err = ApiSpecification::new("/v1", resources).unwrap_err();
        assert_eq!(err, SpecError::DuplicatePath("/items".to_string()));
    }

    #[test]
    fn test_find_matching_resource_prefers_exact() {
        let spec = ApiSpecification::new(
            "/v1",
            vec![
                Resource::new("/items/{a}", vec![]).unwrap(),
                Resource::new("/items/{id}", vec![]).unwrap(),
            ],
        )
        .unwrap();

        let exact = spec
            .find_matching_resource(&PathTemplate::parse("/items/{id}"))
            .unwrap();
        assert_eq!(exact.path(), "/items/{id}");

        let structural = spec
            .find_matching_resource(&PathTemplate::parse("/items/{other}"))
            .unwrap();
        assert_eq!(structural.path(), "/items/{a}");
    }

    #[test]
    fn test_specification_serializes_to_json() {
        let op = Operation::new(
            HttpMethod::Get,
            Some("getItem".into()),
            vec![Parameter::new("id", ParameterLocation::Path, "string", true)],
        )
        .unwrap();
        let spec = ApiSpecification::new("/v1", vec![Resource::new("/items/{id}", vec![op]).unwrap()])
            .unwrap()
            .with_version("1.0.0");

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["basePath"], "/v1");
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["resources"][0]["pathTemplate"], "/items/{id}");
        assert_eq!(
            json["resources"][0]["operations"]["GET"]["parameters"][0]["location"],
            "path"
        );
    }
}
