// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backward Compatibility Checking
//!
//! Compares a baseline [`ApiSpecification`] with a candidate and decides
//! whether clients written against the baseline keep working.
//!
//! Rules run in a fixed order, coarsest first:
//! 1. base path
//! 2. resource path coverage
//! 3. operation coverage
//! 4. operation signature
//!
//! In [`EvaluationMode::FailFast`] the pipeline stops at the first rule that
//! reports a breaking change, so a single root cause is reported instead of a
//! cascade. [`EvaluationMode::Report`] runs every rule and returns the full
//! [`CompatibilityReport`].

pub mod rules;
pub mod verdict;

use crate::config::{CheckerConfig, EvaluationMode};
use crate::model::ApiSpecification;
use serde::Serialize;
use std::fmt;
use strum::{AsRefStr, Display};
use tracing::{debug, info};

pub use rules::{
    BasePathRule, CompatibilityRule, OperationCoverageRule, OperationSignatureRule,
    ResourcePathRule, RuleContext,
};
pub use verdict::CompatibilityVerdict;

// ============================================================================
// Report Types
// ============================================================================

/// Which rule a breaking change violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
pub enum IncompatibilityKind {
    #[strum(to_string = "BasePathIncompatible")]
    BasePath,
    #[strum(to_string = "ResourcePathIncompatible")]
    ResourcePath,
    #[strum(to_string = "MissingOperationIncompatible")]
    MissingOperation,
    #[strum(to_string = "HttpMethodIncompatible")]
    HttpMethod,
}

impl IncompatibilityKind {
    /// Short identifier: `base-path`, `resource-path`, `missing-operation`
    /// or `http-method`.
    pub fn code(&self) -> &'static str {
        match self {
            IncompatibilityKind::BasePath => "base-path",
            IncompatibilityKind::ResourcePath => "resource-path",
            IncompatibilityKind::MissingOperation => "missing-operation",
            IncompatibilityKind::HttpMethod => "http-method",
        }
    }
}

/// A change that breaks existing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakingChange {
    pub kind: IncompatibilityKind,
    pub component: String,
    pub description: String,
}

impl BreakingChange {
    pub fn new(
        kind: IncompatibilityKind,
        component: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            component: component.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

/// A change existing clients never notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibleChange {
    pub change_type: CompatibleChangeType,
    pub component: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibleChangeType {
    AddedResource,
    AddedOperation,
    OptionalParameterAdded,
    ParameterRelaxed,
    ParameterRemoved,
}

/// Everything the pipeline found, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub breaking_changes: Vec<BreakingChange>,
    pub compatible_changes: Vec<CompatibleChange>,
    pub warnings: Vec<String>,
}

impl CompatibilityReport {
    /// True when no breaking change was found. Warnings are allowed.
    pub fn is_compatible(&self) -> bool {
        self.breaking_changes.is_empty()
    }

    /// Verdict carrying the first breaking change, if any.
    pub fn verdict(&self) -> CompatibilityVerdict {
        match self.breaking_changes.first() {
            Some(change) => CompatibilityVerdict::incompatible(change.clone()),
            None => CompatibilityVerdict::compatible(),
        }
    }

    pub(crate) fn breaking(&mut self, change: BreakingChange) {
        self.breaking_changes.push(change);
    }

    pub(crate) fn compatible(
        &mut self,
        change_type: CompatibleChangeType,
        component: impl Into<String>,
        description: impl Into<String>,
    ) {
        self.compatible_changes.push(CompatibleChange {
            change_type,
            component: component.into(),
            description: description.into(),
        });
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered sequence of compatibility rules.
pub struct CompatibilityPipeline {
    rules: Vec<Box<dyn CompatibilityRule>>,
    config: CheckerConfig,
}

impl CompatibilityPipeline {
    /// The standard four-rule pipeline.
    pub fn new(config: CheckerConfig) -> Self {
        Self::with_rules(
            config,
            vec![
                Box::new(BasePathRule),
                Box::new(ResourcePathRule),
                Box::new(OperationCoverageRule),
                Box::new(OperationSignatureRule),
            ],
        )
    }

    /// A pipeline running `rules` in the given order.
    pub fn with_rules(config: CheckerConfig, rules: Vec<Box<dyn CompatibilityRule>>) -> Self {
        Self { rules, config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run the rules in the configured mode.
    pub fn run(
        &self,
        baseline: &ApiSpecification,
        candidate: &ApiSpecification,
    ) -> CompatibilityReport {
        self.evaluate(baseline, candidate, self.config.mode)
    }

    /// Run the rules, stopping after the first failing rule in fail-fast mode.
    pub fn evaluate(
        &self,
        baseline: &ApiSpecification,
        candidate: &ApiSpecification,
        mode: EvaluationMode,
    ) -> CompatibilityReport {
        let ctx = RuleContext {
            baseline,
            candidate,
            config: &self.config,
        };
        let mut report = CompatibilityReport::default();

        if baseline.version() != candidate.version() {
            report.warn(format!(
                "Version changed from {} to {}",
                baseline.version().unwrap_or("unknown"),
                candidate.version().unwrap_or("unknown")
            ));
        }

        for rule in &self.rules {
            let before = report.breaking_changes.len();
            rule.check(&ctx, &mut report);

            let found = report.breaking_changes.len() - before;
            if found > 0 {
                debug!(rule = rule.name(), breaking_changes = found, "Rule failed");
                if mode == EvaluationMode::FailFast {
                    break;
                }
            }
        }

        report
    }

    /// Fail-fast verdict.
    pub fn check(
        &self,
        baseline: &ApiSpecification,
        candidate: &ApiSpecification,
    ) -> CompatibilityVerdict {
        let verdict = self
            .evaluate(baseline, candidate, EvaluationMode::FailFast)
            .verdict();
        info!(
            compatible = verdict.is_compatible(),
            reason = verdict.reason().map(|r| r.kind.code()),
            "Compatibility check finished"
        );
        verdict
    }

    /// Exhaustive report.
    pub fn report(
        &self,
        baseline: &ApiSpecification,
        candidate: &ApiSpecification,
    ) -> CompatibilityReport {
        self.evaluate(baseline, candidate, EvaluationMode::Report)
    }
}

impl Default for CompatibilityPipeline {
    fn default() -> Self {
        Self::new(CheckerConfig::default())
    }
}

impl fmt::Debug for CompatibilityPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityPipeline")
            .field("rules", &self.rule_names())
            .field("config", &self.config)
            .finish()
    }
}

/// Check whether `candidate` can replace `baseline` without breaking clients.
///
/// Stops at the first failing rule and reports only its diagnostic.
pub fn check_compatibility(
    baseline: &ApiSpecification,
    candidate: &ApiSpecification,
) -> CompatibilityVerdict {
    CompatibilityPipeline::default().check(baseline, candidate)
}

/// Collect every breaking and compatible change between two specifications.
pub fn check_compatibility_report(
    baseline: &ApiSpecification,
    candidate: &ApiSpecification,
) -> CompatibilityReport {
    CompatibilityPipeline::default().report(baseline, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, Operation, Parameter, ParameterLocation, Resource};

    fn spec(base_path: &str, resources: Vec<Resource>) -> ApiSpecification {
        ApiSpecification::new(base_path, resources).unwrap()
    }

    fn resource(path: &str, methods: &[HttpMethod]) -> Resource {
        let ops = methods
            .iter()
            .map(|m| Operation::new(*m, None, vec![]).unwrap())
            .collect();
        Resource::new(path, ops).unwrap()
    }

    fn items_baseline() -> ApiSpecification {
        spec(
            "/v1",
            vec![
                resource("/items", &[HttpMethod::Get, HttpMethod::Post]),
                resource("/items/{id}", &[HttpMethod::Get, HttpMethod::Delete]),
            ],
        )
    }

    // ============================================================================
    // Report Type Tests
    // ============================================================================

    #[test]
    fn test_empty_report_is_compatible() {
        let report = CompatibilityReport::default();
        assert!(report.is_compatible());
        assert!(report.verdict().is_compatible());
    }

    #[test]
    fn test_incompatibility_kind_display_and_code() {
        assert_eq!(
            IncompatibilityKind::BasePath.to_string(),
            "BasePathIncompatible"
        );
        assert_eq!(
            IncompatibilityKind::MissingOperation.to_string(),
            "MissingOperationIncompatible"
        );
        assert_eq!(IncompatibilityKind::HttpMethod.code(), "http-method");
        assert_eq!(IncompatibilityKind::ResourcePath.code(), "resource-path");
    }

    #[test]
    fn test_breaking_change_display() {
        let change = BreakingChange::new(
            IncompatibilityKind::BasePath,
            "basePath",
            "Base path changed from '/v1' to '/v2'",
        );
        assert_eq!(
            change.to_string(),
            "BasePathIncompatible: Base path changed from '/v1' to '/v2'"
        );
    }

    #[test]
    fn test_report_serializes() {
        let mut report = CompatibilityReport::default();
        report.breaking(BreakingChange::new(
            IncompatibilityKind::ResourcePath,
            "/items",
            "Resource path '/items' was removed",
        ));
        report.compatible(CompatibleChangeType::AddedResource, "/users", "added");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["breaking_changes"][0]["kind"], "resource-path");
        assert_eq!(json["compatible_changes"][0]["change_type"], "added-resource");
    }

    // ============================================================================
    // Pipeline Tests
    // ============================================================================

    #[test]
    fn test_rule_order() {
        let pipeline = CompatibilityPipeline::default();
        assert_eq!(
            pipeline.rule_names(),
            vec![
                "base-path",
                "resource-path",
                "operation-coverage",
                "operation-signature"
            ]
        );
    }

    #[test]
    fn test_self_compatible() {
        let baseline = items_baseline();
        let verdict = check_compatibility(&baseline, &baseline);
        assert!(verdict.is_compatible());
        assert!(verdict.reason().is_none());
    }

    #[test]
    fn test_fail_fast_stops_at_first_rule() {
        let baseline = items_baseline();
        let candidate = spec("/v2", vec![resource("/items", &[HttpMethod::Get])]);

        let report = CompatibilityPipeline::default().evaluate(
            &baseline,
            &candidate,
            EvaluationMode::FailFast,
        );
        assert_eq!(report.breaking_changes.len(), 1);
        assert_eq!(report.breaking_changes[0].kind, IncompatibilityKind::BasePath);
    }

    #[test]
    fn test_report_mode_collects_everything() {
        let baseline = items_baseline();
        let candidate = spec("/v2", vec![resource("/items", &[HttpMethod::Get])]);

        let report = check_compatibility_report(&baseline, &candidate);
        let kinds: Vec<_> = report.breaking_changes.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IncompatibilityKind::BasePath,
                IncompatibilityKind::ResourcePath,
                IncompatibilityKind::MissingOperation,
            ]
        );
    }

    #[test]
    fn test_verdict_agrees_with_report() {
        let baseline = items_baseline();
        let candidate = spec(
            "/v1",
            vec![
                resource("/items", &[HttpMethod::Get]),
                resource("/items/{id}", &[HttpMethod::Get, HttpMethod::Delete]),
            ],
        );

        let verdict = check_compatibility(&baseline, &candidate);
        let report = check_compatibility_report(&baseline, &candidate);
        assert_eq!(verdict.is_compatible(), report.is_compatible());
        assert_eq!(verdict, report.verdict());
        assert_eq!(
            verdict.kind(),
            Some(IncompatibilityKind::MissingOperation)
        );
    }

    #[test]
    fn test_run_uses_configured_mode() {
        let baseline = items_baseline();
        let candidate = spec("/v2", vec![]);

        let fail_fast = CompatibilityPipeline::default().run(&baseline, &candidate);
        assert_eq!(fail_fast.breaking_changes.len(), 1);

        let exhaustive =
            CompatibilityPipeline::new(CheckerConfig::default().with_mode(EvaluationMode::Report))
                .run(&baseline, &candidate);
        assert_eq!(exhaustive.breaking_changes.len(), 3);
    }

    #[test]
    fn test_version_change_warning() {
        let baseline = items_baseline().with_version("1.0.0");
        let candidate = items_baseline().with_version("1.1.0");

        let report = check_compatibility_report(&baseline, &candidate);
        assert!(report.is_compatible());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("1.0.0"));
        assert!(report.warnings[0].contains("1.1.0"));
    }

    #[test]
    fn test_custom_rule_set() {
        let baseline = items_baseline();
        let candidate = spec("/v2", vec![]);
        let pipeline =
            CompatibilityPipeline::with_rules(CheckerConfig::default(), vec![Box::new(ResourcePathRule)]);

        let verdict = pipeline.check(&baseline, &candidate);
        assert_eq!(verdict.kind(), Some(IncompatibilityKind::ResourcePath));
    }

    #[test]
    fn test_pipeline_debug_lists_rules() {
        let debug = format!("{:?}", CompatibilityPipeline::default());
        assert!(debug.contains("operation-signature"));
    }

    #[test]
    fn test_optional_parameter_keeps_compatibility() {
        let op = |params: Vec<Parameter>| Operation::new(HttpMethod::Get, None, params).unwrap();
        let baseline = spec(
            "/v1",
            vec![Resource::new("/items/{id}", vec![op(vec![])]).unwrap()],
        );
        let candidate = spec(
            "/v1",
            vec![
                Resource::new(
                    "/items/{id}",
                    vec![op(vec![Parameter::new(
                        "verbose",
                        ParameterLocation::Query,
                        "boolean",
                        false,
                    )])],
                )
                .unwrap(),
            ],
        );

        assert!(check_compatibility(&baseline, &candidate).is_compatible());
    }
}
