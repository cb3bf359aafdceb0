// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The individual compatibility rules.
//!
//! Each rule looks at the whole `(baseline, candidate)` pair on its own and
//! records what it finds in the report. Rules never depend on each other's
//! output; resources are re-matched structurally wherever a rule needs them.

use super::{BreakingChange, CompatibilityReport, CompatibleChangeType, IncompatibilityKind};
use crate::config::CheckerConfig;
use crate::model::{ApiSpecification, Operation, Parameter, ParameterLocation, PathTemplate, Resource};
use std::collections::HashMap;

/// Inputs shared by every rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub baseline: &'a ApiSpecification,
    pub candidate: &'a ApiSpecification,
    pub config: &'a CheckerConfig,
}

impl<'a> RuleContext<'a> {
    /// Baseline resources paired with their structural match in the candidate.
    /// Baseline resources without a match are skipped.
    pub fn matched_resources(&self) -> impl Iterator<Item = (&'a Resource, &'a Resource)> + 'a {
        let (baseline, candidate) = (self.baseline, self.candidate);
        baseline.resources().iter().filter_map(move |resource| {
            candidate
                .find_matching_resource(resource.path_template())
                .map(|matched| (resource, matched))
        })
    }
}

/// One compatibility check.
pub trait CompatibilityRule: Send + Sync {
    /// Short kebab-case name used in logs.
    fn name(&self) -> &'static str;

    /// Record breaking and compatible changes into `report`.
    fn check(&self, ctx: &RuleContext<'_>, report: &mut CompatibilityReport);
}

// ============================================================================
// Base Path
// ============================================================================

/// The base path must be identical, byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasePathRule;

impl CompatibilityRule for BasePathRule {
    fn name(&self) -> &'static str {
        "base-path"
    }

    fn check(&self, ctx: &RuleContext<'_>, report: &mut CompatibilityReport) {
        let old = ctx.baseline.base_path();
        let new = ctx.candidate.base_path();
        if old != new {
            report.breaking(BreakingChange::new(
                IncompatibilityKind::BasePath,
                "basePath",
                format!("Base path changed from '{}' to '{}'", old, new),
            ));
        }
    }
}

// ============================================================================
// Resource Paths
// ============================================================================

/// Every baseline path template needs a structural match in the candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourcePathRule;

impl CompatibilityRule for ResourcePathRule {
    fn name(&self) -> &'static str {
        "resource-path"
    }

    fn check(&self, ctx: &RuleContext<'_>, report: &mut CompatibilityReport) {
        for resource in ctx.baseline.resources() {
            if ctx
                .candidate
                .find_matching_resource(resource.path_template())
                .is_none()
            {
                report.breaking(BreakingChange::new(
                    IncompatibilityKind::ResourcePath,
                    resource.path(),
                    format!("Resource path '{}' was removed", resource.path()),
                ));
            }
        }

        for resource in ctx.candidate.resources() {
            if ctx
                .baseline
                .find_matching_resource(resource.path_template())
                .is_none()
            {
                report.compatible(
                    CompatibleChangeType::AddedResource,
                    resource.path(),
                    format!("Resource path '{}' was added", resource.path()),
                );
            }
        }
    }
}

// ============================================================================
// Operation Coverage
// ============================================================================

/// Every baseline method must survive on the matched candidate resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationCoverageRule;

impl CompatibilityRule for OperationCoverageRule {
    fn name(&self) -> &'static str {
        "operation-coverage"
    }

    fn check(&self, ctx: &RuleContext<'_>, report: &mut CompatibilityReport) {
        for (old, new) in ctx.matched_resources() {
            for method in old.methods() {
                if new.operation(method).is_none() {
                    report.breaking(BreakingChange::new(
                        IncompatibilityKind::MissingOperation,
                        format!("{} {}", method, old.path()),
                        format!("Operation {} was removed from '{}'", method, old.path()),
                    ));
                }
            }

            for method in new.methods() {
                if old.operation(method).is_none() {
                    report.compatible(
                        CompatibleChangeType::AddedOperation,
                        format!("{} {}", method, new.path()),
                        format!("Operation {} was added to '{}'", method, new.path()),
                    );
                }
            }
        }
    }
}

// ============================================================================
// Operation Signature
// ============================================================================

/// Retained operations must accept every request they accepted before.
///
/// - a new required parameter breaks callers
/// - a parameter changing type breaks callers
/// - an optional parameter becoming required breaks callers that omitted it
/// - dropping a parameter or making it optional is a relaxation
/// - a new optional parameter is harmless
///
/// Path parameters are identified by their placeholder position, so
/// `/items/{id}` and `/items/{itemId}` describe the same parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationSignatureRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ParameterKey<'a> {
    Named(&'a str, ParameterLocation),
    PathPosition(usize),
}

fn parameter_key<'a>(template: &PathTemplate, param: &'a Parameter) -> ParameterKey<'a> {
    if param.location() == ParameterLocation::Path {
        if let Some(index) = template.placeholder_index(param.name()) {
            return ParameterKey::PathPosition(index);
        }
    }
    ParameterKey::Named(param.name(), param.location())
}

impl CompatibilityRule for OperationSignatureRule {
    fn name(&self) -> &'static str {
        "operation-signature"
    }

    fn check(&self, ctx: &RuleContext<'_>, report: &mut CompatibilityReport) {
        for (old_resource, new_resource) in ctx.matched_resources() {
            for old_op in old_resource.operations() {
                if let Some(new_op) = new_resource.operation(old_op.method()) {
                    compare_operation(ctx, old_resource, old_op, new_resource, new_op, report);
                }
            }
        }
    }
}

fn compare_operation(
    ctx: &RuleContext<'_>,
    old_resource: &Resource,
    old_op: &Operation,
    new_resource: &Resource,
    new_op: &Operation,
    report: &mut CompatibilityReport,
) {
    let operation = format!("{} {}", old_op.method(), old_resource.path());

    let old_keyed: Vec<_> = old_op
        .parameters()
        .iter()
        .map(|p| (parameter_key(old_resource.path_template(), p), p))
        .collect();
    let old_params: HashMap<_, _> = old_keyed.iter().copied().collect();
    let new_keys: Vec<_> = new_op
        .parameters()
        .iter()
        .map(|p| parameter_key(new_resource.path_template(), p))
        .collect();

    for (key, new_param) in new_keys.iter().zip(new_op.parameters()) {
        let component = format!("{} {}", operation, new_param.name());

        let Some(old_param) = old_params.get(key) else {
            if new_param.is_required() {
                report.breaking(BreakingChange::new(
                    IncompatibilityKind::HttpMethod,
                    component,
                    format!(
                        "Required {} parameter '{}' added to {}",
                        new_param.location(),
                        new_param.name(),
                        operation
                    ),
                ));
            } else {
                report.compatible(
                    CompatibleChangeType::OptionalParameterAdded,
                    component,
                    format!(
                        "Optional {} parameter '{}' added to {}",
                        new_param.location(),
                        new_param.name(),
                        operation
                    ),
                );
            }
            continue;
        };

        if old_param.param_type() != new_param.param_type() {
            report.breaking(BreakingChange::new(
                IncompatibilityKind::HttpMethod,
                component,
                format!(
                    "Parameter '{}' of {} changed type from {} to {}",
                    old_param.name(),
                    operation,
                    old_param.param_type(),
                    new_param.param_type()
                ),
            ));
        } else if old_param.is_required() && !new_param.is_required() {
            report.compatible(
                CompatibleChangeType::ParameterRelaxed,
                component,
                format!(
                    "Parameter '{}' of {} is no longer required",
                    old_param.name(),
                    operation
                ),
            );
        } else if !old_param.is_required() && new_param.is_required() {
            report.breaking(BreakingChange::new(
                IncompatibilityKind::HttpMethod,
                component,
                format!(
                    "Parameter '{}' of {} changed from optional to required",
                    old_param.name(),
                    operation
                ),
            ));
        }
    }

    for (key, old_param) in &old_keyed {
        if !new_keys.contains(key) {
            report.compatible(
                CompatibleChangeType::ParameterRemoved,
                format!("{} {}", operation, old_param.name()),
                format!(
                    "Parameter '{}' was removed from {}",
                    old_param.name(),
                    operation
                ),
            );
        }
    }

    if ctx.config.warn_on_operation_id_change && old_op.operation_id() != new_op.operation_id() {
        report.warn(format!(
            "operationId of {} changed from {} to {}",
            operation,
            old_op.operation_id().unwrap_or("none"),
            new_op.operation_id().unwrap_or("none")
        ));
    }
}
