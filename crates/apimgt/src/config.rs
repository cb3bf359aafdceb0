// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Checker configuration.

use std::env;
use std::str::FromStr;
use strum::{Display, EnumString};
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(pub String);

/// How far the rule pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum EvaluationMode {
    /// Stop at the first rule that reports a breaking change.
    #[default]
    FailFast,
    /// Run every rule and collect every change.
    Report,
}

/// Options for the compatibility pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Evaluation mode (default: fail-fast)
    pub mode: EvaluationMode,
    /// Emit a warning when a retained operation changes its operationId
    /// (default: false)
    pub warn_on_operation_id_change: bool,
}

impl CheckerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `APIMGT_MODE` - `fail-fast` or `report` (default: fail-fast)
    /// - `APIMGT_WARN_ON_OPERATION_ID_CHANGE` - `true`/`1` to warn on renamed
    ///   operation ids (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match env::var("APIMGT_MODE") {
            Ok(value) => EvaluationMode::from_str(value.trim())
                .map_err(|_| ConfigError(format!("invalid APIMGT_MODE: {}", value)))?,
            Err(_) => EvaluationMode::default(),
        };

        let warn_on_operation_id_change = env::var("APIMGT_WARN_ON_OPERATION_ID_CHANGE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self {
            mode,
            warn_on_operation_id_change,
        })
    }

    /// Set the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Warn when an operationId changes between versions.
    pub fn with_operation_id_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_operation_id_change = enabled;
        self
    }
}
