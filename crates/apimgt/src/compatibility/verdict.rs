// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Pass/fail result of a compatibility check.

use super::{BreakingChange, IncompatibilityKind};
use serde::{Serialize, Serializer};
use std::fmt;

/// Whether a candidate can replace a baseline, and why not if it can't.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityVerdict {
    compatible: bool,
    reason: Option<BreakingChange>,
}

impl CompatibilityVerdict {
    pub fn compatible() -> Self {
        Self {
            compatible: true,
            reason: None,
        }
    }

    pub fn incompatible(reason: BreakingChange) -> Self {
        Self {
            compatible: false,
            reason: Some(reason),
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    /// The first breaking change found, if any.
    pub fn reason(&self) -> Option<&BreakingChange> {
        self.reason.as_ref()
    }

    pub fn kind(&self) -> Option<IncompatibilityKind> {
        self.reason.as_ref().map(|r| r.kind)
    }

    /// The verdict as the `(status, message)` pair callers usually log.
    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.compatible, self.reason.map(|r| r.to_string()))
    }
}

/// JSON form: `{"compatible": false, "kind": "base-path", "component": "basePath",
/// "reason": "BasePathIncompatible: ..."}`, with the last three omitted when compatible.
impl Serialize for CompatibilityVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct VerdictJson<'a> {
            compatible: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            kind: Option<IncompatibilityKind>,
            #[serde(skip_serializing_if = "Option::is_none")]
            component: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            reason: Option<String>,
        }

        VerdictJson {
            compatible: self.compatible,
            kind: self.kind(),
            component: self.reason.as_ref().map(|r| r.component.as_str()),
            reason: self.reason.as_ref().map(ToString::to_string),
        }
        .serialize(serializer)
    }
}

impl fmt::Display for CompatibilityVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            None => f.write_str("compatible"),
            Some(reason) => write!(f, "incompatible: {}", reason),
        }
    }
}
