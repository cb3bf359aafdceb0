// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural error types.
//!
//! Every variant describes a document that cannot be reduced to the canonical
//! [`ApiSpecification`](crate::model::ApiSpecification) model. Incompatibility
//! between two well-formed specifications is never reported through this type.

use thiserror::Error;

/// Result type using SpecError.
pub type Result<T> = std::result::Result<T, SpecError>;

/// A malformed specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A required structural field is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong shape or value.
    #[error("invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// The same path template is declared more than once.
    #[error("duplicate path template: {0}")]
    DuplicatePath(String),

    /// A path declares more than one operation for the same HTTP method.
    #[error("duplicate operation {method} on path {path}")]
    DuplicateOperation { path: String, method: String },

    /// An operation declares the same `(name, location)` parameter twice.
    #[error("duplicate parameter '{name}' in {location} on {operation}")]
    DuplicateParameter {
        operation: String,
        name: String,
        location: String,
    },

    /// A `$ref` could not be resolved within the document.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),

    /// The document is not a recognised specification dialect.
    #[error("unsupported specification: {0}")]
    Unsupported(String),
}

impl SpecError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        SpecError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}
