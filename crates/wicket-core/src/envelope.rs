//! # Error Envelope Module
//!
//! The uniform failure wrapper returned at the boundary.
//!
//! Every error raised within dispatch or handler execution is caught at
//! the pipeline boundary and passed through [`ErrorEnvelope::normalize`]
//! before leaving the process; nothing escapes unnormalized. Internal
//! faults keep their detail server-side: the full message is logged and
//! a generic one goes to the caller.

use crate::types::{ValidationDetail, WicketError};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR KIND
// =============================================================================

/// Machine-readable failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input shape; recoverable by the caller.
    Validation,
    /// Missing or shape-invalid session.
    Unauthorized,
    /// Authenticated but lacking a required scope.
    Forbidden,
    /// Unknown procedure name.
    NotFound,
    /// Anything unexpected; detail suppressed from the caller.
    Internal,
}

impl ErrorKind {
    /// Conventional transport-level status for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

// =============================================================================
// ERROR ENVELOPE
// =============================================================================

/// Client-visible message for internal faults. The real message is
/// logged server-side only.
const INTERNAL_MESSAGE: &str = "Internal error";

/// Uniform error wrapper returned at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Machine-readable failure kind.
    pub kind: ErrorKind,
    /// Human-readable message, safe for the caller.
    pub message: String,
    /// Field-level validation detail, when the kind carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ValidationDetail>,
}

impl ErrorEnvelope {
    /// Normalize an internal failure into the uniform envelope.
    ///
    /// Internal faults are logged with full detail here and reported to
    /// the caller with the original message suppressed, so nothing
    /// leaks implementation detail across the boundary.
    #[must_use]
    pub fn normalize(error: &WicketError) -> Self {
        match error {
            WicketError::Validation(detail) => Self {
                kind: ErrorKind::Validation,
                message: "Input validation failed".to_string(),
                detail: Some(detail.clone()),
            },
            WicketError::Unauthorized => Self {
                kind: ErrorKind::Unauthorized,
                message: "Unauthorized".to_string(),
                detail: None,
            },
            WicketError::Forbidden => Self {
                kind: ErrorKind::Forbidden,
                message: "Forbidden".to_string(),
                detail: None,
            },
            WicketError::NotFound(name) => Self {
                kind: ErrorKind::NotFound,
                message: format!("Unknown procedure: {name}"),
                detail: None,
            },
            WicketError::Internal(message) => {
                tracing::error!(
                    event = "internal_error",
                    error = %message,
                    "Internal failure crossed the dispatch boundary"
                );
                Self {
                    kind: ErrorKind::Internal,
                    message: INTERNAL_MESSAGE.to_string(),
                    detail: None,
                }
            }
        }
    }

    /// Conventional transport-level status for this envelope.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

// =============================================================================
// TESTS
// =============================================================================
