//! Domain-level error type used across services and infra adapters.
//!
//! This error type is transport-agnostic. Command surfaces (HTTP, WebSocket)
//! convert it into their own error shape; the stable machine code from
//! [`DomainError::code`] is what goes on the wire and into private
//! `Error` events.

use thiserror::Error;

/// Domain-level not found entities (minimal set; extend as needed)
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Player,
    Card,
}

/// Central domain error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing resource in domain terms
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
    /// Action illegal in the session's current state
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Turn/order violation; detail names the expected player
    #[error("not your turn: {0}")]
    NotYourTurn(String),
    /// First play of a round attempted before an attribute was chosen
    #[error("attribute not selected: {0}")]
    AttributeNotSelected(String),
    /// Malformed input (bad transformation index, bad reorder payload, ...)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Unexpected internal failure; detail is logged, never broadcast
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn invalid_state(detail: impl Into<String>) -> Self {
        Self::InvalidState(detail.into())
    }
    pub fn not_your_turn(detail: impl Into<String>) -> Self {
        Self::NotYourTurn(detail.into())
    }
    pub fn attribute_not_selected(detail: impl Into<String>) -> Self {
        Self::AttributeNotSelected(detail.into())
    }
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument(detail.into())
    }
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// Stable machine-readable code for event payloads and clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(..) => "NOT_FOUND",
            DomainError::InvalidState(..) => "INVALID_STATE",
            DomainError::NotYourTurn(..) => "NOT_YOUR_TURN",
            DomainError::AttributeNotSelected(..) => "ATTRIBUTE_NOT_SELECTED",
            DomainError::InvalidArgument(..) => "INVALID_ARGUMENT",
            DomainError::Internal(..) => "INTERNAL",
        }
    }

    /// Message safe to send to clients. Internal details are replaced with a
    /// generic message; everything else is caller-facing by construction.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::Internal(..) => "Unexpected internal error".to_string(),
            other => other.to_string(),
        }
    }
}
