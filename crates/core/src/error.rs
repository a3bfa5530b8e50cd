//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One taxonomy for the whole platform: request handlers map these onto HTTP
/// statuses, so every failure a caller can branch on needs its own variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed email, out-of-range year).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated (e.g. illegal status transition).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. duplicate creation).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No authenticated identity was presented.
    #[error("unauthenticated")]
    Authentication,

    /// The identity lacks membership or a required capability.
    #[error("unauthorized: {0}")]
    Authorization(String),

    /// An external provider call (AI, payments, QR, storage) failed.
    #[error("external provider failure: {0}")]
    Provider(String),

    /// A booking cancellation was requested inside the cutoff window.
    #[error("cancellation window closed: {0}")]
    CancellationWindow(String),

    /// A slot conflicts with an existing window.
    #[error("overlapping slot: {0}")]
    Overlap(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn cancellation_window(msg: impl Into<String>) -> Self {
        Self::CancellationWindow(msg.into())
    }

    pub fn overlap(msg: impl Into<String>) -> Self {
        Self::Overlap(msg.into())
    }
}
