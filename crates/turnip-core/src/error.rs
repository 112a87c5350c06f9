//! Error types for upstream calls and wake decisions.

use thiserror::Error;

/// Result type alias for port (upstream adapter) calls.
pub type PortResult<T> = Result<T, PortError>;

/// Result type alias for wake decisions.
pub type WakeResult<T> = Result<T, WakeError>;

/// A remote call through one of the ports failed at the transport or API level.
#[derive(Debug, Error)]
#[error("{operation} failed: {message}")]
pub struct PortError {
    /// Remote operation name, e.g. `DescribeServices`.
    pub operation: &'static str,
    pub message: String,
}

impl PortError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Everything that can stop the controller from producing a holding page
/// or a redirect.
///
/// "Nothing healthy yet" and "no listener forwards here" are not errors;
/// they fall back to the holding page.
#[derive(Debug, Error)]
pub enum WakeError {
    /// A required inbound parameter was missing or blank. Carries the
    /// machine-readable error code.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    /// A remote API errored, timed out, or did not know the resource.
    #[error("{operation} unavailable: {reason}")]
    UpstreamUnavailable {
        operation: &'static str,
        reason: String,
    },

    /// A remote API answered, but without a field the decision needs.
    #[error("malformed {operation} response: {detail}")]
    MalformedResponse {
        operation: &'static str,
        detail: String,
    },
}

impl WakeError {
    pub fn unavailable(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            operation,
            reason: reason.into(),
        }
    }

    pub fn malformed(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation,
            detail: detail.into(),
        }
    }

    /// HTTP status the inbound response should carry.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::MalformedResponse { .. } => 502,
            Self::UpstreamUnavailable { .. } => 503,
        }
    }

    /// Stable error code for response bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(code) => code,
            Self::UpstreamUnavailable { .. } => "upstream_unavailable",
            Self::MalformedResponse { .. } => "malformed_upstream_response",
        }
    }
}

impl From<PortError> for WakeError {
    fn from(e: PortError) -> Self {
        Self::UpstreamUnavailable {
            operation: e.operation,
            reason: e.message,
        }
    }
}
