//! Error kinds surfaced by the synchronization core.
//!
//! Source and storage failures abort the scan run being ingested; the driver
//! logs them against that run id and moves on. Configuration errors are
//! fatal at startup.

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Transport failure or non-2xx status from the scan source.
    #[error("scan source unavailable: {0}")]
    SourceUnavailable(String),

    /// Payload did not contain a required field or could not be decoded.
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        endpoint: String,
        reason: String,
    },

    /// Transaction, statement or commit failure in the relational store.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Unusable settings.
    #[error("configuration error: {field}: {reason}")]
    Configuration {
        field: String,
        reason: String,
    },
}

impl SyncError {
    pub fn malformed(endpoint: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        SyncError::MalformedResponse { endpoint: endpoint.into(), reason: reason.to_string() }
    }

    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SyncError::Configuration { field: field.into(), reason: reason.into() }
    }

    /// Short machine-friendly label used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::SourceUnavailable(_) => "source_unavailable",
            SyncError::MalformedResponse { .. } => "malformed_response",
            SyncError::Storage(_) => "storage_failure",
            SyncError::Configuration { .. } => "configuration_error",
        }
    }
}
