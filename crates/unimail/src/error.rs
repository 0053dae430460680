//! Error types for unimail operations

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by provider adapters, the resolver, and the store
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A message, account, or queue entry does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// An account's provider value is outside the known set
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// A network, auth, or remote-API failure from a provider call.
    /// Not retried here; the caller decides whether to retry.
    #[error("provider request failed: {0}")]
    ProviderRequest(#[from] ureq::Error),

    /// A required field was missing or invalid in an inbound request,
    /// rejected before any provider or store call
    #[error("validation failed: {0}")]
    Validation(String),

    /// A failure in the durable record store
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A schema migration failure
    #[error("migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    /// A JSON encode/decode failure (rule conditions, AI payloads)
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration or credential loading failure
    #[error("configuration error: {0}")]
    Config(#[source] anyhow::Error),
}

impl Error {
    /// Construct a not-found error for the given record kind and id
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Whether this error represents an absent record
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("message", "abc123");
        assert_eq!(err.to_string(), "message not found: abc123");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unsupported_provider_display() {
        let err = Error::UnsupportedProvider("yahoo".to_string());
        assert_eq!(err.to_string(), "unsupported provider: yahoo");
        assert!(!err.is_not_found());
    }
}
