use thiserror::Error;

/// Unified error type for the whole poonji-mitra-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    // ── Input ───────────────────────────────────────────────────────
    #[error("{0}")]
    ValidationError(String),

    #[error("Client not found: {0}")]
    ClientNotFound(String),

    // ── AI Gateway / Network ────────────────────────────────────────
    #[error("AI gateway error ({provider}): {message}")]
    Remote {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// The gateway answered with a well-formed but empty result.
    #[error("{0}")]
    EmptyResult(String),

    // ── Serialization ───────────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Setup ───────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No async runtime available to run the price refresh timer")]
    NoRuntime,
}

impl CoreError {
    /// Shorthand for a gateway failure attributed to `provider`.
    pub fn remote(provider: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Remote {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// `true` for every failure that originates at (or beyond) the AI gateway.
    /// These are shown to the user the same way and are retried by the next refresh.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            CoreError::Remote { .. } | CoreError::Network(_) | CoreError::EmptyResult(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // The Gemini API key travels in the query string; never let it reach a message.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
