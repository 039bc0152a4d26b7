use thiserror::Error;

/// Unified error type for the entire lookthrough-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Data-quality problems (unknown symbols, failed network refreshes,
/// incomplete mappings) are never reported through this type. They are
/// logged and degrade to zero / "Unknown" values instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Catalogs ────────────────────────────────────────────────────
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Unsupported {kind} catalog version: {version}")]
    UnsupportedCatalogVersion { kind: String, version: u32 },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for lookup: {0}")]
    NoProvider(String),

    // ── Contract violations ─────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often carry the full URL, API key included.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
