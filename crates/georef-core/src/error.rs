// ── Core error types ──
//
// Resolver-level errors. Widgets never see these: the deduplicator
// degrades every fetch failure to an empty listing. They surface in
// logs, in `Settlement::Failed`, and at construction time.
// The `From<georef_api::Error>` impl translates transport-layer errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Reference data unavailable: {reason}")]
    NetworkFailure { reason: String },

    #[error("Reference request timed out")]
    Timeout,

    // ── Cache errors ─────────────────────────────────────────────────
    #[error("Cache entry already populated for {key}")]
    DuplicateKeyWrite { key: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<georef_api::Error> for CoreError {
    fn from(err: georef_api::Error) -> Self {
        match err {
            ref e if e.is_timeout() => CoreError::Timeout,
            georef_api::Error::Transport(e) => CoreError::NetworkFailure {
                reason: e.to_string(),
            },
            georef_api::Error::Status { status, url } => CoreError::NetworkFailure {
                reason: format!("HTTP {status} from {url}"),
            },
            georef_api::Error::Deserialization { message, body: _ } => {
                CoreError::NetworkFailure {
                    reason: format!("malformed listing: {message}"),
                }
            }
            georef_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            georef_api::Error::BaseUrl(url) => CoreError::Config {
                message: format!("URL cannot be used as a service base: {url}"),
            },
            georef_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn status_errors_become_network_failures() {
        let err: CoreError = georef_api::Error::Status {
            status: 502,
            url: "http://ref/countries".into(),
        }
        .into();
        assert!(matches!(err, CoreError::NetworkFailure { .. }));
        assert!(err.to_string().contains("HTTP 502"));
    }

    #[test]
    fn tls_errors_become_config_errors() {
        let err: CoreError = georef_api::Error::Tls("bad cert".into()).into();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
