//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use georef_config::ConfigError;
use georef_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not load {what} from {url}: {reason}")]
    #[diagnostic(
        code(georef::unavailable),
        help(
            "Check that the reference service is running and reachable.\n\
             URL: {url}\n\
             Run with -v for request details."
        )
    )]
    Unavailable {
        what: String,
        url: String,
        reason: String,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(georef::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{level} '{key}' not found")]
    #[diagnostic(
        code(georef::not_found),
        help("Run: georef {list_command} to see available keys")
    )]
    NotFound {
        level: String,
        key: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(georef::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No reference service URL configured")]
    #[diagnostic(
        code(georef::no_url),
        help(
            "Pass --url, set GEOREF_URL, or create a config file with:\n\
             georef config init --service-url <URL>\n\
             Expected at: {path}"
        )
    )]
    NoServiceUrl { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(georef::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(georef::config))]
    Config(#[from] ConfigError),

    #[error("Resolver setup failed: {message}")]
    #[diagnostic(code(georef::setup))]
    Setup { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(georef::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unavailable { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NotFound { .. } => exit_code::USAGE,
            Self::NoServiceUrl { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_)
            | Self::Setup { .. } => exit_code::CONFIG,
            Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }

    /// Translate a failed lookup into a user-facing error.
    pub fn from_lookup(err: &CoreError, what: &str, url: &str, timeout_secs: u64) -> Self {
        match err {
            CoreError::Timeout => Self::Timeout {
                seconds: timeout_secs,
            },
            other => Self::Unavailable {
                what: what.into(),
                url: url.into(),
                reason: other.to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => Self::Setup { message },
            CoreError::Timeout => Self::Timeout { seconds: 0 },
            CoreError::NetworkFailure { reason } => Self::Unavailable {
                what: "reference data".into(),
                url: "(unknown)".into(),
                reason,
            },
            CoreError::DuplicateKeyWrite { key } => Self::Setup {
                message: format!("cache entry {key} written twice"),
            },
            CoreError::Internal(message) => Self::Setup { message },
        }
    }
}
