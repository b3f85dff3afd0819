// ── Runtime resolver configuration ──
//
// Describes *where* the reference service lives and how to talk to it.
// Never touches disk: georef-config (or any embedder) builds a
// `ResolverConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed staging services).
    DangerAcceptInvalid,
}

/// Configuration for one reference-data service.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Service base URL (e.g., `https://geo.example.com/v1`).
    pub service_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,
    /// Overrides the default `georef/<version>` user agent.
    pub user_agent: Option<String>,
    /// Start the countries fetch as soon as the resolver is built.
    pub prefetch_countries: bool,
}

impl ResolverConfig {
    pub fn new(service_url: Url) -> Self {
        Self {
            service_url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            user_agent: None,
            prefetch_countries: false,
        }
    }
}
