//! CLI configuration: thin wrapper around `georef_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --timeout, --insecure).

use georef_core::ResolverConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use georef_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Apply global flag overrides on top of file/env settings.
pub fn apply_overrides(mut config: Config, global: &GlobalOpts) -> Config {
    if let Some(url) = &global.url {
        config.service.url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        config.service.timeout_secs = timeout;
    }
    if global.insecure {
        config.service.insecure = true;
    }
    config
}

/// Resolve the effective `ResolverConfig` from config file, env and flags.
pub fn resolve(global: &GlobalOpts) -> Result<ResolverConfig, CliError> {
    let config = apply_overrides(load_config()?, global);
    if config.service.timeout_secs == 0 {
        return Err(CliError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    if config.service.url.is_none() {
        return Err(CliError::NoServiceUrl {
            path: config_path().display().to_string(),
        });
    }
    Ok(georef_config::to_resolver_config(&config)?)
}
