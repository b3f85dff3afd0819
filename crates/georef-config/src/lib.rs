//! Shared configuration for georef consumers.
//!
//! TOML file + environment layering, and translation to
//! `georef_core::ResolverConfig`. The CLI adds flag-aware wrappers on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use georef_core::{ResolverConfig, TlsVerification};

/// Environment variable that points at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "GEOREF_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceSettings,

    #[serde(default)]
    pub resolver: ResolverSettings,
}

/// Where the reference-data service lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceSettings {
    /// Service base URL (e.g., "https://geo.example.com/v1").
    pub url: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    pub user_agent: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout(),
            user_agent: None,
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverSettings {
    /// Start loading countries as soon as the resolver is built.
    #[serde(default)]
    pub prefetch_countries: bool,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path.
///
/// `GEOREF_CONFIG` wins; otherwise XDG / platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "georef", "georef").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("georef");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if present), then `GEOREF_*` variables.
///
/// Nested keys use a double underscore: `GEOREF_SERVICE__URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GEOREF_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ResolverConfig` from loaded settings.
pub fn to_resolver_config(config: &Config) -> Result<ResolverConfig, ConfigError> {
    let service = &config.service;
    let raw = service.url.as_deref().ok_or_else(|| ConfigError::Validation {
        field: "service.url".into(),
        reason: "no reference service URL configured".into(),
    })?;
    let url: url::Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: "service.url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "service.url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    let tls = if service.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = service.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut resolver = ResolverConfig::new(url);
    resolver.tls = tls;
    resolver.timeout = Duration::from_secs(service.timeout_secs);
    resolver.user_agent.clone_from(&service.user_agent);
    resolver.prefetch_countries = config.resolver.prefetch_countries;
    Ok(resolver)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_apply_without_file() {
        Jail::expect_with(|jail| {
            let config = load_config_from(&jail.directory().join("missing.toml"))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            assert_eq!(config.service.timeout_secs, 30);
            Ok(())
        });
    }

    #[test]
    fn file_values_are_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [service]
                url = "https://geo.example.com/v1"
                timeout_secs = 5

                [resolver]
                prefetch_countries = true
                "#,
            )?;
            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(
                config.service.url.as_deref(),
                Some("https://geo.example.com/v1")
            );
            assert_eq!(config.service.timeout_secs, 5);
            assert!(config.resolver.prefetch_countries);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [service]
                url = "https://geo.example.com/v1"
                "#,
            )?;
            jail.set_env("GEOREF_SERVICE__URL", "http://localhost:9000");
            jail.set_env("GEOREF_SERVICE__TIMEOUT_SECS", "12");

            let config = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;
            assert_eq!(config.service.url.as_deref(), Some("http://localhost:9000"));
            assert_eq!(config.service.timeout_secs, 12);
            Ok(())
        });
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.service.url = Some("https://geo.example.com".into());
        config.service.user_agent = Some("forms/1.0".into());

        save_config_to(&config, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let loaded: Config = toml::from_str(&written).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn resolver_config_translation() {
        let mut config = Config::default();
        config.service.url = Some("https://geo.example.com/v1".into());
        config.service.timeout_secs = 7;
        config.service.insecure = true;
        config.resolver.prefetch_countries = true;

        let resolver = to_resolver_config(&config).unwrap();
        assert_eq!(resolver.service_url.as_str(), "https://geo.example.com/v1");
        assert_eq!(resolver.timeout, Duration::from_secs(7));
        assert_eq!(resolver.tls, TlsVerification::DangerAcceptInvalid);
        assert!(resolver.prefetch_countries);
    }

    #[test]
    fn missing_or_bad_url_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            to_resolver_config(&config),
            Err(ConfigError::Validation { .. })
        ));

        config.service.url = Some("ftp://geo.example.com".into());
        assert!(matches!(
            to_resolver_config(&config),
            Err(ConfigError::Validation { .. })
        ));

        config.service.url = Some("not a url".into());
        assert!(matches!(
            to_resolver_config(&config),
            Err(ConfigError::Validation { .. })
        ));
    }
}
