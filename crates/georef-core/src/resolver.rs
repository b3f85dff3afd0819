// ── Resolver facade ──
//
// One Resolver per hierarchy type, built once at start-up and handed to
// every widget. It owns the shared cache and deduplicator; sections it
// vends carry private selection state on top of them.

use std::sync::Arc;

use georef_api::{ReferenceClient, TlsMode, TransportConfig};
use tracing::{debug, info};

use crate::cascade::AddressSection;
use crate::config::{ResolverConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{CacheKey, ReferenceNode};
use crate::source::{ReferenceSource, fetcher_for};
use crate::store::{CacheStore, DedupStats, Deduplicator, Lookup, Settlement};

/// Shared entry point for resolving reference data.
///
/// Cheaply cloneable via `Arc<ResolverInner>`; every clone and every
/// section created from it share one cache and one in-flight map.
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    source: Arc<dyn ReferenceSource>,
    dedup: Deduplicator,
}

impl Resolver {
    /// Create a resolver with a fresh cache.
    pub fn new(source: Arc<dyn ReferenceSource>) -> Self {
        Self::with_cache(source, Arc::new(CacheStore::new()))
    }

    /// Create a resolver on top of an existing cache.
    pub fn with_cache(source: Arc<dyn ReferenceSource>, cache: Arc<CacheStore>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                source,
                dedup: Deduplicator::new(cache),
            }),
        }
    }

    /// Build an HTTP-backed resolver from configuration.
    ///
    /// With `prefetch_countries` set this must be called from within a
    /// Tokio runtime.
    pub fn connect(config: &ResolverConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = ReferenceClient::new(config.service_url.clone(), &transport)?;
        let resolver = Self::new(Arc::new(client));

        if config.prefetch_countries {
            resolver.prefetch(&CacheKey::Root);
        }
        info!(url = %config.service_url, "reference resolver ready");
        Ok(resolver)
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// Children of `key`, empty if the service is unavailable.
    pub async fn children_of(&self, key: &CacheKey) -> Arc<[ReferenceNode]> {
        self.settle(key).await.nodes()
    }

    /// Children of `key`, reporting whether the lookup failed.
    pub async fn settle(&self, key: &CacheKey) -> Settlement {
        let fetcher = fetcher_for(&self.inner.source, key);
        self.inner.dedup.resolve_detailed(key, fetcher).await
    }

    pub async fn countries(&self) -> Arc<[ReferenceNode]> {
        self.children_of(&CacheKey::Root).await
    }

    pub async fn states(&self, country: &str) -> Arc<[ReferenceNode]> {
        self.children_of(&CacheKey::country(country)).await
    }

    pub async fn cities(&self, country: &str, state: &str) -> Arc<[ReferenceNode]> {
        self.children_of(&CacheKey::state(country, state)).await
    }

    /// Start fetching `key` without waiting for it.
    pub fn prefetch(&self, key: &CacheKey) {
        let fetcher = fetcher_for(&self.inner.source, key);
        if let Lookup::Pending(_) = self.inner.dedup.lookup(key, fetcher) {
            debug!(key = %key, "prefetch started");
        }
    }

    // ── Sections ─────────────────────────────────────────────────────

    /// Create an independent address section backed by this resolver.
    pub fn section(&self, name: impl Into<String>) -> AddressSection {
        AddressSection::new(
            name.into(),
            self.inner.dedup.clone(),
            Arc::clone(&self.inner.source),
        )
    }

    // ── Introspection ────────────────────────────────────────────────

    pub fn cache(&self) -> &Arc<CacheStore> {
        self.inner.dedup.cache()
    }

    /// Number of fetches currently outstanding.
    pub fn in_flight(&self) -> usize {
        self.inner.dedup.in_flight()
    }

    pub fn stats(&self) -> DedupStats {
        self.inner.dedup.stats()
    }
}

/// Build a [`TransportConfig`] from the resolver configuration.
fn build_transport(config: &ResolverConfig) -> TransportConfig {
    let mut transport = TransportConfig::default().with_timeout(config.timeout);
    transport.tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    if let Some(agent) = &config.user_agent {
        transport.user_agent.clone_from(agent);
    }
    transport
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::model::Level;
    use crate::test_support::{GatedSource, nodes};

    fn resolver(source: &Arc<GatedSource>) -> Resolver {
        let source: Arc<dyn ReferenceSource> = source.clone();
        Resolver::new(source)
    }

    #[tokio::test]
    async fn repeated_lookup_hits_cache() {
        let source = Arc::new(GatedSource::default());
        source.respond(
            CacheKey::country("US"),
            nodes(Level::State, &[("CA", "California"), ("TX", "Texas")]),
        );
        let resolver = resolver(&source);

        let first = resolver.states("US").await;
        let second = resolver.states("US").await;

        assert_eq!(first, second);
        assert_eq!(source.calls(&CacheKey::country("US")), 1);
        assert_eq!(resolver.stats().cache_hits, 1);
    }

    #[tokio::test]
    async fn prefetch_warms_cache() {
        let source = Arc::new(GatedSource::default());
        source.respond(CacheKey::Root, nodes(Level::Country, &[("IN", "India")]));
        let resolver = resolver(&source);

        resolver.prefetch(&CacheKey::Root);
        tokio::time::timeout(Duration::from_secs(5), async {
            while !resolver.cache().contains(&CacheKey::Root) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(resolver.countries().await.len(), 1);
        assert_eq!(source.calls(&CacheKey::Root), 1);
    }

    #[tokio::test]
    async fn sibling_sections_share_cache() {
        let source = Arc::new(GatedSource::default());
        source.respond(
            CacheKey::country("IN"),
            nodes(Level::State, &[("MH", "Maharashtra")]),
        );
        let resolver = resolver(&source);
        let current = resolver.section("current");
        let permanent = resolver.section("permanent");

        current.set_ancestor(Level::Country, "IN");
        current
            .subscribe()
            .wait_until(|s| !s.is_loading(Level::State))
            .await
            .unwrap();

        permanent.set_ancestor(Level::Country, "IN");
        assert!(!permanent.is_loading(Level::State));
        assert_eq!(permanent.children(Level::State)[0].key, "MH");
        assert_eq!(source.calls(&CacheKey::country("IN")), 1);
    }

    #[test]
    fn transport_honours_config() {
        let mut config = ResolverConfig::new("https://geo.example.com".parse().unwrap());
        config.timeout = Duration::from_secs(5);
        config.user_agent = Some("forms/2.0".into());
        config.tls = TlsVerification::DangerAcceptInvalid;

        let transport = build_transport(&config);
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.user_agent, "forms/2.0");
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
    }
}
