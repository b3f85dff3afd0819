// ── Reference-data source seam ──
//
// The resolver only ever talks to a `ReferenceSource`. The HTTP client
// from georef-api is the production implementation; tests plug in
// scripted sources.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use georef_api::ReferenceClient;

use crate::error::CoreError;
use crate::model::{CacheKey, Level, ReferenceNode};

/// Read API of the reference-data service.
///
/// Calls are expected to be idempotent and side-effect free, each
/// returning a flat ordered listing.
pub trait ReferenceSource: Send + Sync + 'static {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<ReferenceNode>, CoreError>>;

    fn fetch_states<'a>(
        &'a self,
        country: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ReferenceNode>, CoreError>>;

    fn fetch_cities<'a>(
        &'a self,
        country: &'a str,
        state: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ReferenceNode>, CoreError>>;
}

/// Dispatch a [`CacheKey`] to the matching source call.
pub async fn fetch_children(
    source: &dyn ReferenceSource,
    key: &CacheKey,
) -> Result<Vec<ReferenceNode>, CoreError> {
    match key {
        CacheKey::Root => source.fetch_countries().await,
        CacheKey::Country { country } => source.fetch_states(country).await,
        CacheKey::State { country, state } => source.fetch_cities(country, state).await,
    }
}

// ── HTTP implementation ──────────────────────────────────────────────

impl ReferenceSource for ReferenceClient {
    fn fetch_countries(&self) -> BoxFuture<'_, Result<Vec<ReferenceNode>, CoreError>> {
        async move {
            let raw = ReferenceClient::fetch_countries(self).await?;
            Ok(into_nodes(Level::Country, raw))
        }
        .boxed()
    }

    fn fetch_states<'a>(
        &'a self,
        country: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ReferenceNode>, CoreError>> {
        async move {
            let raw = ReferenceClient::fetch_states(self, country).await?;
            Ok(into_nodes(Level::State, raw))
        }
        .boxed()
    }

    fn fetch_cities<'a>(
        &'a self,
        country: &'a str,
        state: &'a str,
    ) -> BoxFuture<'a, Result<Vec<ReferenceNode>, CoreError>> {
        async move {
            let raw = ReferenceClient::fetch_cities(self, country, state).await?;
            Ok(into_nodes(Level::City, raw))
        }
        .boxed()
    }
}

fn into_nodes(level: Level, raw: Vec<georef_api::RawNode>) -> Vec<ReferenceNode> {
    raw.into_iter()
        .map(|r| ReferenceNode::from_raw(level, r))
        .collect()
}

/// Build a deduplicator fetcher that owns everything it needs.
pub(crate) fn fetcher_for(
    source: &Arc<dyn ReferenceSource>,
    key: &CacheKey,
) -> impl FnOnce() -> BoxFuture<'static, Result<Vec<ReferenceNode>, CoreError>> {
    let source = Arc::clone(source);
    let key = key.clone();
    move || async move { fetch_children(source.as_ref(), &key).await }.boxed()
}
