// Scripted reference source for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::model::{CacheKey, Level, ReferenceNode};
use crate::source::ReferenceSource;

type Reply = Result<Vec<ReferenceNode>, CoreError>;

enum Script {
    Respond(Vec<ReferenceNode>),
    Gate(oneshot::Receiver<Reply>),
}

/// A source that answers from a script and counts calls per key.
///
/// Keys with no script fail with `NetworkFailure`. A gated key holds its
/// fetch open until the test sends a reply through the returned sender.
#[derive(Default)]
pub(crate) struct GatedSource {
    scripts: Mutex<HashMap<CacheKey, Script>>,
    calls: Mutex<HashMap<CacheKey, usize>>,
}

impl GatedSource {
    /// Answer every fetch for `key` immediately with `nodes`.
    pub(crate) fn respond(&self, key: CacheKey, nodes: Vec<ReferenceNode>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(key, Script::Respond(nodes));
    }

    /// Hold the next fetch for `key` until the sender is used.
    pub(crate) fn gate(&self, key: CacheKey) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.scripts.lock().unwrap().insert(key, Script::Gate(rx));
        tx
    }

    pub(crate) fn calls(&self, key: &CacheKey) -> usize {
        self.calls.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    fn serve(&self, key: CacheKey) -> BoxFuture<'static, Reply> {
        *self.calls.lock().unwrap().entry(key.clone()).or_default() += 1;

        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get(&key) {
                Some(Script::Respond(nodes)) => Some(Script::Respond(nodes.clone())),
                Some(Script::Gate(_)) => scripts.remove(&key),
                None => None,
            }
        };

        async move {
            match script {
                Some(Script::Respond(nodes)) => Ok(nodes),
                Some(Script::Gate(rx)) => rx.await.unwrap_or_else(|_| {
                    Err(CoreError::NetworkFailure {
                        reason: format!("gate for {key} dropped"),
                    })
                }),
                None => Err(CoreError::NetworkFailure {
                    reason: format!("no script for {key}"),
                }),
            }
        }
        .boxed()
    }
}

impl ReferenceSource for GatedSource {
    fn fetch_countries(&self) -> BoxFuture<'_, Reply> {
        self.serve(CacheKey::Root)
    }

    fn fetch_states<'a>(&'a self, country: &'a str) -> BoxFuture<'a, Reply> {
        self.serve(CacheKey::country(country))
    }

    fn fetch_cities<'a>(&'a self, country: &'a str, state: &'a str) -> BoxFuture<'a, Reply> {
        self.serve(CacheKey::state(country, state))
    }
}

pub(crate) fn nodes(level: Level, entries: &[(&str, &str)]) -> Vec<ReferenceNode> {
    entries
        .iter()
        .map(|(key, name)| ReferenceNode::new(level, *key, *name))
        .collect()
}
