//! Token metadata resolver.
//!
//! Turns a `(uri_template, token_id)` input into a stream of
//! [`MetadataResult`]s published through a `tokio::sync::watch` channel:
//! - absent inputs publish `idle` and cancel whatever is in flight
//! - successful resolutions are memoized per key and republished on reuse
//! - otherwise `fetching` is published before any I/O, then the terminal result
//!
//! A new input supersedes the previous one: its fetch is cancelled through a
//! `CancellationToken`, and because cancellation, publication and cache writes
//! all happen under the same lock, a superseded fetch can never publish.

use primitive_types::U256;
use serde::Deserialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::cache::MetadataCache;
use super::fetch::{fetch_metadata, MetadataHttp};
use super::key::MetadataQueryKey;
use super::state::MetadataResult;
use super::uri::PreparedUrl;
use crate::error::MetadataError;

/// Resolver options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Retry JSON parsing on a sanitized body (stray quotes, control chars).
    pub lenient_json: bool,
}

struct InFlight {
    key: MetadataQueryKey,
    cancel: CancellationToken,
}

/// A published result together with the key it was resolved for.
#[derive(Debug, Clone)]
struct Published {
    key: Option<MetadataQueryKey>,
    result: MetadataResult,
}

struct Shared {
    cache: MetadataCache,
    in_flight: Option<InFlight>,
    publisher: watch::Sender<MetadataResult>,
    keyed: watch::Sender<Published>,
}

impl Shared {
    fn publish(&self, key: Option<&MetadataQueryKey>, result: MetadataResult) {
        self.keyed.send_replace(Published {
            key: key.cloned(),
            result: result.clone(),
        });
        self.publisher.send_replace(result);
    }

    /// Cancel the outstanding fetch, if any. `by` is the token id of the
    /// request taking over, None when the input was cleared.
    fn cancel_in_flight(&mut self, by: Option<U256>) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            tracing::debug!(
                target: "cartesiscan::metadata",
                token_id = %in_flight.key.token_id,
                superseded_by = ?by.map(|id| id.to_string()),
                "Aborting metadata fetch"
            );
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resolves token metadata documents for a changing `(uri_template, token_id)`.
///
/// The cache and the in-flight fetch belong to this instance. Dropping the
/// resolver cancels the in-flight fetch.
pub struct TokenMetadataResolver<H> {
    http: Arc<H>,
    config: ResolverConfig,
    shared: Arc<Mutex<Shared>>,
    receiver: watch::Receiver<MetadataResult>,
    keyed: watch::Receiver<Published>,
}

impl<H: MetadataHttp> TokenMetadataResolver<H> {
    pub fn new(http: Arc<H>, config: ResolverConfig) -> Self {
        let (publisher, receiver) = watch::channel(MetadataResult::idle());
        let (keyed_publisher, keyed) = watch::channel(Published {
            key: None,
            result: MetadataResult::idle(),
        });
        let shared = Shared {
            cache: MetadataCache::new(),
            in_flight: None,
            publisher,
            keyed: keyed_publisher,
        };

        Self {
            http,
            config,
            shared: Arc::new(Mutex::new(shared)),
            receiver,
            keyed,
        }
    }

    /// Receiver of every published result.
    pub fn subscribe(&self) -> watch::Receiver<MetadataResult> {
        self.receiver.clone()
    }

    /// Last published result.
    pub fn current(&self) -> MetadataResult {
        self.receiver.borrow().clone()
    }

    /// Feed new inputs to the resolver.
    ///
    /// Everything up to the network request happens before this returns: the
    /// previous fetch is cancelled and `idle`, the cached result, `fetching`
    /// or a terminal non-HTTP result is already published. Submitting the key
    /// that is currently in flight does nothing.
    ///
    /// Fetches run on the ambient tokio runtime. Without one, an HTTP URL
    /// resolves to `errored`.
    pub fn set_input(&self, uri_template: Option<&str>, token_id: Option<U256>) {
        let mut shared = lock(&self.shared);

        let (Some(uri_template), Some(token_id)) = (uri_template, token_id) else {
            shared.cancel_in_flight(None);
            shared.publish(None, MetadataResult::idle());
            return;
        };

        let key = MetadataQueryKey::new(uri_template, token_id);
        if shared.in_flight.as_ref().is_some_and(|f| f.key == key) {
            return;
        }
        shared.cancel_in_flight(Some(token_id));

        if let Some(cached) = shared.cache.get(&key).cloned() {
            tracing::debug!(
                target: "cartesiscan::metadata",
                key = %key,
                "Metadata cache hit"
            );
            shared.publish(Some(&key), cached);
            return;
        }

        shared.publish(Some(&key), MetadataResult::fetching());

        let prepared = PreparedUrl::prepare(uri_template, token_id);
        let url = match prepared.url() {
            Some(url) if prepared.is_http() => url.clone(),
            _ => {
                let result = MetadataResult::from_outcome(&prepared, None);
                tracing::debug!(
                    target: "cartesiscan::metadata",
                    token_id = %token_id,
                    url = %prepared.resolved_url(),
                    state = %result.state,
                    "Metadata URI is not fetchable over HTTP"
                );
                shared.publish(Some(&key), result);
                return;
            }
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                target: "cartesiscan::metadata",
                token_id = %token_id,
                url = %url,
                "No tokio runtime to fetch token metadata"
            );
            shared.publish(
                Some(&key),
                MetadataResult::errored(&prepared, MetadataError::NoRuntime),
            );
            return;
        };

        let cancel = CancellationToken::new();
        shared.in_flight = Some(InFlight {
            key: key.clone(),
            cancel: cancel.clone(),
        });
        drop(shared);

        tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %token_id,
            url = %url,
            "Fetching token metadata"
        );

        runtime.spawn(run_fetch(
            self.shared.clone(),
            self.http.clone(),
            self.config.lenient_json,
            key,
            prepared,
            url,
            cancel,
        ));
    }

    /// Feed new inputs and wait for the terminal result of those inputs.
    ///
    /// If another input supersedes this one while it is being fetched, the
    /// published stream moves on to the new input and this call finishes the
    /// resolution of its own key without publishing it.
    pub async fn resolve(
        &self,
        uri_template: Option<&str>,
        token_id: Option<U256>,
    ) -> MetadataResult {
        let (Some(template), Some(id)) = (uri_template, token_id) else {
            self.set_input(uri_template, token_id);
            return MetadataResult::idle();
        };
        let key = MetadataQueryKey::new(template, id);

        let mut keyed = self.keyed.clone();
        self.set_input(uri_template, token_id);

        let published = match keyed
            .wait_for(|p| p.key.as_ref() != Some(&key) || p.result.state.is_terminal())
            .await
        {
            Ok(published) => Some(published.clone()),
            Err(_) => None,
        };

        match published {
            Some(Published {
                key: Some(published_key),
                result,
            }) if published_key == key => result,
            _ => self.resolve_superseded(key).await,
        }
    }

    /// Resolve `key` outside of the published stream. Successes still land
    /// in the cache.
    async fn resolve_superseded(&self, key: MetadataQueryKey) -> MetadataResult {
        let cached = lock(&self.shared).cache.get(&key).cloned();
        if let Some(cached) = cached {
            return cached;
        }

        let prepared = PreparedUrl::prepare(&key.uri_template, key.token_id);
        let Some(url) = prepared.url().filter(|_| prepared.is_http()).cloned() else {
            return MetadataResult::from_outcome(&prepared, None);
        };

        tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %key.token_id,
            url = %url,
            "Resolving superseded request without publishing"
        );

        let cancel = CancellationToken::new();
        let outcome = fetch_metadata(
            self.http.as_ref(),
            &url,
            &cancel,
            self.config.lenient_json,
        )
        .await;
        let result = MetadataResult::from_outcome(&prepared, outcome);

        lock(&self.shared).cache.insert(key, result.clone());
        result
    }

    pub fn is_cached(&self, uri_template: &str, token_id: U256) -> bool {
        lock(&self.shared).cache.contains(uri_template, token_id)
    }

    pub fn cache_len(&self) -> usize {
        lock(&self.shared).cache.len()
    }

    pub fn clear_cache(&self) {
        lock(&self.shared).cache.clear();
    }
}

impl<H> Drop for TokenMetadataResolver<H> {
    fn drop(&mut self) {
        lock(&self.shared).cancel_in_flight(None);
    }
}

async fn run_fetch<H: MetadataHttp>(
    shared: Arc<Mutex<Shared>>,
    http: Arc<H>,
    lenient_json: bool,
    key: MetadataQueryKey,
    prepared: PreparedUrl,
    url: Url,
    cancel: CancellationToken,
) {
    let Some(outcome) = fetch_metadata(http.as_ref(), &url, &cancel, lenient_json).await else {
        tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %key.token_id,
            "Metadata fetch cancelled"
        );
        return;
    };

    let mut state = lock(&shared);
    // Superseded while the response was being read
    if cancel.is_cancelled() {
        tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %key.token_id,
            "Discarding outcome of cancelled metadata fetch"
        );
        return;
    }
    state.in_flight = None;

    let result = MetadataResult::from_outcome(&prepared, Some(outcome));
    match &result.error {
        Some(error) => tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %key.token_id,
            url = %url,
            state = %result.state,
            error = %error,
            "Token metadata fetch failed"
        ),
        None => tracing::debug!(
            target: "cartesiscan::metadata",
            token_id = %key.token_id,
            url = %url,
            "Resolved token metadata"
        ),
    }

    state.cache.insert(key.clone(), result.clone());
    state.publish(Some(&key), result);
}
