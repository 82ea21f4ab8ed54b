//! Provider pool (C8): bounded concurrency, per-provider statefulness,
//! scoped lifecycle. Grounded on `orchestrator::runner::TicketOrchestrator`
//! for the per-resource `RwLock<HashMap<...>>` plus scoped teardown shape,
//! and on `searcher::jackett.rs`'s `futures::future::join_all` fan-out for
//! dispatching one call per provider and joining them all.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock, Semaphore};
use tracing::{debug, warn};

use crate::language::Language;
use crate::provider::{Provider, ProviderError};
use crate::scorer::min_score_scaled;
use crate::subtitle::Subtitle;
use crate::video::Video;

use super::dedup::dedupe_subtitles;
use super::selection::{score_candidates, sort_candidates};
use super::types::{PoolConfig, PoolError};

struct Entry {
    name: String,
    provider: Mutex<Box<dyn Provider>>,
}

/// Owns a set of initialized providers for the lifetime of one
/// `download_best_subtitles` call. Not `Clone`; `Arc` it if you need to
/// share it across tasks.
pub struct ProviderPool {
    /// Declaration order is preserved (a plain `Vec`, not a `HashMap`)
    /// because it is load-bearing: it's the pool's tie-break key.
    entries: Vec<Entry>,
    index_by_name: HashMap<String, usize>,
    discarded: RwLock<HashSet<String>>,
    /// Providers an `AuthenticationError` closed; `initialize()` is retried
    /// for these before their next use instead of discarding outright.
    needs_reinit: RwLock<HashSet<String>>,
    semaphore: Arc<Semaphore>,
    config: PoolConfig,
}

impl ProviderPool {
    /// `providers` is typically produced by resolving a configured name
    /// list against a `ProviderRegistry`; the list's order is the
    /// declaration order used for tie-breaking.
    pub fn new(providers: Vec<(String, Box<dyn Provider>)>, config: PoolConfig) -> Self {
        let mut entries = Vec::with_capacity(providers.len());
        let mut index_by_name = HashMap::with_capacity(providers.len());

        for (index, (name, provider)) in providers.into_iter().enumerate() {
            index_by_name.insert(name.clone(), index);
            entries.push(Entry {
                name,
                provider: Mutex::new(provider),
            });
        }

        Self {
            entries,
            index_by_name,
            discarded: RwLock::new(HashSet::new()),
            needs_reinit: RwLock::new(HashSet::new()),
            semaphore: Arc::new(Semaphore::new(config.max_workers.max(1))),
            config,
        }
    }

    fn provider_order(&self, name: &str) -> usize {
        self.index_by_name.get(name).copied().unwrap_or(usize::MAX)
    }

    /// `initialize()` every provider; a provider whose `initialize()`
    /// fails is discarded immediately rather than surfacing the error.
    pub async fn initialize_all(&self) {
        for entry in &self.entries {
            let mut provider = entry.provider.lock().await;
            if let Err(err) = provider.initialize().await {
                warn!(provider = %entry.name, error = %err, "provider initialize() failed, discarding");
                self.discard(&entry.name).await;
            }
        }
    }

    pub async fn terminate_all(&self) {
        for entry in &self.entries {
            let mut provider = entry.provider.lock().await;
            if let Err(err) = provider.terminate().await {
                warn!(provider = %entry.name, error = %err, "provider terminate() failed");
            }
        }
    }

    async fn discard(&self, name: &str) {
        self.discarded.write().await.insert(name.to_string());
        self.needs_reinit.write().await.remove(name);
    }

    async fn is_discarded(&self, name: &str) -> bool {
        self.discarded.read().await.contains(name)
    }

    async fn mark_needs_reinit(&self, name: &str) {
        self.needs_reinit.write().await.insert(name.to_string());
    }

    /// Checks and clears the flag atomically, so the caller re-initializes
    /// at most once per `AuthenticationError`.
    async fn take_needs_reinit(&self, name: &str) -> bool {
        self.needs_reinit.write().await.remove(name)
    }

    pub async fn discarded_providers(&self) -> HashSet<String> {
        self.discarded.read().await.clone()
    }

    /// Fan out to every non-discarded provider whose `check` accepts
    /// `video`, bound by `max_workers`, each call under `provider_timeout`.
    /// The merged result is deduplicated. Per-provider errors are handled
    /// by the state machine documented on `handle_error`.
    pub async fn list_subtitles(&self, video: &Video, languages: &HashSet<Language>) -> Vec<Subtitle> {
        let mut futures = Vec::new();

        for entry in &self.entries {
            if self.is_discarded(&entry.name).await {
                continue;
            }

            let semaphore = Arc::clone(&self.semaphore);
            let timeout = self.config.provider_timeout;
            futures.push(async move {
                let _permit = semaphore.acquire().await.expect("semaphore never closed");
                let mut provider = entry.provider.lock().await;

                if self.take_needs_reinit(&entry.name).await {
                    if let Err(err) = provider.initialize().await {
                        warn!(provider = %entry.name, error = %err, "re-initialize() failed, discarding");
                        drop(provider);
                        self.discard(&entry.name).await;
                        return (entry.name.clone(), Vec::new());
                    }
                }

                if !provider.check(video) {
                    return (entry.name.clone(), Vec::new());
                }
                let accepted_languages = provider.check_languages(languages);
                if accepted_languages.is_empty() {
                    return (entry.name.clone(), Vec::new());
                }

                let mut result = tokio::time::timeout(timeout, provider.list_subtitles(video, &accepted_languages))
                    .await
                    .unwrap_or(Err(ProviderError::Timeout));

                if matches!(result, Err(ProviderError::ServiceUnavailable(_))) {
                    debug!(provider = %entry.name, "service unavailable, retrying once");
                    result = tokio::time::timeout(timeout, provider.list_subtitles(video, &accepted_languages))
                        .await
                        .unwrap_or(Err(ProviderError::Timeout));
                }
                drop(provider);

                match result {
                    Ok(subtitles) => {
                        debug!(provider = %entry.name, count = subtitles.len(), "provider returned subtitles");
                        (entry.name.clone(), subtitles)
                    }
                    Err(err) => {
                        self.handle_error(&entry.name, err).await;
                        (entry.name.clone(), Vec::new())
                    }
                }
            });
        }

        let results = join_all(futures).await;
        let merged: Vec<Subtitle> = results.into_iter().flat_map(|(_, subtitles)| subtitles).collect();
        dedupe_subtitles(merged)
    }

    /// The per-error-kind state transition from §4.4/§4.5: `Authentication`
    /// closes the provider for re-initialization on its next use rather
    /// than discarding it outright; every other kind (`ServiceUnavailable`
    /// reaching here has already survived one retry) discards it for the
    /// remainder of this pool's lifetime.
    async fn handle_error(&self, name: &str, err: ProviderError) {
        match err {
            ProviderError::Authentication(msg) => {
                warn!(provider = %name, error = %msg, "authentication error, will re-initialize on next use");
                self.mark_needs_reinit(name).await;
            }
            err => {
                warn!(provider = %name, error = %err, "provider operation failed, discarding");
                self.discard(name).await;
            }
        }
    }

    /// Download a single subtitle's content via its owning provider,
    /// applying the same per-error-kind state transitions as
    /// `list_subtitles` (see `handle_error`).
    pub async fn download_subtitle(&self, subtitle: &mut Subtitle) -> Result<(), PoolError> {
        let name = subtitle.provider_name.clone();
        let index = *self
            .index_by_name
            .get(&name)
            .ok_or_else(|| PoolError::UnknownProvider(name.clone()))?;
        let entry = &self.entries[index];

        if self.is_discarded(&name).await {
            return Err(PoolError::UnknownProvider(name));
        }

        let _permit = self.semaphore.acquire().await.expect("semaphore never closed");
        let mut provider = entry.provider.lock().await;

        if self.take_needs_reinit(&name).await {
            if let Err(err) = provider.initialize().await {
                warn!(provider = %name, error = %err, "re-initialize() failed, discarding");
                drop(provider);
                self.discard(&name).await;
                return Err(PoolError::ProviderFailed(err));
            }
        }

        let mut result = tokio::time::timeout(self.config.provider_timeout, provider.download_subtitle(subtitle))
            .await
            .unwrap_or(Err(ProviderError::Timeout));

        if matches!(result, Err(ProviderError::ServiceUnavailable(_))) {
            warn!(provider = %name, "service unavailable, retrying once");
            result = tokio::time::timeout(self.config.provider_timeout, provider.download_subtitle(subtitle))
                .await
                .unwrap_or(Err(ProviderError::Timeout));
        }
        drop(provider);

        match result {
            Ok(()) => Ok(()),
            Err(err) => {
                self.handle_error(&name, err.clone()).await;
                Err(PoolError::ProviderFailed(err))
            }
        }
    }

    /// §4.5's `download_best_subtitles`: score every candidate, sort
    /// deterministically, then greedily download until every requested
    /// language is satisfied (or, with `only_one`, after the first
    /// success). A candidate whose download fails or whose content fails
    /// `is_valid()` is dropped and the next candidate for that language is
    /// tried.
    #[allow(clippy::too_many_arguments)]
    pub async fn download_best_subtitles(
        &self,
        candidates: Vec<Subtitle>,
        video: &Video,
        languages: &HashSet<Language>,
        min_score: u8,
        hearing_impaired: Option<bool>,
        foreign_only: Option<bool>,
        only_one: bool,
        ignore_ids: &HashSet<String>,
    ) -> Vec<Subtitle> {
        let threshold = min_score_scaled(min_score, video.kind());
        let scored = score_candidates(candidates, video, hearing_impaired, foreign_only, |name| {
            self.provider_order(name)
        });
        let sorted = sort_candidates(scored);

        let mut satisfied: HashSet<Language> = HashSet::new();
        let mut downloaded = Vec::new();

        for candidate in sorted {
            if languages.iter().all(|l| satisfied.contains(l)) {
                break;
            }
            if only_one && !downloaded.is_empty() {
                break;
            }
            if ignore_ids.contains(&candidate.subtitle.subtitle_id) {
                continue;
            }
            if candidate.score < threshold {
                continue;
            }
            if !languages.contains(&candidate.subtitle.language) {
                continue;
            }
            if satisfied.contains(&candidate.subtitle.language) {
                continue;
            }

            let mut subtitle = candidate.subtitle;
            if self.download_subtitle(&mut subtitle).await.is_err() {
                continue;
            }
            if !matches!(subtitle.is_valid(), Ok(true)) {
                continue;
            }

            satisfied.insert(subtitle.language.clone());
            downloaded.push(subtitle);
        }

        downloaded
    }
}
