use crate::cache::ItineraryCache;
use crate::catalog::Destination;
use crate::client::ModelClient;
use crate::error::{ExplorerError, Result};
use crate::normalizer::Normalizer;
use crate::types::{ItineraryRequest, NormalizedItinerary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Cache-then-network retrieval for a single destination. Concurrent
/// requests for the same destination are serialized behind a per-key guard
/// so the proxy sees at most one in-flight call per destination.
pub struct ItineraryService {
    cache: Arc<ItineraryCache>,
    client: Arc<dyn ModelClient>,
    normalizer: Normalizer,
    /// Network attempts per fetch before giving up.
    attempts: u32,
    /// Per-destination guards. Bounded by the catalog size, so entries are
    /// kept for the life of the service.
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ItineraryService {
    pub fn new(cache: Arc<ItineraryCache>, client: Arc<dyn ModelClient>, attempts: u32) -> Self {
        Self {
            cache,
            client,
            normalizer: Normalizer::new(),
            attempts: attempts.max(1),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a fresh-enough cached itinerary, or fetches, normalizes and
    /// caches a new one. Fails with `Unavailable` once network attempts and
    /// the single normalization retry are exhausted.
    #[instrument(skip(self, destination), fields(destination = %destination.id))]
    pub async fn fetch_itinerary(&self, destination: &Destination) -> Result<NormalizedItinerary> {
        if let Some(cached) = self.cache.get(&destination.id) {
            return Ok(cached);
        }

        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(destination.id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _permit = guard.lock().await;

        // A concurrent request for this destination may have finished while
        // we waited on the guard; its cache write happened before it released.
        if let Some(cached) = self.cache.get(&destination.id) {
            return Ok(cached);
        }

        let itinerary = self.fetch_uncached(destination).await?;
        // Cache write happens before any waiter can observe the result.
        self.cache.put(&destination.id, itinerary.clone());
        Ok(itinerary)
    }

    async fn fetch_uncached(&self, destination: &Destination) -> Result<NormalizedItinerary> {
        let request = ItineraryRequest::for_destination(destination);
        let mut network_attempts_left = self.attempts;
        let mut normalize_retry_left = 1u32;

        loop {
            let raw = match self.client.complete(&request).await {
                Ok(raw) => raw,
                Err(e) => {
                    network_attempts_left -= 1;
                    warn!(
                        "Model call failed for '{}' ({} attempts left): {}",
                        destination.id, network_attempts_left, e
                    );
                    if network_attempts_left == 0 {
                        return Err(ExplorerError::Unavailable {
                            destination: destination.id.clone(),
                        });
                    }
                    continue;
                }
            };

            let outcome = self.normalizer.normalize(&raw);
            if outcome.recovered() {
                info!(
                    strategy = outcome.strategy.unwrap_or_default(),
                    options = outcome.itinerary.options.len(),
                    "Normalized itinerary for '{}'", destination.id
                );
                return Ok(outcome.itinerary);
            }

            if !raw.trim().is_empty() && normalize_retry_left > 0 {
                normalize_retry_left -= 1;
                warn!(
                    "Response for '{}' was unparseable, retrying with a fresh fetch",
                    destination.id
                );
                continue;
            }

            warn!("Giving up on '{}': {}", destination.id, ExplorerError::Unparseable);
            return Err(ExplorerError::Unavailable {
                destination: destination.id.clone(),
            });
        }
    }
}
