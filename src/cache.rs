use crate::types::NormalizedItinerary;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// One cached itinerary plus its creation instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub itinerary: NormalizedItinerary,
    pub timestamp: DateTime<Utc>,
}

/// Keyed store of normalized itineraries with a fixed freshness window,
/// persisted to a JSON file after every write. Durable-store failures are
/// absorbed here as warnings; the in-memory state is authoritative.
pub struct ItineraryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    path: PathBuf,
    retention: Duration,
}

impl ItineraryCache {
    /// Loads the durable store and purges expired entries before any `get`
    /// can be served. Corrupt or unreadable store content means an empty
    /// cache, never an error.
    pub fn load(path: impl AsRef<Path>, retention_hours: i64) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CacheEntry>>(&content) {
                Ok(map) => {
                    debug!("Loaded {} cached itineraries from {}", map.len(), path.display());
                    map
                }
                Err(e) => {
                    warn!("Cache store at {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Could not read cache store at {}, starting empty: {}", path.display(), e);
                HashMap::new()
            }
        };

        let cache = Self {
            entries: Mutex::new(entries),
            path,
            retention: Duration::hours(retention_hours),
        };
        cache.purge_expired();
        cache
    }

    /// Returns the cached itinerary only while it is within the retention
    /// window; expired entries are removed on the spot.
    pub fn get(&self, destination_id: &str) -> Option<NormalizedItinerary> {
        self.get_at(destination_id, Utc::now())
    }

    fn get_at(&self, destination_id: &str, now: DateTime<Utc>) -> Option<NormalizedItinerary> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get(destination_id)?;
        if now - entry.timestamp <= self.retention {
            debug!("Cache hit for destination '{}'", destination_id);
            return Some(entry.itinerary.clone());
        }
        debug!("Cache entry for '{}' has expired", destination_id);
        entries.remove(destination_id);
        None
    }

    /// Stores the itinerary with the current timestamp, overwriting any
    /// existing entry, then persists the whole cache.
    pub fn put(&self, destination_id: &str, itinerary: NormalizedItinerary) {
        self.put_at(destination_id, itinerary, Utc::now());
    }

    fn put_at(&self, destination_id: &str, itinerary: NormalizedItinerary, now: DateTime<Utc>) {
        {
            let mut entries = self.entries.lock().unwrap();
            entries.insert(
                destination_id.to_string(),
                CacheEntry {
                    itinerary,
                    timestamp: now,
                },
            );
        }
        self.persist();
    }

    /// Removes all entries older than the retention window.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Utc::now());
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) {
        let removed = {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.len();
            entries.retain(|_, entry| now - entry.timestamp <= self.retention);
            before - entries.len()
        };
        if removed > 0 {
            info!("Purged {} expired itinerary cache entries", removed);
            self.persist();
        }
    }

    /// Drops a single entry, forcing the next fetch to go to the network.
    pub fn remove(&self, destination_id: &str) {
        let removed = self.entries.lock().unwrap().remove(destination_id).is_some();
        if removed {
            self.persist();
        }
    }

    /// Empties the cache and durable store. Operator/debug use only.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        self.persist();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Write-through to the JSON store. Failure here costs durability only,
    /// so it is reported as a warning, not an error.
    fn persist(&self) {
        let snapshot = {
            let entries = self.entries.lock().unwrap();
            serde_json::to_string_pretty(&*entries)
        };
        let json = match snapshot {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize itinerary cache: {}", e);
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, json) {
            warn!("Failed to persist itinerary cache to {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TourOption;
    use tempfile::tempdir;

    fn sample_itinerary(title: &str) -> NormalizedItinerary {
        NormalizedItinerary::new(vec![TourOption {
            kind: "Half-day".into(),
            title: title.into(),
            overview: "A short loop".into(),
            stops: vec![],
            highlights: vec![],
            details: vec![],
        }])
    }

    fn cache_in(dir: &tempfile::TempDir) -> ItineraryCache {
        ItineraryCache::load(dir.path().join("aiItineraryCache.json"), 72)
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        cache.put("uluwatu-temple", sample_itinerary("Cliff Morning"));
        let hit = cache.get("uluwatu-temple").unwrap();
        assert_eq!(hit.options[0].title, "Cliff Morning");
    }

    #[test]
    fn entry_is_fresh_just_under_72h_and_gone_just_over() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        let written_at = Utc::now();
        cache.put_at("sanur-beach", sample_itinerary("Sunrise"), written_at);

        let almost = written_at + Duration::hours(71) + Duration::minutes(59);
        assert!(cache.get_at("sanur-beach", almost).is_some());

        let past = written_at + Duration::hours(72) + Duration::minutes(1);
        assert!(cache.get_at("sanur-beach", past).is_none());
        // expired entry was dropped, not merely hidden
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_removes_only_stale_entries() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();
        cache.put_at("old", sample_itinerary("Old"), now - Duration::hours(100));
        cache.put_at("new", sample_itinerary("New"), now);
        cache.purge_expired_at(now);
        assert!(cache.get_at("old", now).is_none());
        assert!(cache.get_at("new", now).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reload_survives_process_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aiItineraryCache.json");
        {
            let cache = ItineraryCache::load(&path, 72);
            cache.put("tanah-lot", sample_itinerary("Temple Run"));
        }
        let reloaded = ItineraryCache::load(&path, 72);
        assert_eq!(
            reloaded.get("tanah-lot").unwrap().options[0].title,
            "Temple Run"
        );
    }

    #[test]
    fn corrupt_store_is_treated_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aiItineraryCache.json");
        fs::write(&path, "{not json").unwrap();
        let cache = ItineraryCache::load(&path, 72);
        assert!(cache.is_empty());
        // and the cache remains usable
        cache.put("kuta-beach", sample_itinerary("Surf"));
        assert!(cache.get("kuta-beach").is_some());
    }

    #[test]
    fn clear_empties_memory_and_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aiItineraryCache.json");
        let cache = ItineraryCache::load(&path, 72);
        cache.put("a", sample_itinerary("A"));
        cache.clear();
        assert!(cache.is_empty());
        let on_disk: HashMap<String, CacheEntry> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.is_empty());
    }

    #[test]
    fn unwritable_store_is_non_fatal() {
        // Point the durable store at a directory path so every write fails.
        let dir = tempdir().unwrap();
        let cache = ItineraryCache::load(dir.path(), 72);
        cache.put("seminyak-beach", sample_itinerary("Sunset"));
        // in-memory cache still reflects the write
        assert!(cache.get("seminyak-beach").is_some());
    }

    #[test]
    fn refreshing_an_entry_updates_its_timestamp() {
        let dir = tempdir().unwrap();
        let cache = cache_in(&dir);
        let first = Utc::now() - Duration::hours(70);
        cache.put_at("goa-gajah", sample_itinerary("Caves"), first);
        let second = Utc::now();
        cache.put_at("goa-gajah", sample_itinerary("Caves"), second);
        // would have expired from the first timestamp, fresh from the second
        let later = second + Duration::hours(71);
        assert!(cache.get_at("goa-gajah", later).is_some());
        assert_eq!(cache.len(), 1);
    }
}
