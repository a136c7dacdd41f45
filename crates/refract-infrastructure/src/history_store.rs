//! Durable store adapter for the submission history.
//!
//! Persists a bounded, artifact-stripped projection of history under a fixed
//! slot key and keeps binary artifacts only in a volatile side cache, so
//! image payloads never compete for durable storage quota. Capacity
//! rejections are absorbed here via a degradation ladder and never surface to
//! callers.

use crate::dto::SubmissionRecord;
use crate::slot_store::SlotStore;
use async_trait::async_trait;
use refract_core::{Artifact, HistoryStore, Result, Submission};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed key the serialized history block lives under.
pub const HISTORY_SLOT_KEY: &str = "refactor_history_v1";

/// Cached artifact references for one submission.
#[derive(Debug, Clone, Default)]
struct ArtifactPair {
    before: Option<Artifact>,
    after: Option<Artifact>,
}

/// History store over a [`SlotStore`], with an in-memory artifact cache.
///
/// The cache is mutated only inside `persist`, and its key set is always a
/// subset of the persisted history's id set: entries for evicted ids are
/// purged on every write.
pub struct JsonHistoryStore {
    slot: Arc<dyn SlotStore>,
    cache: Mutex<HashMap<String, ArtifactPair>>,
    max_entries: usize,
}

impl JsonHistoryStore {
    /// Creates a store over the given slot backend, retaining at most
    /// `max_entries` history entries.
    pub fn new(slot: Arc<dyn SlotStore>, max_entries: usize) -> Self {
        Self {
            slot,
            cache: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// Number of artifact-cache entries currently held.
    pub async fn cached_artifact_count(&self) -> usize {
        self.cache.lock().await.len()
    }

    /// Writes the records, shrinking the retained prefix one entry at a time
    /// when the storage layer rejects the payload for capacity. Returns how
    /// many entries were actually persisted.
    fn write_with_degradation(&self, records: &[SubmissionRecord]) -> Result<usize> {
        let mut retained = records.len();

        loop {
            let payload = serde_json::to_string(&records[..retained])?;

            match self.slot.write(HISTORY_SLOT_KEY, &payload) {
                Ok(()) => {
                    if retained < records.len() {
                        tracing::warn!(
                            "[JsonHistoryStore] History reduced to {} of {} entries due to storage limits",
                            retained,
                            records.len()
                        );
                    }
                    return Ok(retained);
                }
                Err(err) if err.is_capacity_exceeded() => {
                    if retained <= 1 {
                        // Even a single entry does not fit: clear the slot
                        // rather than leave a partial value behind.
                        self.slot.remove(HISTORY_SLOT_KEY)?;
                        tracing::warn!(
                            "[JsonHistoryStore] History cleared: storage rejected even a single entry"
                        );
                        return Ok(0);
                    }
                    retained -= 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn persist(&self, history: &[Submission]) -> Result<Vec<Submission>> {
        let truncated: Vec<&Submission> = history.iter().take(self.max_entries).collect();
        let records: Vec<SubmissionRecord> =
            truncated.iter().map(|sub| SubmissionRecord::from(*sub)).collect();

        let retained = self.write_with_degradation(&records)?;
        let persisted = &truncated[..retained];

        // Sync the volatile cache against what was actually persisted: store
        // artifact pairs for retained entries that carry them, then purge
        // every key outside the persisted id set.
        let mut cache = self.cache.lock().await;
        for sub in persisted {
            if sub.artifact_before.is_some() || sub.artifact_after.is_some() {
                cache.insert(
                    sub.id.clone(),
                    ArtifactPair {
                        before: sub.artifact_before.clone(),
                        after: sub.artifact_after.clone(),
                    },
                );
            }
        }
        let persisted_ids: HashSet<&str> = persisted.iter().map(|sub| sub.id.as_str()).collect();
        cache.retain(|id, _| persisted_ids.contains(id.as_str()));

        // The caller adopts this list, so the in-memory view matches the
        // persisted projection plus restored artifacts exactly.
        let effective = persisted
            .iter()
            .map(|sub| {
                let pair = cache.get(&sub.id).cloned().unwrap_or_default();
                let mut sub = (*sub).clone();
                sub.artifact_before = pair.before;
                sub.artifact_after = pair.after;
                sub
            })
            .collect();

        Ok(effective)
    }

    async fn load(&self) -> Vec<Submission> {
        let raw = match self.slot.read(HISTORY_SLOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!("[JsonHistoryStore] Failed to read history slot: {}", err);
                return Vec::new();
            }
        };

        let records: Vec<SubmissionRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!("[JsonHistoryStore] Discarding unparseable history slot: {}", err);
                return Vec::new();
            }
        };

        // Artifacts are reattached from the cache when available; after a
        // process restart the cache is empty and they are simply absent.
        let cache = self.cache.lock().await;
        records
            .into_iter()
            .map(|record| {
                let pair = cache.get(&record.id).cloned().unwrap_or_default();
                record.into_submission(pair.before, pair.after)
            })
            .collect()
    }
}
