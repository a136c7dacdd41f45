//! History state machine.
//!
//! Owns the ordered, bounded submission history and drives each submission
//! through its lifecycle: optimistic insertion in `Pending`, asynchronous
//! pipeline execution, and id-keyed terminal application. Persistence goes
//! through the durable store adapter on every mutation, and the in-memory
//! list always adopts exactly what the adapter reports as persisted.

use crate::pipeline::{PipelineOutcome, RefactorPipeline};
use refract_core::classify;
use refract_core::config::DEFAULT_MAX_HISTORY;
use refract_core::{Category, GenerativeService, HistoryStore, Result, Submission};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Manages the submission history and its lifecycle.
///
/// `HistoryManager` is responsible for:
/// - Classifying and optimistically inserting new submissions
/// - Starting each submission's pipeline without blocking the caller
/// - Applying pipeline completions by id, tolerating late arrivals
/// - Keeping the bounded history in lockstep with durable storage
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct HistoryManager {
    pipeline: Arc<RefactorPipeline>,
    store: Arc<dyn HistoryStore>,
    /// Ordered history, most-recent-first, capped at `max_entries`.
    history: Arc<RwLock<Vec<Submission>>>,
    /// Id of the currently displayed submission.
    current_id: Arc<RwLock<Option<String>>>,
    /// Caller-visible flag for the most recent submit.
    loading: Arc<AtomicBool>,
    /// Id of the submission the loading flag was set for. Tracked separately
    /// from `current_id`, which callers can move with `select` while a
    /// pipeline is still in flight.
    loading_id: Arc<RwLock<Option<String>>>,
    max_entries: usize,
}

impl HistoryManager {
    /// Creates a manager with the default history capacity.
    pub fn new(service: Arc<dyn GenerativeService>, store: Arc<dyn HistoryStore>) -> Self {
        Self::with_capacity(service, store, DEFAULT_MAX_HISTORY)
    }

    /// Creates a manager retaining at most `max_entries` submissions.
    pub fn with_capacity(
        service: Arc<dyn GenerativeService>,
        store: Arc<dyn HistoryStore>,
        max_entries: usize,
    ) -> Self {
        Self {
            pipeline: Arc::new(RefactorPipeline::new(service)),
            store,
            history: Arc::new(RwLock::new(Vec::new())),
            current_id: Arc::new(RwLock::new(None)),
            loading: Arc::new(AtomicBool::new(false)),
            loading_id: Arc::new(RwLock::new(None)),
            max_entries,
        }
    }

    /// Restores persisted history on startup.
    ///
    /// Artifacts are typically absent after a restart; only the text fields
    /// survive. No submission is marked current.
    pub async fn restore(&self) {
        let loaded = self.store.load().await;
        tracing::info!("[HistoryManager] Restored {} history entries", loaded.len());
        *self.history.write().await = loaded;
    }

    /// Submits a code snippet for refactoring.
    ///
    /// Classifies the code, inserts a `Pending` submission at the head of
    /// history (evicting the oldest when full), marks it current, starts its
    /// pipeline asynchronously, and returns the pending snapshot immediately.
    ///
    /// A new submit while an earlier one is unresolved does not cancel the
    /// earlier pipeline; it keeps running and applies its own completion.
    ///
    /// # Errors
    ///
    /// Returns an error only when the optimistic insert cannot be persisted
    /// for a non-capacity reason; remote failures never surface here, they
    /// land in the submission's terminal `Error` state.
    pub async fn submit(&self, code: &str) -> Result<Submission> {
        let submission = self.begin(code).await?;

        let manager = self.clone();
        let id = submission.id.clone();
        let source = submission.source_code.clone();
        let category = submission.category;
        tokio::spawn(async move {
            manager.drive(id, source, category).await;
        });

        Ok(submission)
    }

    /// Optimistic-insertion step: classifies the code and makes the new
    /// `Pending` submission visible (and current) before any remote call.
    pub(crate) async fn begin(&self, code: &str) -> Result<Submission> {
        let category = classify(code);
        let submission = Submission::pending(code, category);

        tracing::info!(
            "[HistoryManager] Submitting {} ({:?}, {} chars)",
            submission.id,
            category,
            code.len()
        );

        {
            let mut history = self.history.write().await;
            let mut candidate = history.clone();
            candidate.insert(0, submission.clone());
            candidate.truncate(self.max_entries);
            let effective = self.store.persist(&candidate).await?;
            *history = effective;
        }

        // Only after the insert persisted: a failed begin must not leave the
        // loading flag stuck.
        *self.current_id.write().await = Some(submission.id.clone());
        *self.loading_id.write().await = Some(submission.id.clone());
        self.loading.store(true, Ordering::SeqCst);

        Ok(submission)
    }

    /// Runs the pipeline for one submission and applies its outcome.
    pub(crate) async fn drive(&self, id: String, source_code: String, category: Category) {
        let outcome = self.pipeline.run(&source_code, category).await;
        self.apply_outcome(&id, outcome).await;
    }

    /// Applies a pipeline completion to the submission with the given id.
    ///
    /// The terminal submission replaces the entry in place wherever it sits;
    /// a completion for an id already evicted from the bounded window is a
    /// safe no-op. Applying the same completion twice leaves history in the
    /// same state.
    pub(crate) async fn apply_outcome(&self, id: &str, outcome: Result<PipelineOutcome>) {
        let applied = {
            let mut history = self.history.write().await;
            match history.iter().position(|sub| sub.id == id) {
                Some(pos) => {
                    let terminal = match outcome {
                        Ok(out) => history[pos].clone().into_success(
                            out.result,
                            out.artifact_before,
                            out.artifact_after,
                        ),
                        Err(err) => {
                            tracing::warn!("[HistoryManager] Pipeline for {} failed: {}", id, err);
                            history[pos].clone().into_error(err.to_string())
                        }
                    };
                    history[pos] = terminal;

                    match self.store.persist(&history).await {
                        Ok(effective) => *history = effective,
                        Err(err) => {
                            tracing::warn!("[HistoryManager] Failed to persist history: {}", err);
                        }
                    }
                    true
                }
                None => {
                    // Superseded long ago: the submission fell out of the
                    // bounded window before its pipeline resolved.
                    tracing::info!("[HistoryManager] Dropping completion for evicted {}", id);
                    false
                }
            }
        };

        if applied {
            // The flag clears when the submission it was set for resolves,
            // regardless of where `select` has moved the current pointer.
            let mut loading_id = self.loading_id.write().await;
            if loading_id.as_deref() == Some(id) {
                *loading_id = None;
                self.loading.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Returns a snapshot of the history, most-recent-first.
    pub async fn history(&self) -> Vec<Submission> {
        self.history.read().await.clone()
    }

    /// Returns the currently displayed submission, if any.
    ///
    /// Looked up by id on every call, so a completion that replaced the
    /// current entry is reflected immediately.
    pub async fn current(&self) -> Option<Submission> {
        let id = self.current_id.read().await.clone()?;
        self.history.read().await.iter().find(|sub| sub.id == id).cloned()
    }

    /// Marks a history entry as current, returning it if present.
    pub async fn select(&self, id: &str) -> Option<Submission> {
        let selected = self.history.read().await.iter().find(|sub| sub.id == id).cloned()?;
        *self.current_id.write().await = Some(selected.id.clone());
        Some(selected)
    }

    /// Whether the most recent submit is still unresolved.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }
}
