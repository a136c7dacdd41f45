//! History persistence trait.
//!
//! Defines the interface for the durable store adapter, decoupling the
//! history state machine from the concrete storage mechanism.

use crate::error::Result;
use crate::submission::Submission;
use async_trait::async_trait;

/// An abstract durable store for the bounded submission history.
///
/// Implementations persist an artifact-stripped projection of history and
/// keep large binary artifacts only in a volatile side cache, so image
/// payloads never compete for durable storage quota.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persists the given history, most-recent-first.
    ///
    /// Capacity rejections are handled entirely inside the adapter (by
    /// shrinking the persisted prefix, down to an empty slot if necessary)
    /// and never surface to the caller.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Submission>)`: the history as actually persisted, with
    ///   cached artifacts reattached. Callers must adopt this list so the
    ///   in-memory and persisted views never diverge.
    /// - `Err(_)`: a non-capacity failure (I/O, serialization)
    async fn persist(&self, history: &[Submission]) -> Result<Vec<Submission>>;

    /// Loads the persisted history, reattaching cached artifacts by id.
    ///
    /// Absence or parse failure of the persisted slot yields an empty list;
    /// this operation never fails.
    async fn load(&self) -> Vec<Submission>;
}
