//! Default wiring for embedders.
//!
//! The core is invoked programmatically by a presentation layer; this module
//! assembles the production object graph: Gemini client from `secret.json`,
//! file-backed history slot under the platform data directory, and a restored
//! `HistoryManager` on top.

use crate::history::HistoryManager;
use refract_core::config::DEFAULT_MAX_HISTORY;
use refract_core::{RefractError, Result};
use refract_infrastructure::{
    FileSlotStore, JsonHistoryStore, RefractPaths, SecretServiceImpl, load_remote_config,
};
use refract_interaction::GeminiClient;
use std::sync::Arc;

/// Builds a [`HistoryManager`] wired to the Gemini API and durable storage,
/// with previously persisted history restored.
///
/// # Errors
///
/// Returns an error when the platform directories cannot be resolved or the
/// Gemini API key is missing from `secret.json`.
pub async fn bootstrap() -> Result<HistoryManager> {
    let secrets = SecretServiceImpl::default_location().map_err(RefractError::config)?;
    let remote = load_remote_config()?;
    let client = GeminiClient::try_from_secrets(&secrets)
        .await?
        .with_text_model(remote.text_model)
        .with_image_model(remote.image_model);

    let slot = FileSlotStore::new(RefractPaths::data_dir()?);
    let store = JsonHistoryStore::new(Arc::new(slot), DEFAULT_MAX_HISTORY);

    let manager = HistoryManager::new(Arc::new(client), Arc::new(store));
    manager.restore().await;

    Ok(manager)
}
