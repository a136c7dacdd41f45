pub mod config_service;
pub mod dto;
pub mod history_store;
pub mod paths;
pub mod secret_service;
pub mod slot_store;

pub use crate::config_service::load_remote_config;
pub use crate::history_store::{HISTORY_SLOT_KEY, JsonHistoryStore};
pub use crate::paths::RefractPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::slot_store::{FileSlotStore, MemorySlotStore, SlotStore};
