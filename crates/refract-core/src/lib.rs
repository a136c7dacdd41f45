pub mod classifier;
pub mod config;
pub mod error;
pub mod secret;
pub mod service;
pub mod store;
pub mod submission;

// Re-export common error type
pub use error::{RefractError, Result};

pub use classifier::classify;
pub use service::{DiagramLabel, GenerativeService};
pub use store::HistoryStore;
pub use submission::{Artifact, Category, RefactorResult, Submission, SubmissionStatus};
