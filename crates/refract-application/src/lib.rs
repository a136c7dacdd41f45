pub mod bootstrap;
pub mod history;
pub mod pipeline;

pub use bootstrap::bootstrap;
pub use history::HistoryManager;
pub use pipeline::{PipelineOutcome, RefactorPipeline};
