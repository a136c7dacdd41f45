//! Remote generative operations consumed by the pipeline.
//!
//! Defines the interface boundary for the two opaque remote calls: a text
//! refactor and an image (logic diagram) generation. Implementations live in
//! `refract-interaction`.

use crate::error::Result;
use crate::submission::{Artifact, RefactorResult};
use async_trait::async_trait;
use std::fmt;

/// Which side of the comparison a diagram illustrates.
///
/// The label is interpolated into the diagram prompt, so `Display` produces
/// the human-readable word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramLabel {
    /// Diagram of the code as submitted.
    Original,
    /// Diagram of the refactored code.
    Refactored,
}

impl fmt::Display for DiagramLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramLabel::Original => write!(f, "Original"),
            DiagramLabel::Refactored => write!(f, "Refactored"),
        }
    }
}

/// An abstract client for the remote generative service.
///
/// Both operations are asynchronous, fallible, and independent. The pipeline
/// treats `refactor` failures as fatal and `diagram` failures as best-effort
/// (absent artifact); that policy lives in the caller, not here.
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Refactors a code snippet and generates unit tests for it.
    ///
    /// # Returns
    ///
    /// - `Ok(RefactorResult)`: refactored code, tests, and an optional explanation
    /// - `Err(_)`: the remote service was unreachable, returned malformed
    ///   data, or returned no usable payload
    async fn refactor(&self, code: &str) -> Result<RefactorResult>;

    /// Generates a logic-flow diagram for a code snippet.
    ///
    /// # Arguments
    ///
    /// * `code` - The code to illustrate
    /// * `label` - Whether this is the original or the refactored side
    ///
    /// # Returns
    ///
    /// - `Ok(Artifact)`: an inline image reference
    /// - `Err(_)`: the remote service failed or produced no image
    async fn diagram(&self, code: &str, label: DiagramLabel) -> Result<Artifact>;
}
