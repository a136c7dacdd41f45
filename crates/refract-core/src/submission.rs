//! Submission domain model.
//!
//! This module contains the core entities that represent one code-snippet
//! refactor request and its lifecycle state as it moves through the
//! classification, pipeline, and history layers.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The execution category assigned to a submission by the classifier.
///
/// The category is assigned exactly once at submission time and determines,
/// for the lifetime of the submission, which pipeline shape runs and whether
/// diagram artifacts are ever populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// UI code: refactor only, visuals come from a live preview outside the core.
    Render,
    /// Backend/logic code: refactor plus best-effort before/after logic diagrams.
    Logic,
}

/// The lifecycle status of a submission.
///
/// A submission starts `Pending` at the optimistic-insertion point and moves
/// to exactly one of `Success` or `Error`; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Remote work has been started but has not resolved yet.
    Pending,
    /// The pipeline completed and produced a refactor result.
    Success,
    /// The pipeline failed; `error_message` carries the reason.
    Error,
}

/// The payload produced by a successful refactor call.
///
/// Field names serialize in camelCase to match both the persisted history
/// layout and the structured JSON the remote service returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResult {
    /// The complete refactored code snippet.
    pub refactored_code: String,
    /// Generated unit tests for the refactored code.
    pub unit_tests: String,
    /// A brief explanation of the changes, when the service provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A generated binary image reference (logic diagram).
///
/// Artifacts live only in volatile memory; they are never written to the
/// durable history slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// MIME type reported by the image service, e.g. `image/png`.
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data: String,
}

impl Artifact {
    /// Creates an artifact from a mime type and base64 payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Renders the artifact as a `data:` URL suitable for direct display.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decodes the payload into raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the payload is not valid base64.
    pub fn bytes(&self) -> crate::error::Result<Vec<u8>> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| crate::error::RefractError::Serialization {
                format: "base64".to_string(),
                message: e.to_string(),
            })
    }
}

/// One code-snippet refactor request and its associated lifecycle state.
///
/// The `id` is assigned at submission time and is the stable key by which
/// pipeline completions, history replacement, and the artifact cache all
/// address this submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// Opaque unique identifier, stable for the submission's lifetime.
    pub id: String,
    /// Creation timestamp in UTC milliseconds, used for ordering and display.
    pub created_at: i64,
    /// The original text as submitted; immutable once set.
    pub source_code: String,
    /// Category assigned once by the classifier; immutable thereafter.
    pub category: Category,
    /// The refactor payload; `None` until the refactor call completes.
    pub result: Option<RefactorResult>,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// Present only when `status` is `Error`.
    pub error_message: Option<String>,
    /// Diagram of the original code; only ever set for `Logic` submissions.
    pub artifact_before: Option<Artifact>,
    /// Diagram of the refactored code; only ever set for `Logic` submissions.
    pub artifact_after: Option<Artifact>,
}

impl Submission {
    /// Creates a new pending submission for freshly submitted code.
    ///
    /// This is the optimistic-insertion point: the submission is visible in
    /// history before any remote call resolves.
    pub fn pending(source_code: impl Into<String>, category: Category) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now().timestamp_millis(),
            source_code: source_code.into(),
            category,
            result: None,
            status: SubmissionStatus::Pending,
            error_message: None,
            artifact_before: None,
            artifact_after: None,
        }
    }

    /// Transitions this submission to its terminal `Success` state.
    ///
    /// Artifacts are accepted only for `Logic` submissions; for `Render`
    /// submissions they stay `None` regardless of what the caller passes.
    pub fn into_success(
        mut self,
        result: RefactorResult,
        artifact_before: Option<Artifact>,
        artifact_after: Option<Artifact>,
    ) -> Self {
        self.result = Some(result);
        self.status = SubmissionStatus::Success;
        self.error_message = None;
        if self.category == Category::Logic {
            self.artifact_before = artifact_before;
            self.artifact_after = artifact_after;
        }
        self
    }

    /// Transitions this submission to its terminal `Error` state.
    pub fn into_error(mut self, message: impl Into<String>) -> Self {
        self.status = SubmissionStatus::Error;
        self.error_message = Some(message.into());
        // Partial outputs from a failed pipeline are discarded.
        self.result = None;
        self.artifact_before = None;
        self.artifact_after = None;
        self
    }

    /// Returns true once the submission has reached `Success` or `Error`.
    pub fn is_terminal(&self) -> bool {
        self.status != SubmissionStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> RefactorResult {
        RefactorResult {
            refactored_code: "const x = 1;".to_string(),
            unit_tests: "test('x', () => {});".to_string(),
            explanation: Some("Tightened scoping.".to_string()),
        }
    }

    #[test]
    fn test_pending_submission_shape() {
        let sub = Submission::pending("def f(x):\n  return x", Category::Logic);

        assert_eq!(sub.status, SubmissionStatus::Pending);
        assert!(!sub.is_terminal());
        assert!(sub.result.is_none());
        assert!(sub.error_message.is_none());
        assert!(sub.artifact_before.is_none());
        assert!(sub.artifact_after.is_none());
        assert!(!sub.id.is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let a = Submission::pending("x", Category::Render);
        let b = Submission::pending("x", Category::Render);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_into_success_keeps_artifacts_for_logic() {
        let sub = Submission::pending("def f(): pass", Category::Logic);
        let before = Artifact::new("image/png", "aaaa");
        let after = Artifact::new("image/png", "bbbb");

        let done = sub.into_success(sample_result(), Some(before.clone()), Some(after.clone()));

        assert_eq!(done.status, SubmissionStatus::Success);
        assert!(done.is_terminal());
        assert_eq!(done.artifact_before, Some(before));
        assert_eq!(done.artifact_after, Some(after));
    }

    #[test]
    fn test_into_success_drops_artifacts_for_render() {
        let sub = Submission::pending("<div>hi</div>", Category::Render);

        let done = sub.into_success(
            sample_result(),
            Some(Artifact::new("image/png", "aaaa")),
            None,
        );

        assert!(done.artifact_before.is_none());
        assert!(done.artifact_after.is_none());
    }

    #[test]
    fn test_into_error_discards_partial_outputs() {
        let mut sub = Submission::pending("def f(): pass", Category::Logic);
        sub.artifact_before = Some(Artifact::new("image/png", "aaaa"));

        let failed = sub.into_error("service unreachable");

        assert_eq!(failed.status, SubmissionStatus::Error);
        assert_eq!(failed.error_message.as_deref(), Some("service unreachable"));
        assert!(failed.result.is_none());
        assert!(failed.artifact_before.is_none());
    }

    #[test]
    fn test_artifact_data_url() {
        let artifact = Artifact::new("image/png", "aGVsbG8=");
        assert_eq!(artifact.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn test_artifact_bytes_roundtrip() {
        let artifact = Artifact::new("image/png", "aGVsbG8=");
        assert_eq!(artifact.bytes().unwrap(), b"hello");
        assert!(Artifact::new("image/png", "not base64!").bytes().is_err());
    }

    #[test]
    fn test_refactor_result_camel_case() {
        let json = serde_json::to_string(&sample_result()).unwrap();
        assert!(json.contains("refactoredCode"));
        assert!(json.contains("unitTests"));

        let parsed: RefactorResult =
            serde_json::from_str(r#"{"refactoredCode":"a","unitTests":"b"}"#).unwrap();
        assert_eq!(parsed.explanation, None);
    }
}
