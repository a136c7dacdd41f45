//! Persistence DTOs.
//!
//! The durable slot holds a JSON array of `SubmissionRecord`s, most-recent-
//! first. The record is the artifact-stripped projection of a submission:
//! artifact fields are never present in the serialized form, by construction.

use refract_core::{Artifact, Category, RefactorResult, Submission, SubmissionStatus};
use serde::{Deserialize, Serialize};

/// The wire shape of one persisted history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub created_at: i64,
    pub source_code: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RefactorResult>,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&Submission> for SubmissionRecord {
    fn from(submission: &Submission) -> Self {
        Self {
            id: submission.id.clone(),
            created_at: submission.created_at,
            source_code: submission.source_code.clone(),
            category: submission.category,
            result: submission.result.clone(),
            status: submission.status,
            error_message: submission.error_message.clone(),
        }
    }
}

impl SubmissionRecord {
    /// Rebuilds a domain submission, reattaching any cached artifacts.
    pub fn into_submission(
        self,
        artifact_before: Option<Artifact>,
        artifact_after: Option<Artifact>,
    ) -> Submission {
        Submission {
            id: self.id,
            created_at: self.created_at,
            source_code: self.source_code,
            category: self.category,
            result: self.result,
            status: self.status,
            error_message: self.error_message,
            artifact_before,
            artifact_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_strips_artifacts() {
        let mut submission = Submission::pending("def f(): pass", Category::Logic);
        submission.artifact_before = Some(Artifact::new("image/png", "aaaa"));

        let json = serde_json::to_string(&SubmissionRecord::from(&submission)).unwrap();

        assert!(!json.contains("artifact"));
        assert!(!json.contains("aaaa"));
        assert!(json.contains("sourceCode"));
        assert!(json.contains("createdAt"));
        assert!(json.contains(r#""status":"pending""#));
        assert!(json.contains(r#""category":"logic""#));
    }

    #[test]
    fn test_record_roundtrip_with_reattached_artifacts() {
        let submission = Submission::pending("<App/>", Category::Render);
        let record = SubmissionRecord::from(&submission);

        let json = serde_json::to_string(&record).unwrap();
        let parsed: SubmissionRecord = serde_json::from_str(&json).unwrap();
        let restored = parsed.into_submission(None, None);

        assert_eq!(restored, submission);
    }
}
