//! Pipeline orchestrator.
//!
//! Runs the category-specific sequence of remote calls for one submission.
//! This is purely a sequencing/aggregation layer over the generative
//! service; callers apply the resulting state transitions.

use refract_core::{Artifact, Category, DiagramLabel, GenerativeService, RefactorResult, Result};
use std::sync::Arc;

/// The finalized product of a successful pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// The refactor payload.
    pub result: RefactorResult,
    /// Diagram of the original code, when one was produced.
    pub artifact_before: Option<Artifact>,
    /// Diagram of the refactored code, when one was produced.
    pub artifact_after: Option<Artifact>,
}

/// Orchestrates the remote-call pipeline for one submission.
///
/// Two shapes exist, selected by category:
///
/// - `Render`: one refactor call, no diagrams.
/// - `Logic`: refactor and the "Original" diagram run concurrently; the
///   "Refactored" diagram runs strictly after the refactor resolves, since it
///   illustrates the refactored text.
///
/// Only the refactor call is fatal. Either diagram call failing is absorbed
/// here: the artifact is recorded as absent and the pipeline continues.
pub struct RefactorPipeline {
    service: Arc<dyn GenerativeService>,
}

impl RefactorPipeline {
    /// Creates a pipeline over the given generative service.
    pub fn new(service: Arc<dyn GenerativeService>) -> Self {
        Self { service }
    }

    /// Runs the pipeline shape for `category` against `code`.
    ///
    /// # Returns
    ///
    /// - `Ok(PipelineOutcome)`: refactor payload plus whatever diagrams were
    ///   produced
    /// - `Err(_)`: the refactor call failed; any concurrently produced
    ///   "Original" diagram is discarded
    pub async fn run(&self, code: &str, category: Category) -> Result<PipelineOutcome> {
        match category {
            Category::Render => {
                let result = self.service.refactor(code).await?;
                Ok(PipelineOutcome {
                    result,
                    artifact_before: None,
                    artifact_after: None,
                })
            }
            Category::Logic => {
                // The refactor and the original-code diagram are independent
                // of each other, so they run concurrently.
                let (refactor_outcome, artifact_before) = tokio::join!(
                    self.service.refactor(code),
                    self.diagram_best_effort(code, DiagramLabel::Original),
                );

                // A diagram without refactored code is not useful: the
                // refactor failure wins and the before-artifact is dropped.
                let result = refactor_outcome?;

                // Must not start before the refactor resolves: it diagrams
                // the refactored text, not the original.
                let artifact_after = self
                    .diagram_best_effort(&result.refactored_code, DiagramLabel::Refactored)
                    .await;

                Ok(PipelineOutcome {
                    result,
                    artifact_before,
                    artifact_after,
                })
            }
        }
    }

    /// Requests a diagram, absorbing any failure into an absent artifact.
    async fn diagram_best_effort(&self, code: &str, label: DiagramLabel) -> Option<Artifact> {
        match self.service.diagram(code, label).await {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                tracing::warn!(
                    "[RefactorPipeline] Failed to generate {} logic diagram: {}",
                    label,
                    err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use refract_core::RefractError;
    use std::sync::Mutex;

    /// Scripted service that records every call in order.
    struct ScriptedService {
        refactor_error: Option<RefractError>,
        fail_original_diagram: bool,
        fail_refactored_diagram: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn succeeding() -> Self {
            Self {
                refactor_error: None,
                fail_original_diagram: false,
                fail_refactored_diagram: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn log(&self, entry: String) {
            self.calls.lock().unwrap().push(entry);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeService for ScriptedService {
        async fn refactor(&self, code: &str) -> Result<RefactorResult> {
            self.log(format!("refactor:start:{code}"));
            // Yield so a concurrently started diagram call can interleave.
            tokio::task::yield_now().await;
            self.log(format!("refactor:end:{code}"));

            match &self.refactor_error {
                Some(err) => Err(err.clone()),
                None => Ok(RefactorResult {
                    refactored_code: format!("refactored({code})"),
                    unit_tests: "tests".to_string(),
                    explanation: None,
                }),
            }
        }

        async fn diagram(&self, code: &str, label: DiagramLabel) -> Result<Artifact> {
            self.log(format!("diagram:{label}:{code}"));
            let failed = match label {
                DiagramLabel::Original => self.fail_original_diagram,
                DiagramLabel::Refactored => self.fail_refactored_diagram,
            };
            if failed {
                Err(RefractError::remote_call("image service down"))
            } else {
                Ok(Artifact::new("image/png", format!("img:{label}")))
            }
        }
    }

    #[tokio::test]
    async fn test_render_pipeline_only_refactors() {
        let service = Arc::new(ScriptedService::succeeding());
        let pipeline = RefactorPipeline::new(service.clone());

        let outcome = pipeline
            .run("function App(){ return <div>hi</div> }", Category::Render)
            .await
            .unwrap();

        assert_eq!(
            outcome.result.refactored_code,
            "refactored(function App(){ return <div>hi</div> })"
        );
        assert!(outcome.artifact_before.is_none());
        assert!(outcome.artifact_after.is_none());

        let calls = service.calls();
        assert!(calls.iter().all(|c| !c.starts_with("diagram")));
    }

    #[tokio::test]
    async fn test_logic_pipeline_runs_all_three_calls() {
        let service = Arc::new(ScriptedService::succeeding());
        let pipeline = RefactorPipeline::new(service.clone());

        let outcome = pipeline.run("def f(x):\n  return x+1\n", Category::Logic).await.unwrap();

        assert_eq!(
            outcome.artifact_before,
            Some(Artifact::new("image/png", "img:Original"))
        );
        assert_eq!(
            outcome.artifact_after,
            Some(Artifact::new("image/png", "img:Refactored"))
        );

        let calls = service.calls();
        assert!(calls.iter().any(|c| c.starts_with("diagram:Original:def f(x):")));
        assert!(calls.iter().any(|c| c.starts_with("diagram:Refactored:")));
    }

    #[tokio::test]
    async fn test_refactored_diagram_gets_exactly_the_refactored_text() {
        let service = Arc::new(ScriptedService::succeeding());
        let pipeline = RefactorPipeline::new(service.clone());

        let outcome = pipeline.run("def f(): pass", Category::Logic).await.unwrap();

        let calls = service.calls();
        let after_call = calls
            .iter()
            .find(|c| c.starts_with("diagram:Refactored:"))
            .unwrap();
        assert_eq!(
            after_call,
            &format!("diagram:Refactored:{}", outcome.result.refactored_code)
        );
    }

    #[tokio::test]
    async fn test_refactored_diagram_runs_strictly_after_refactor() {
        let service = Arc::new(ScriptedService::succeeding());
        let pipeline = RefactorPipeline::new(service.clone());

        pipeline.run("def f(): pass", Category::Logic).await.unwrap();

        let calls = service.calls();
        let refactor_end = calls.iter().position(|c| c.starts_with("refactor:end")).unwrap();
        let after_diagram = calls
            .iter()
            .position(|c| c.starts_with("diagram:Refactored"))
            .unwrap();
        assert!(after_diagram > refactor_end);
    }

    #[tokio::test]
    async fn test_diagram_failures_are_not_fatal() {
        let service = Arc::new(ScriptedService {
            fail_original_diagram: true,
            fail_refactored_diagram: true,
            ..ScriptedService::succeeding()
        });
        let pipeline = RefactorPipeline::new(service);

        let outcome = pipeline.run("def f(): pass", Category::Logic).await.unwrap();

        assert!(outcome.artifact_before.is_none());
        assert!(outcome.artifact_after.is_none());
    }

    #[tokio::test]
    async fn test_refactor_failure_is_fatal_and_skips_refactored_diagram() {
        let service = Arc::new(ScriptedService {
            refactor_error: Some(RefractError::remote_call("service unreachable")),
            ..ScriptedService::succeeding()
        });
        let pipeline = RefactorPipeline::new(service.clone());

        let err = pipeline.run("def f(): pass", Category::Logic).await.unwrap_err();
        assert!(err.is_remote_call());

        let calls = service.calls();
        // The original diagram ran (and its artifact was discarded with the
        // failure); the refactored diagram was never issued.
        assert!(calls.iter().any(|c| c.starts_with("diagram:Original")));
        assert!(calls.iter().all(|c| !c.starts_with("diagram:Refactored")));
    }

    #[tokio::test]
    async fn test_render_refactor_failure_propagates_verbatim() {
        let service = Arc::new(ScriptedService {
            refactor_error: Some(RefractError::remote_status(401, "bad key", false)),
            ..ScriptedService::succeeding()
        });
        let pipeline = RefactorPipeline::new(service);

        let err = pipeline.run("<App/>", Category::Render).await.unwrap_err();
        assert!(err.to_string().contains("bad key"));
    }
}
