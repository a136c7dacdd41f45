//! GeminiClient - Direct REST API implementation of the generative service.
//!
//! Talks to the Gemini REST API without any CLI dependency. The refactor
//! operation requests structured JSON output; the diagram operation requests
//! an inline image. API key configuration is loaded from secret.json.

use async_trait::async_trait;
use refract_core::config::RemoteConfig;
use refract_core::secret::SecretService;
use refract_core::{Artifact, DiagramLabel, GenerativeService, RefactorResult, RefractError, Result};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::json;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Diagram prompts cap the code excerpt so oversized snippets do not blow
/// the image-model context.
const DIAGRAM_CODE_LIMIT: usize = 5000;

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Creates a new client with the provided API key and default models.
    pub fn new(api_key: impl Into<String>) -> Self {
        let config = RemoteConfig::default();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            text_model: config.text_model,
            image_model: config.image_model,
        }
    }

    /// Loads the API key from a secret service.
    pub async fn try_from_secrets(service: &dyn SecretService) -> Result<Self> {
        let secrets = service
            .load_secrets()
            .await
            .map_err(|e| RefractError::config(format!("Failed to load secret.json: {}", e)))?;

        let gemini = secrets.gemini.ok_or_else(|| {
            RefractError::config("Gemini configuration not found in secret.json")
        })?;

        Ok(Self::new(gemini.api_key))
    }

    /// Overrides the text model after construction.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Overrides the image model after construction.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = model,
            api_key = self.api_key
        );

        let response = self.client.post(url).json(body).send().await.map_err(|err| {
            RefractError::RemoteCall {
                message: format!("Gemini API request failed: {err}"),
                status_code: None,
                retryable: err.is_connect() || err.is_timeout(),
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        response
            .json()
            .await
            .map_err(|err| RefractError::remote_call(format!("Failed to parse Gemini response: {err}")))
    }
}

#[async_trait]
impl GenerativeService for GeminiClient {
    async fn refactor(&self, code: &str) -> Result<RefactorResult> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: refactor_prompt(code),
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Some(refactor_response_schema()),
            }),
        };

        tracing::info!("[GeminiClient] Requesting refactor, {} input chars", code.len());

        let response = self.send_request(&self.text_model, &request).await?;
        let text = extract_text(response)?;

        let result: RefactorResult = serde_json::from_str(&text).map_err(|err| {
            RefractError::remote_call(format!("Gemini returned malformed refactor payload: {err}"))
        })?;

        Ok(result)
    }

    async fn diagram(&self, code: &str, label: DiagramLabel) -> Result<Artifact> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: diagram_prompt(code, label),
                }],
            }],
            generation_config: None,
        };

        tracing::info!("[GeminiClient] Requesting {} logic diagram", label);

        let response = self.send_request(&self.image_model, &request).await?;
        extract_inline_image(response)
    }
}

// ============================================================================
// Prompt construction
// ============================================================================

fn refactor_prompt(code: &str) -> String {
    format!(
        r#"You are an expert senior software engineer and UI/UX specialist.
Refactor the following code snippet.

Goals:
1. Improve code cleanliness, performance, and readability.
2. Fix logic bugs, security vulnerabilities, or time complexity issues (Big O).
3. Use modern practices (e.g., proper variable scoping, built-in methods, secure patterns).
4. If it is UI code, enhance accessibility (ARIA) and ensure it is a self-contained functional component that can be rendered immediately.

Also, generate comprehensive unit tests for the refactored code.

Input Code:
{code}"#
    )
}

fn diagram_prompt(code: &str, label: DiagramLabel) -> String {
    let excerpt: String = code.chars().take(DIAGRAM_CODE_LIMIT).collect();
    format!(
        r#"Create a professional, high-resolution logic flow diagram representing the logic of the following {label} code.

Style: Clean, structured visual representation with clear process flow, decision points, and logic branches.
Use professional flowchart conventions: rectangles for processes, diamonds for decisions, arrows for flow direction.
High contrast, blueprint aesthetic. Do NOT show code text directly, show shapes, arrows, and logic flow.

Code Context:
{excerpt}"#
    )
}

/// Structured-output schema the refactor call asks Gemini to honor.
fn refactor_response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "refactoredCode": {
                "type": "STRING",
                "description": "The complete refactored code snippet. If React, ensure it is a functional component.",
            },
            "unitTests": {
                "type": "STRING",
                "description": "The unit tests for the refactored code.",
            },
            "explanation": {
                "type": "STRING",
                "description": "A brief explanation of changes made.",
            },
        },
        "required": ["refactoredCode", "unitTests"],
    })
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

// ============================================================================
// Response extraction and error mapping
// ============================================================================

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| {
            RefractError::remote_call("Gemini API returned no text in the response candidates")
        })
}

fn extract_inline_image(response: GenerateContentResponse) -> Result<Artifact> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| {
            content
                .parts
                .into_iter()
                .find_map(|part| part.inline_data)
        })
        .map(|inline| {
            Artifact::new(
                inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
                inline.data,
            )
        })
        .ok_or_else(|| RefractError::remote_call("Gemini API returned no image in the response"))
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<u64>) -> RefractError {
    let mut message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    if let Some(seconds) = retry_after {
        message = format!("{message} (retry after {seconds}s)");
    }

    RefractError::remote_status(status.as_u16(), message, retryable)
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<u64> {
    // Retry-After HTTP-date parsing is omitted; only the seconds form is used.
    header?.to_str().ok()?.parse::<u64>().ok()
}
