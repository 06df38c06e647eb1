/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the generative-language API
/// directly. All LLM interactions MUST go through this module.
///
/// Model: gemini-2.0-flash (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
pub const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Wraps the Gemini generateContent endpoint. One request, one response —
/// no streaming and no retry; a failed call is the caller's cue to degrade
/// to its fallback path.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends a prompt and returns the first text block of the completion.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let url = format!("{GEMINI_API_BASE}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateResponse = response.json().await?;

        let text = reply
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.text)
            .ok_or(LlmError::EmptyContent)?;

        debug!("LLM call succeeded ({} chars)", text.len());
        Ok(text)
    }
}

/// Strips ```lang ... ``` or ``` ... ``` code fences from LLM output.
/// Models wrap structured replies in fences no matter how firmly told not to.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence, if any
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or_else(|| rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_with_language_tag() {
        let input = "```json\n[\"a\", \"b\"]\n```";
        assert_eq!(strip_code_fences(input), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_strip_code_fences_python_tag() {
        let input = "```python\n[\"Role | Location\"]\n```";
        assert_eq!(strip_code_fences(input), "[\"Role | Location\"]");
    }

    #[test]
    fn test_strip_code_fences_without_tag() {
        let input = "```\n[\"a\"]\n```";
        assert_eq!(strip_code_fences(input), "[\"a\"]");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        let input = "[\"a\"]";
        assert_eq!(strip_code_fences(input), "[\"a\"]");
    }

    #[test]
    fn test_strip_code_fences_unterminated() {
        let input = "```json\n[\"a\"]";
        assert_eq!(strip_code_fences(input), "[\"a\"]");
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "hello"}]
                }
            }]
        }"#;
        let reply: GenerateResponse = serde_json::from_str(json).unwrap();
        let text = reply
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.text);
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_response_with_no_candidates_is_empty() {
        let reply: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.candidates.is_empty());
    }
}
