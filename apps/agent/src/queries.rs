//! Query Generator — resume-seeded search terms with a fixed fallback.

use tracing::{error, info};

use crate::config::Config;
use crate::errors::GenerationError;
use crate::llm_client::prompts::build_query_prompt;
use crate::llm_client::{strip_code_fences, LlmClient};
use crate::resume;

/// Search terms used whenever AI-driven generation fails. This list is part
/// of the contract: a failed generation returns exactly these five queries.
pub const FALLBACK_QUERIES: [&str; 5] = [
    "Generative AI Engineer | India",
    "Data Scientist | India",
    "Python Developer | India",
    "Computer Vision Engineer | India",
    "Software Engineer Fresher | India",
];

/// Resume context is capped before prompting to keep the request small.
const RESUME_CONTEXT_CHARS: usize = 3000;

/// One search term: a role and a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub role: String,
    pub location: String,
}

impl SearchQuery {
    /// Parses a `"Role | Location"` pair. Splitting on `|` must yield exactly
    /// two non-empty trimmed fields; anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('|');
        let role = parts.next()?.trim();
        let location = parts.next()?.trim();
        if role.is_empty() || location.is_empty() || parts.next().is_some() {
            return None;
        }
        Some(Self {
            role: role.to_string(),
            location: location.to_string(),
        })
    }
}

/// The parsed form of [`FALLBACK_QUERIES`].
pub fn fallback_queries() -> Vec<SearchQuery> {
    FALLBACK_QUERIES
        .iter()
        .filter_map(|q| SearchQuery::parse(q))
        .collect()
}

/// Generates search queries from the resume via the LLM. Never fails: any
/// failure along the way degrades to the fixed fallback list.
pub async fn generate_queries(config: &Config, llm: &LlmClient) -> Vec<SearchQuery> {
    match try_generate(config, llm).await {
        Ok(queries) => {
            info!("Generated {} search queries from resume", queries.len());
            queries
        }
        Err(e) => {
            error!("AI generation failed: {e}. Reverting to fallback queries.");
            fallback_queries()
        }
    }
}

async fn try_generate(config: &Config, llm: &LlmClient) -> Result<Vec<SearchQuery>, GenerationError> {
    info!("Reading resume file...");
    let text = resume::extract_text(&config.resume_file)?;
    let context: String = text.chars().take(RESUME_CONTEXT_CHARS).collect();

    let prompt = build_query_prompt(&context);
    let reply = llm.call(&prompt).await?;

    let entries = parse_string_list(strip_code_fences(&reply))?;

    // Malformed entries are dropped individually; an entirely unusable reply
    // is a generation failure like any other.
    let queries: Vec<SearchQuery> = entries
        .iter()
        .filter_map(|entry| SearchQuery::parse(entry))
        .collect();

    if queries.is_empty() {
        return Err(GenerationError::Parse(
            "no well-formed 'Role | Location' entries in model reply".to_string(),
        ));
    }
    Ok(queries)
}

/// Strict parser for the model reply: accepts only a literal JSON array of
/// strings. The reply is data — it is never evaluated.
fn parse_string_list(text: &str) -> Result<Vec<String>, GenerationError> {
    serde_json::from_str::<Vec<String>>(text.trim())
        .map_err(|e| GenerationError::Parse(format!("expected a JSON array of strings: {e}")))
}
