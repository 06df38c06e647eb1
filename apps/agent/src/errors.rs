use thiserror::Error;

use crate::llm_client::LlmError;

/// Failures on the query-generation path: resume extraction, the model call,
/// or parsing the model's reply. All of them are recovered by falling back to
/// the fixed query list — none aborts the run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Resume extraction failed: {0}")]
    Resume(#[from] pdf_extract::OutputError),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Model reply rejected: {0}")]
    Parse(String),
}
