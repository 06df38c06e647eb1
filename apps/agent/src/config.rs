use anyhow::{Context, Result};

/// Process-wide configuration loaded from environment variables.
/// Constructed once at startup and passed into each component — nothing
/// reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub scraper_url: String,
    pub credentials_file: String,
    pub resume_file: String,
    pub sheet_name: String,
    pub sheet_formatting: bool,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            scraper_url: require_env("SCRAPER_URL")?,
            credentials_file: env_or("GOOGLE_CREDENTIALS_FILE", "credentials.json"),
            resume_file: env_or("RESUME_FILE", "resume.pdf"),
            sheet_name: env_or("SHEET_NAME", "Daily_Job_Hunt"),
            sheet_formatting: std::env::var("SHEET_FORMATTING")
                .map(|v| flag_enabled(&v))
                .unwrap_or(true),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn flag_enabled(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
