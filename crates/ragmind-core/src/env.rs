//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Load environment variables from a .env file in the working directory.
///
/// Variables already present in the environment are left untouched.
pub fn load_dotenv() -> Result<(), std::io::Error> {
    let path = std::path::Path::new(".env");
    if !path.exists() {
        return Ok(());
    }

    let content = std::fs::read_to_string(path)?;
    for (key, value) in parse_dotenv(&content) {
        if env::var(&key).is_err() {
            env::set_var(key, value);
        }
    }
    Ok(())
}

/// Parse `KEY=value` lines, skipping comments and stripping matching quotes.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Common environment variable names.
pub mod vars {
    /// API key for OpenAI (chat and embeddings).
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

    /// API key for Pinecone.
    pub const PINECONE_API_KEY: &str = "PINECONE_API_KEY";

    /// Pinecone index host; selects the Pinecone backend when no config file exists.
    pub const PINECONE_HOST: &str = "PINECONE_HOST";

    /// ragmind home directory override.
    pub const RAGMIND_HOME: &str = "RAGMIND_HOME";

    /// ragmind config file override.
    pub const RAGMIND_CONFIG: &str = "RAGMIND_CONFIG";

    /// Local index file override.
    pub const RAGMIND_INDEX_PATH: &str = "RAGMIND_INDEX_PATH";

    /// Chat model override.
    pub const RAGMIND_MODEL: &str = "RAGMIND_MODEL";
}
