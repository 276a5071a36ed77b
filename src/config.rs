use std::env;

pub const DEFAULT_HOST: &str = "https://api.github.com";
pub const DEFAULT_SEARCH_PATH: &str = "/search/users?q=";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Endpoint and credentials for the user search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    /// Path up to and including the query parameter name; the encoded query is appended.
    pub search_path: String,
    pub api_version: String,
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: None,
        }
    }
}

impl ApiConfig {
    /// Reads `GITHUB_API_HOST`, `GITHUB_API_SEARCH_PATH` and `GITHUB_API_KEY`.
    ///
    /// Loading a `.env` file is left to the caller.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            host: non_empty("GITHUB_API_HOST")
                .map(|h| h.trim_end_matches('/').to_string())
                .unwrap_or(defaults.host),
            search_path: non_empty("GITHUB_API_SEARCH_PATH").unwrap_or(defaults.search_path),
            api_version: defaults.api_version,
            api_key: non_empty("GITHUB_API_KEY"),
        }
    }
}
