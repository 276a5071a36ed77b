use std::future::Future;

use anyhow::{Context, Result};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::SearchError;
use crate::models::{SearchResponse, User};

const USER_AGENT: &str = "github-typeahead";
const GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Characters left untouched by `encodeURIComponent`-style encoding.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Something that can answer a user search.
///
/// The returned future must be `Send` so the runtime can race it against a
/// cancellation token on its own task.
pub trait SearchBackend: Send + Sync {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<User>, SearchError>> + Send;
}

/// GitHub user search over HTTPS.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: ApiConfig,
}

impl GitHubClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `{host}{search_path}{encoded query}`.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}{}{}",
            self.config.host,
            self.config.search_path,
            utf8_percent_encode(query, QUERY_COMPONENT)
        )
    }

    fn request(&self, query: &str) -> RequestBuilder {
        let mut request = self
            .http
            .get(self.search_url(query))
            .header(ACCEPT, HeaderValue::from_static(GITHUB_JSON))
            .header(API_VERSION_HEADER, self.config.api_version.as_str());

        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }
        request
    }
}

impl SearchBackend for GitHubClient {
    async fn search(&self, query: &str) -> Result<Vec<User>, SearchError> {
        debug!(query, "sending search request");

        let response = self
            .request(query)
            .send()
            .await
            .map_err(SearchError::transport)?;

        // Error statuses usually still carry a JSON body; let the parser decide.
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "search API responded with an error status");
        }

        let body = response.bytes().await.map_err(SearchError::transport)?;
        parse_search_body(&body)
    }
}

/// Parses a search response body, requiring an `items` array of users.
pub fn parse_search_body(body: &[u8]) -> Result<Vec<User>, SearchError> {
    let search: SearchResponse = serde_json::from_slice(body)?;
    Ok(search.items)
}
