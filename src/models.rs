use serde::Deserialize;

/// A single user item from the search results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Response from the GitHub Search Users API (`/search/users`).
///
/// Only `items` is read; `total_count` and `incomplete_results` are ignored.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<User>,
}
