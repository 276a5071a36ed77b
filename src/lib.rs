//! Debounced, cancel-safe typeahead search for GitHub users.

pub mod client;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod models;
pub mod pointer;
pub mod typeahead;
pub mod view;

pub use client::{GitHubClient, SearchBackend};
pub use config::ApiConfig;
pub use controller::{Completion, Dropdown, SearchController};
pub use error::SearchError;
pub use models::User;
pub use pointer::{Bounds, Point, PointerBus, PointerDown};
pub use typeahead::{Typeahead, TypeaheadConfig};
pub use view::ViewState;
