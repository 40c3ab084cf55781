//! Chat server REST integration
//!
//! This module provides:
//! - Wire types for the post endpoints
//! - An HTTP client implementing the sync pass's fetch capability
//! - Response normalization to domain models

mod client;
mod normalize;

pub use client::{ChatClient, SessionExpiredError};
pub use normalize::{normalize_post, normalize_post_list};

/// Server API response types
pub mod api {
    use serde::Deserialize;
    use std::collections::HashMap;

    /// Response from the post-list endpoints.
    ///
    /// Posts come as an id-keyed map; `order` gives the display order
    /// (newest first).
    #[derive(Debug, Deserialize)]
    pub struct PostListResponse {
        #[serde(default)]
        pub order: Vec<String>,
        #[serde(default)]
        pub posts: HashMap<String, ApiPost>,
        #[serde(default)]
        pub next_post_id: Option<String>,
        #[serde(default)]
        pub prev_post_id: Option<String>,
    }

    /// A post as the server serializes it
    #[derive(Debug, Clone, Deserialize)]
    pub struct ApiPost {
        pub id: String,
        pub channel_id: String,
        #[serde(default)]
        pub user_id: String,
        #[serde(default)]
        pub message: String,
        #[serde(default)]
        pub create_at: i64,
    }
}
