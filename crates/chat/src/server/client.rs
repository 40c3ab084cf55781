//! Chat server HTTP client
//!
//! Provides methods for fetching posts from the server's REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use super::api::PostListResponse;
use super::normalize::normalize_post_list;
use crate::config::ServerCredentials;
use crate::models::{ChannelId, Page};
use crate::sync::PostFetcher;

/// Error indicating the server rejected the session token (401)
#[derive(Debug, thiserror::Error)]
#[error("Session token rejected by server")]
pub struct SessionExpiredError;

/// HTTP client for the chat server's REST API
pub struct ChatClient {
    base_url: Url,
    token: String,
}

impl ChatClient {
    /// REST API route prefix
    const API_PREFIX: &'static str = "api/v4";

    /// Page size for unconditional post fetches
    pub const DEFAULT_POSTS_PER_PAGE: usize = 60;

    /// Create a new client from server credentials
    pub fn new(credentials: &ServerCredentials) -> Result<Self> {
        let base_url = Url::parse(&credentials.server_url)
            .with_context(|| format!("Invalid server URL: {}", credentials.server_url))?;
        Ok(Self {
            base_url,
            token: credentials.token.clone(),
        })
    }

    fn channel_posts_url(&self, channel_id: &ChannelId) -> String {
        format!(
            "{}/{}/channels/{}/posts",
            self.base_url.as_str().trim_end_matches('/'),
            Self::API_PREFIX,
            urlencoding::encode(channel_id.as_str())
        )
    }

    /// Get the most recent page of posts for a channel
    ///
    /// # Arguments
    /// * `channel_id` - The channel to fetch
    /// * `per_page` - Maximum number of posts to return (1-200)
    pub fn get_posts(&self, channel_id: &ChannelId, per_page: usize) -> Result<PostListResponse> {
        let url = format!(
            "{}?page=0&per_page={}",
            self.channel_posts_url(channel_id),
            per_page.min(200)
        );
        self.get_post_list(&url)
    }

    /// Get posts made in a channel since the given time (epoch millis)
    pub fn get_posts_since(&self, channel_id: &ChannelId, since: i64) -> Result<PostListResponse> {
        let url = format!("{}?since={}", self.channel_posts_url(channel_id), since);
        self.get_post_list(&url)
    }

    fn get_post_list(&self, url: &str) -> Result<PostListResponse> {
        let response = ureq::get(url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .call();

        match response {
            Ok(mut resp) => {
                let list: PostListResponse = resp
                    .body_mut()
                    .read_json()
                    .context("Failed to parse post list response")?;
                Ok(list)
            }
            Err(ureq::Error::StatusCode(401)) => Err(SessionExpiredError.into()),
            Err(e) => Err(anyhow::anyhow!("Failed to fetch posts: {}", e)),
        }
    }

    /// Fetch a post list with exponential backoff retry.
    ///
    /// An expired session is not retried; waiting will not refresh a token.
    fn get_post_list_with_retry<F>(&self, fetch: F, max_retries: u32) -> Result<PostListResponse>
    where
        F: Fn() -> Result<PostListResponse>,
    {
        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..max_retries {
            match fetch() {
                Ok(list) => return Ok(list),
                Err(e) if e.is::<SessionExpiredError>() => return Err(e),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < max_retries - 1 {
                        // Add jitter to delay
                        let jitter = Duration::from_millis(rand_jitter());
                        std::thread::sleep(delay + jitter);
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap())
    }
}

impl PostFetcher for ChatClient {
    fn fetch_posts(&self, channel_id: &ChannelId) -> Result<Page> {
        let list = self.get_post_list_with_retry(
            || self.get_posts(channel_id, Self::DEFAULT_POSTS_PER_PAGE),
            3,
        )?;
        Ok(normalize_post_list(list))
    }

    fn fetch_posts_since(&self, channel_id: &ChannelId, since: i64) -> Result<Page> {
        let list =
            self.get_post_list_with_retry(|| self.get_posts_since(channel_id, since), 3)?;
        Ok(normalize_post_list(list))
    }
}

/// Generate a random jitter value (0-100ms)
fn rand_jitter() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let hasher = RandomState::new().build_hasher();
    hasher.finish() % 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client(server_url: &str) -> Result<ChatClient> {
        ChatClient::new(&ServerCredentials {
            server_url: server_url.to_string(),
            token: "test-token".to_string(),
        })
    }

    #[test]
    fn test_rejects_invalid_server_url() {
        assert!(make_client("not a url").is_err());
    }

    #[test]
    fn test_posts_url_shape() {
        let client = make_client("https://chat.example.com/").unwrap();
        let url = client.channel_posts_url(&ChannelId::new("c1"));
        assert_eq!(url, "https://chat.example.com/api/v4/channels/c1/posts");
    }

    #[test]
    fn test_posts_url_encodes_channel_id() {
        let client = make_client("https://chat.example.com/").unwrap();
        let url = client.channel_posts_url(&ChannelId::new("c 1"));
        assert_eq!(url, "https://chat.example.com/api/v4/channels/c%201/posts");
    }
}
