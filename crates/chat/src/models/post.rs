//! Post model and fetched-page container

use super::ChannelId;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a post (server post ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single post within a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Server post ID
    pub id: PostId,
    /// Channel the post was made in
    pub channel_id: ChannelId,
    /// Author of the post
    pub user_id: String,
    /// Message text
    pub message: String,
    /// When the post was created (epoch millis)
    pub create_at: i64,
}

impl Post {
    /// Create a new post builder
    pub fn builder(id: PostId, channel_id: ChannelId) -> PostBuilder {
        PostBuilder::new(id, channel_id)
    }

    /// Creation time as a UTC datetime
    pub fn created_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.create_at)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// Builder for creating Post instances
pub struct PostBuilder {
    id: PostId,
    channel_id: ChannelId,
    user_id: String,
    message: String,
    create_at: Option<i64>,
}

impl PostBuilder {
    fn new(id: PostId, channel_id: ChannelId) -> Self {
        Self {
            id,
            channel_id,
            user_id: String::new(),
            message: String::new(),
            create_at: None,
        }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn create_at(mut self, create_at: i64) -> Self {
        self.create_at = Some(create_at);
        self
    }

    pub fn build(self) -> Post {
        Post {
            id: self.id,
            channel_id: self.channel_id,
            user_id: self.user_id,
            message: self.message,
            create_at: self
                .create_at
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        }
    }
}

/// One fetched page of posts for a channel, in server-provided order
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Posts in the order the server returned them
    pub posts: Vec<Post>,
}

impl Page {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }
}
