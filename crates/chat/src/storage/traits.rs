//! Storage trait definitions

use crate::models::{Channel, ChannelId, Post, PostId};
use anyhow::Result;

/// Trait for chat storage operations
///
/// Abstracts over storage backends (in-memory, SQLite) and provides the
/// operations the sync pass and query layers need: channel and post CRUD
/// plus per-channel fetch bookkeeping.
pub trait ChatStore: Send + Sync {
    /// Insert or update a channel
    fn upsert_channel(&self, channel: Channel) -> Result<()>;

    /// Get a channel by ID
    fn get_channel(&self, id: &ChannelId) -> Result<Option<Channel>>;

    /// Insert or update a post, keyed by post ID
    fn upsert_post(&self, post: Post) -> Result<()>;

    /// Get a post by ID
    fn get_post(&self, id: &PostId) -> Result<Option<Post>>;

    /// Check if a post exists
    fn has_post(&self, id: &PostId) -> Result<bool>;

    /// IDs of every locally known post in a channel
    fn post_ids_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<PostId>>;

    /// Posts in a channel, ordered by create_at ascending
    fn posts_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<Post>>;

    /// Count posts in a channel
    fn count_posts_in_channel(&self, channel_id: &ChannelId) -> Result<usize>;

    /// When posts were last fetched for a channel (epoch millis), if ever
    fn last_fetch_at(&self, channel_id: &ChannelId) -> Result<Option<i64>>;

    /// Record when posts were last fetched for a channel
    fn save_last_fetch_at(&self, channel_id: &ChannelId, fetched_at: i64) -> Result<()>;

    /// Clear all data (for testing)
    fn clear(&self) -> Result<()>;
}
