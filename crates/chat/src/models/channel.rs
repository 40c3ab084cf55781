//! Channel and membership models

use serde::{Deserialize, Serialize};

/// Unique identifier for a channel (server channel ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChannelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A channel the user belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Server channel ID
    pub id: ChannelId,
    /// URL-safe channel name
    pub name: String,
    /// Human-readable channel name
    #[serde(default)]
    pub display_name: String,
    /// Total number of posts ever made in the channel
    #[serde(default)]
    pub total_msg_count: i64,
    /// When the most recent post was made (epoch millis), 0 if none
    #[serde(default)]
    pub last_post_at: i64,
}

impl Channel {
    /// Create a new channel with the given properties
    pub fn new(
        id: ChannelId,
        name: impl Into<String>,
        display_name: impl Into<String>,
        total_msg_count: i64,
        last_post_at: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: display_name.into(),
            total_msg_count,
            last_post_at,
        }
    }
}

/// Per-user membership record for a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMember {
    /// Channel this membership belongs to
    pub channel_id: ChannelId,
    /// User holding the membership
    pub user_id: String,
    /// Number of posts in the channel the member has read
    #[serde(default)]
    pub msg_count: i64,
    /// Number of unread mentions of the member
    #[serde(default)]
    pub mention_count: i64,
    /// When the member last viewed the channel (epoch millis)
    #[serde(default)]
    pub last_viewed_at: i64,
    /// Whether the member has muted the channel
    #[serde(default)]
    pub muted: bool,
}

impl ChannelMember {
    /// Create a fresh membership with no read progress
    pub fn new(channel_id: ChannelId, user_id: impl Into<String>) -> Self {
        Self {
            channel_id,
            user_id: user_id.into(),
            msg_count: 0,
            mention_count: 0,
            last_viewed_at: 0,
            muted: false,
        }
    }
}

/// Default unread predicate.
///
/// A channel counts as unread for a member when the membership exists, is not
/// muted, and either carries pending mentions or the channel holds more posts
/// than the member has read. A missing membership means "not unread".
pub fn is_unread_channel(channel: &Channel, member: Option<&ChannelMember>) -> bool {
    match member {
        Some(m) if !m.muted => m.mention_count > 0 || channel.total_msg_count > m.msg_count,
        _ => false,
    }
}
