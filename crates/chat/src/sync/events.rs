//! Sync events and the batch handed to the store
//!
//! A sync pass produces a single [`EventBatch`]: per-channel events followed
//! by one combined event. The batch is an immutable value; whoever consumes
//! it (see `storage::apply_event_batch`) applies it in one step, so a pass
//! commits at most once.

use crate::models::{ChannelId, Post};

/// How a channel's posts were fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// Unconditional fetch of the most recent page
    Full,
    /// Fetch of posts since a timestamp
    Since,
}

/// A single event produced by a sync pass
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// Posts fetched for one channel, typed by how they were fetched
    ChannelPosts {
        channel_id: ChannelId,
        posts: Vec<Post>,
        fetch: FetchKind,
    },
    /// Bookkeeping: the channel was synced at the given time (epoch millis)
    ChannelSynced {
        channel_id: ChannelId,
        synced_at: i64,
    },
    /// Every fetched post across all channels, in channel-then-page order.
    /// Always the last event in a batch.
    CombinedPosts { posts: Vec<Post> },
}

/// The ordered set of events from one sync pass, applied atomically
#[derive(Debug, Clone, Default)]
pub struct EventBatch {
    events: Vec<SyncEvent>,
}

impl EventBatch {
    pub(crate) fn new(events: Vec<SyncEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The combined event's posts, if the batch has one
    pub fn combined_posts(&self) -> Option<&[Post]> {
        match self.events.last() {
            Some(SyncEvent::CombinedPosts { posts }) => Some(posts),
            _ => None,
        }
    }
}

impl IntoIterator for EventBatch {
    type Item = SyncEvent;
    type IntoIter = std::vec::IntoIter<SyncEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a SyncEvent;
    type IntoIter = std::slice::Iter<'a, SyncEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
