//! In-memory storage implementation
//!
//! Used for testing and as the backend before a device database is attached.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::ChatStore;
use crate::models::{Channel, ChannelId, Post, PostId};

/// In-memory implementation of ChatStore
///
/// HashMaps protected by RwLocks for thread-safe access.
pub struct InMemoryChatStore {
    channels: RwLock<HashMap<String, Channel>>,
    posts: RwLock<HashMap<String, Post>>,
    /// channel id -> set of post ids in that channel
    channel_posts: RwLock<HashMap<String, HashSet<String>>>,
    /// channel id -> last successful fetch (epoch millis)
    fetch_records: RwLock<HashMap<String, i64>>,
}

impl InMemoryChatStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            channel_posts: RwLock::new(HashMap::new()),
            fetch_records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatStore for InMemoryChatStore {
    fn upsert_channel(&self, channel: Channel) -> Result<()> {
        let mut channels = self.channels.write().unwrap();
        channels.insert(channel.id.0.clone(), channel);
        Ok(())
    }

    fn get_channel(&self, id: &ChannelId) -> Result<Option<Channel>> {
        let channels = self.channels.read().unwrap();
        Ok(channels.get(&id.0).cloned())
    }

    fn upsert_post(&self, post: Post) -> Result<()> {
        let post_id = post.id.0.clone();
        let channel_id = post.channel_id.0.clone();

        let mut posts = self.posts.write().unwrap();
        posts.insert(post_id.clone(), post);

        let mut channel_posts = self.channel_posts.write().unwrap();
        channel_posts.entry(channel_id).or_default().insert(post_id);

        Ok(())
    }

    fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        let posts = self.posts.read().unwrap();
        Ok(posts.get(&id.0).cloned())
    }

    fn has_post(&self, id: &PostId) -> Result<bool> {
        let posts = self.posts.read().unwrap();
        Ok(posts.contains_key(&id.0))
    }

    fn post_ids_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<PostId>> {
        let channel_posts = self.channel_posts.read().unwrap();
        let ids = channel_posts
            .get(&channel_id.0)
            .map(|set| set.iter().map(PostId::new).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    fn posts_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<Post>> {
        let channel_posts = self.channel_posts.read().unwrap();
        let posts = self.posts.read().unwrap();

        let mut result = Vec::new();
        if let Some(post_ids) = channel_posts.get(&channel_id.0) {
            for post_id in post_ids {
                if let Some(post) = posts.get(post_id) {
                    result.push(post.clone());
                }
            }
        }

        // Sort by create_at ascending
        result.sort_by_key(|p| p.create_at);

        Ok(result)
    }

    fn count_posts_in_channel(&self, channel_id: &ChannelId) -> Result<usize> {
        let channel_posts = self.channel_posts.read().unwrap();
        Ok(channel_posts
            .get(&channel_id.0)
            .map(|s| s.len())
            .unwrap_or(0))
    }

    fn last_fetch_at(&self, channel_id: &ChannelId) -> Result<Option<i64>> {
        let fetch_records = self.fetch_records.read().unwrap();
        Ok(fetch_records.get(&channel_id.0).copied())
    }

    fn save_last_fetch_at(&self, channel_id: &ChannelId, fetched_at: i64) -> Result<()> {
        let mut fetch_records = self.fetch_records.write().unwrap();
        fetch_records.insert(channel_id.0.clone(), fetched_at);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.channels.write().unwrap().clear();
        self.posts.write().unwrap().clear();
        self.channel_posts.write().unwrap().clear();
        self.fetch_records.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_channel(id: &str) -> Channel {
        Channel::new(ChannelId::new(id), id, id.to_uppercase(), 0, 0)
    }

    fn make_post(id: &str, channel_id: &str, create_at: i64) -> Post {
        Post::builder(PostId::new(id), ChannelId::new(channel_id))
            .user_id("u1")
            .message(format!("message {}", id))
            .create_at(create_at)
            .build()
    }

    #[test]
    fn test_upsert_and_get_channel() {
        let store = InMemoryChatStore::new();
        store.upsert_channel(make_channel("c1")).unwrap();

        let channel = store.get_channel(&ChannelId::new("c1")).unwrap();
        assert!(channel.is_some());
        assert_eq!(channel.unwrap().name, "c1");
    }

    #[test]
    fn test_upsert_and_get_post() {
        let store = InMemoryChatStore::new();

        assert!(!store.has_post(&PostId::new("p1")).unwrap());
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        assert!(store.has_post(&PostId::new("p1")).unwrap());

        let post = store.get_post(&PostId::new("p1")).unwrap().unwrap();
        assert_eq!(post.channel_id.as_str(), "c1");
    }

    #[test]
    fn test_upsert_post_is_idempotent() {
        let store = InMemoryChatStore::new();

        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();

        assert_eq!(store.count_posts_in_channel(&ChannelId::new("c1")).unwrap(), 1);
    }

    #[test]
    fn test_posts_in_channel_sorted() {
        let store = InMemoryChatStore::new();

        store.upsert_post(make_post("p2", "c1", 200)).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.upsert_post(make_post("p3", "c2", 50)).unwrap();

        let posts = store.posts_in_channel(&ChannelId::new("c1")).unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id.as_str(), "p1");
        assert_eq!(posts[1].id.as_str(), "p2");
    }

    #[test]
    fn test_post_ids_in_channel() {
        let store = InMemoryChatStore::new();

        assert!(store.post_ids_in_channel(&ChannelId::new("c1")).unwrap().is_empty());

        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.upsert_post(make_post("p2", "c1", 200)).unwrap();

        let mut ids: Vec<String> = store
            .post_ids_in_channel(&ChannelId::new("c1"))
            .unwrap()
            .into_iter()
            .map(|id| id.0)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_fetch_record_roundtrip() {
        let store = InMemoryChatStore::new();
        let channel_id = ChannelId::new("c1");

        assert!(store.last_fetch_at(&channel_id).unwrap().is_none());

        store.save_last_fetch_at(&channel_id, 5_000).unwrap();
        assert_eq!(store.last_fetch_at(&channel_id).unwrap(), Some(5_000));

        store.save_last_fetch_at(&channel_id, 6_000).unwrap();
        assert_eq!(store.last_fetch_at(&channel_id).unwrap(), Some(6_000));
    }

    #[test]
    fn test_clear() {
        let store = InMemoryChatStore::new();

        store.upsert_channel(make_channel("c1")).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.save_last_fetch_at(&ChannelId::new("c1"), 5_000).unwrap();

        store.clear().unwrap();

        assert!(store.get_channel(&ChannelId::new("c1")).unwrap().is_none());
        assert!(!store.has_post(&PostId::new("p1")).unwrap());
        assert!(store.last_fetch_at(&ChannelId::new("c1")).unwrap().is_none());
    }
}
