//! Result aggregation
//!
//! Merges every channel's fetched page into one event batch: two events per
//! channel (posts, then synced-at bookkeeping) in the order channels entered
//! the pass, closed by exactly one combined event carrying all posts.

use log::error;
use std::collections::HashSet;

use super::events::{EventBatch, FetchKind, SyncEvent};
use crate::models::{ChannelId, Page};

/// A successful fetch for one channel
#[derive(Debug)]
pub struct ChannelFetch {
    pub channel_id: ChannelId,
    pub fetch: FetchKind,
    pub page: Page,
}

/// Build the event batch for a sync pass.
///
/// Results must be in original channel-input order. Every result contributes
/// a posts event and a synced-at event, even when its page is empty; the
/// combined event is always last. With no results at all the pass emits no
/// events, so the return is `None` rather than a batch holding a lone empty
/// combined event.
///
/// A duplicate channel id in the input is a caller bug: it panics under
/// debug assertions and is dropped (first occurrence kept) in release.
pub fn aggregate(results: Vec<ChannelFetch>, synced_at: i64) -> Option<EventBatch> {
    if results.is_empty() {
        return None;
    }

    let mut seen: HashSet<ChannelId> = HashSet::with_capacity(results.len());
    let mut events = Vec::with_capacity(results.len() * 2 + 1);
    let mut combined = Vec::new();

    for result in results {
        if !seen.insert(result.channel_id.clone()) {
            debug_assert!(
                false,
                "duplicate channel {} in aggregation input",
                result.channel_id.as_str()
            );
            error!(
                "Duplicate channel {} in aggregation input, dropping",
                result.channel_id.as_str()
            );
            continue;
        }

        combined.extend(result.page.posts.iter().cloned());
        events.push(SyncEvent::ChannelPosts {
            channel_id: result.channel_id.clone(),
            posts: result.page.posts,
            fetch: result.fetch,
        });
        events.push(SyncEvent::ChannelSynced {
            channel_id: result.channel_id,
            synced_at,
        });
    }

    events.push(SyncEvent::CombinedPosts { posts: combined });
    Some(EventBatch::new(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, PostId};

    fn make_post(id: &str, channel_id: &str) -> Post {
        Post::builder(PostId::new(id), ChannelId::new(channel_id))
            .user_id("u1")
            .message(format!("message {}", id))
            .create_at(1_000)
            .build()
    }

    fn make_fetch(channel_id: &str, fetch: FetchKind, post_ids: &[&str]) -> ChannelFetch {
        ChannelFetch {
            channel_id: ChannelId::new(channel_id),
            fetch,
            page: Page::new(post_ids.iter().map(|id| make_post(id, channel_id)).collect()),
        }
    }

    #[test]
    fn test_no_results_no_events() {
        assert!(aggregate(Vec::new(), 1_000).is_none());
    }

    #[test]
    fn test_two_events_per_channel_plus_combined() {
        let results = vec![
            make_fetch("c1", FetchKind::Full, &["p1", "p2"]),
            make_fetch("c2", FetchKind::Full, &["p3", "p4"]),
            make_fetch("c3", FetchKind::Full, &["p5", "p6"]),
        ];

        let batch = aggregate(results, 9_000).unwrap();
        assert_eq!(batch.len(), 2 * 3 + 1);

        let posts_events = batch
            .events()
            .iter()
            .filter(|e| matches!(e, SyncEvent::ChannelPosts { fetch: FetchKind::Full, .. }))
            .count();
        assert_eq!(posts_events, 3);

        let synced_events = batch
            .events()
            .iter()
            .filter(|e| matches!(e, SyncEvent::ChannelSynced { synced_at: 9_000, .. }))
            .count();
        assert_eq!(synced_events, 3);

        assert_eq!(batch.combined_posts().unwrap().len(), 6);
    }

    #[test]
    fn test_empty_page_still_contributes_events() {
        let results = vec![make_fetch("c1", FetchKind::Since, &[])];

        let batch = aggregate(results, 9_000).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(batch.combined_posts().unwrap().is_empty());
    }

    #[test]
    fn test_combined_preserves_channel_then_page_order() {
        let results = vec![
            make_fetch("c2", FetchKind::Full, &["p3", "p4"]),
            make_fetch("c1", FetchKind::Since, &["p1", "p2"]),
        ];

        let batch = aggregate(results, 9_000).unwrap();

        // Combined event is last and concatenates pages in input order
        let combined = batch.combined_posts().unwrap();
        let ids: Vec<&str> = combined.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p4", "p1", "p2"]);

        // Per-channel events come in input order too
        match &batch.events()[0] {
            SyncEvent::ChannelPosts { channel_id, fetch, .. } => {
                assert_eq!(channel_id.as_str(), "c2");
                assert_eq!(*fetch, FetchKind::Full);
            }
            other => panic!("unexpected first event: {:?}", other),
        }
        match &batch.events()[2] {
            SyncEvent::ChannelPosts { channel_id, fetch, .. } => {
                assert_eq!(channel_id.as_str(), "c1");
                assert_eq!(*fetch, FetchKind::Since);
            }
            other => panic!("unexpected third event: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_kind_carried_through() {
        let results = vec![make_fetch("c1", FetchKind::Since, &["p1"])];
        let batch = aggregate(results, 9_000).unwrap();

        assert!(matches!(
            &batch.events()[0],
            SyncEvent::ChannelPosts { fetch: FetchKind::Since, .. }
        ));
    }

    #[test]
    #[should_panic(expected = "duplicate channel")]
    fn test_duplicate_channel_panics_under_debug_assertions() {
        let results = vec![
            make_fetch("c1", FetchKind::Full, &["p1"]),
            make_fetch("c1", FetchKind::Full, &["p2"]),
        ];
        let _ = aggregate(results, 9_000);
    }
}
