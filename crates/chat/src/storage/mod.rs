//! Storage backends for chat data

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryChatStore;
pub use sqlite::SqliteChatStore;
pub use traits::ChatStore;

use anyhow::Result;

use crate::sync::{EventBatch, SyncEvent};

/// Apply one sync pass's event batch to a store.
///
/// This is the consuming side of the sync routine's single dispatch point:
/// posts are upserted per channel (id-keyed, so overlapping fetch windows
/// deduplicate here) and synced-at events update the per-channel fetch
/// record. The combined event carries nothing the per-channel events did
/// not; it is for consumers that want the cross-channel view in one piece.
pub fn apply_event_batch(store: &dyn ChatStore, batch: &EventBatch) -> Result<()> {
    for event in batch {
        match event {
            SyncEvent::ChannelPosts { posts, .. } => {
                for post in posts {
                    store.upsert_post(post.clone())?;
                }
            }
            SyncEvent::ChannelSynced {
                channel_id,
                synced_at,
            } => {
                store.save_last_fetch_at(channel_id, *synced_at)?;
            }
            SyncEvent::CombinedPosts { .. } => {}
        }
    }
    Ok(())
}
