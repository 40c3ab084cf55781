//! Unread-channel post synchronization
//!
//! One pass over the channels a user belongs to: decide per channel whether
//! posts need fetching (the open channel and read channels are skipped),
//! fetch either a full page or everything since the last trustworthy
//! timestamp, and merge every channel's results into a single event batch
//! the store applies atomically.
//!
//! The pass touches no shared state while running; its only output is the
//! returned [`EventBatch`], so a caller that no longer wants the result can
//! simply drop it.

mod aggregate;
mod events;
mod fetch;
mod plan;
mod timing;

pub use aggregate::{ChannelFetch, aggregate};
pub use events::{EventBatch, FetchKind, SyncEvent};
pub use fetch::PostFetcher;
pub use plan::{SyncMode, SyncPlan, classify, plan_channel, plan_channels};
pub use timing::incremental_since;

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};

use crate::models::{Channel, ChannelId, ChannelMember, is_unread_channel};
use crate::storage::ChatStore;
use fetch::FetchOutcome;

/// Read-only client state a sync pass runs against
#[derive(Debug, Clone, Default)]
pub struct SyncContext {
    /// The channel currently open in the client, if any; it is excluded
    /// from the pass
    pub current_channel_id: Option<ChannelId>,
    /// When the realtime connection was last (re)established (epoch millis)
    pub last_connect_at: i64,
}

/// Statistics from one sync pass
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Number of channels supplied to the pass
    pub channels_considered: usize,
    /// Number of channels classified as not needing a fetch
    pub channels_skipped: usize,
    /// Number of channels fetched successfully
    pub channels_fetched: usize,
    /// Number of channels whose fetch failed
    pub fetch_failures: usize,
    /// Total posts fetched across all channels
    pub posts_fetched: usize,
    /// Duration of the pass
    pub duration_ms: u64,
}

/// Result of one sync pass: the batch to apply (if anything was eligible)
/// plus bookkeeping numbers.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Events to hand to the store, or `None` when no channel was eligible
    pub batch: Option<EventBatch>,
    pub stats: SyncStats,
}

/// Sync posts for every unread channel, using the default unread predicate.
///
/// See [`sync_unread_channels_with`] for the full contract.
pub fn sync_unread_channels(
    fetcher: &dyn PostFetcher,
    store: &dyn ChatStore,
    channels: &[Channel],
    members: &[ChannelMember],
    ctx: &SyncContext,
) -> Result<SyncOutcome> {
    sync_unread_channels_with(fetcher, store, channels, members, ctx, is_unread_channel)
}

/// Sync posts for every unread channel.
///
/// Channels are classified against `is_unread` (the open channel is always
/// skipped), eligible channels are fetched fully or incrementally depending
/// on what the store already knows, and the results are merged into one
/// [`EventBatch`] in channel-input order. A fetch failure drops only that
/// channel. When no channel is eligible the outcome carries no batch and no
/// events.
///
/// # Arguments
/// * `fetcher` - Post-fetching capability (the HTTP client in production)
/// * `store` - Local store consulted for known posts and fetch bookkeeping
/// * `channels` - Candidate channels, in the order events should come out
/// * `members` - The user's membership records for those channels
/// * `ctx` - Current-channel and connection state
/// * `is_unread` - Unread predicate applied during classification
pub fn sync_unread_channels_with<F>(
    fetcher: &dyn PostFetcher,
    store: &dyn ChatStore,
    channels: &[Channel],
    members: &[ChannelMember],
    ctx: &SyncContext,
    is_unread: F,
) -> Result<SyncOutcome>
where
    F: Fn(&Channel, Option<&ChannelMember>) -> bool,
{
    let start = std::time::Instant::now();
    let mut stats = SyncStats {
        channels_considered: channels.len(),
        ..SyncStats::default()
    };

    let plans = plan_channels(channels, members, store, ctx, &is_unread)?;
    let outcomes = fetch::execute_plans(fetcher, &plans);

    let mut results = Vec::new();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Skipped => stats.channels_skipped += 1,
            FetchOutcome::Failed => stats.fetch_failures += 1,
            FetchOutcome::Fetched(result) => {
                stats.posts_fetched += result.page.len();
                results.push(result);
            }
        }
    }
    stats.channels_fetched = results.len();

    let batch = aggregate(results, Utc::now().timestamp_millis());
    stats.duration_ms = start.elapsed().as_millis() as u64;

    match &batch {
        Some(batch) => info!(
            "Synced {} unread channels: {} posts, {} events ({} failures)",
            stats.channels_fetched,
            stats.posts_fetched,
            batch.len(),
            stats.fetch_failures
        ),
        None => debug!(
            "No unread channels to sync ({} considered)",
            stats.channels_considered
        ),
    }

    Ok(SyncOutcome { batch, stats })
}
