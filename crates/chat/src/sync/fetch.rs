//! Plan execution against the post-fetching capability
//!
//! Fetches for different channels are independent: each failure is logged
//! and drops only that channel from the pass.

use anyhow::Result;
use log::warn;
use rayon::prelude::*;

use super::aggregate::ChannelFetch;
use super::events::FetchKind;
use super::plan::{SyncMode, SyncPlan};
use crate::models::{ChannelId, Page};

/// Capability for fetching posts from the server.
///
/// The sync pass takes this as an injected collaborator so tests can
/// substitute a canned implementation. `server::ChatClient` is the HTTP
/// implementation.
pub trait PostFetcher: Send + Sync {
    /// Fetch the most recent page of posts for a channel
    fn fetch_posts(&self, channel_id: &ChannelId) -> Result<Page>;

    /// Fetch posts made in a channel since the given time (epoch millis)
    fn fetch_posts_since(&self, channel_id: &ChannelId, since: i64) -> Result<Page>;
}

/// What became of one plan after execution
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    /// The plan was `Skip`; nothing was fetched
    Skipped,
    /// The fetch succeeded
    Fetched(ChannelFetch),
    /// The fetch failed; already logged
    Failed,
}

/// Execute every plan, fanning fetches out across channels.
///
/// The result vector is in plan order regardless of completion order; the
/// aggregator relies on that.
pub(crate) fn execute_plans(fetcher: &dyn PostFetcher, plans: &[SyncPlan]) -> Vec<FetchOutcome> {
    plans
        .par_iter()
        .map(|plan| execute_plan(fetcher, plan))
        .collect()
}

fn execute_plan(fetcher: &dyn PostFetcher, plan: &SyncPlan) -> FetchOutcome {
    let (result, fetch) = match plan.mode {
        SyncMode::Skip => return FetchOutcome::Skipped,
        SyncMode::Full => (fetcher.fetch_posts(&plan.channel_id), FetchKind::Full),
        SyncMode::Incremental { since } => (
            fetcher.fetch_posts_since(&plan.channel_id, since),
            FetchKind::Since,
        ),
    };

    match result {
        Ok(page) => FetchOutcome::Fetched(ChannelFetch {
            channel_id: plan.channel_id.clone(),
            fetch,
            page,
        }),
        Err(e) => {
            warn!(
                "Failed to fetch posts for channel {}: {:#}",
                plan.channel_id.as_str(),
                e
            );
            FetchOutcome::Failed
        }
    }
}
