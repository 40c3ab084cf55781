//! Per-channel sync decisions
//!
//! Classification decides whether a channel needs syncing at all; strategy
//! selection decides how to fetch. The store is only consulted for channels
//! that survive classification.

use anyhow::Result;
use std::collections::HashMap;

use super::SyncContext;
use super::timing::incremental_since;
use crate::models::{Channel, ChannelId, ChannelMember};
use crate::storage::ChatStore;

/// How a channel will be fetched in this pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Channel is ineligible; contributes nothing to the pass
    Skip,
    /// Fetch the most recent page unconditionally
    Full,
    /// Fetch posts since the given timestamp (epoch millis)
    Incremental { since: i64 },
}

/// The fetch decision for one channel. One plan exists per input channel.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub channel_id: ChannelId,
    pub mode: SyncMode,
}

/// Decide whether a channel is eligible for this sync pass.
///
/// The currently open channel is excluded (it is kept current through the
/// live connection, not this batch routine), as is any channel the unread
/// predicate rejects.
pub fn classify<F>(
    channel: &Channel,
    current_channel_id: Option<&ChannelId>,
    member: Option<&ChannelMember>,
    is_unread: &F,
) -> bool
where
    F: Fn(&Channel, Option<&ChannelMember>) -> bool,
{
    if current_channel_id == Some(&channel.id) {
        return false;
    }
    is_unread(channel, member)
}

/// Build the sync plan for one channel.
///
/// Eligible channels with no locally known posts, or no recorded fetch time,
/// get a full fetch. Otherwise the fetch is incremental since the later of
/// the last fetch and the last reconnect.
pub fn plan_channel<F>(
    channel: &Channel,
    member: Option<&ChannelMember>,
    store: &dyn ChatStore,
    ctx: &SyncContext,
    is_unread: &F,
) -> Result<SyncPlan>
where
    F: Fn(&Channel, Option<&ChannelMember>) -> bool,
{
    if !classify(channel, ctx.current_channel_id.as_ref(), member, is_unread) {
        return Ok(SyncPlan {
            channel_id: channel.id.clone(),
            mode: SyncMode::Skip,
        });
    }

    // Store lookups happen only past this point, so skipped channels cost
    // nothing.
    let known_post_ids = store.post_ids_in_channel(&channel.id)?;
    let last_fetch_at = store.last_fetch_at(&channel.id)?;

    let mode = match last_fetch_at {
        Some(fetched_at) if !known_post_ids.is_empty() => SyncMode::Incremental {
            since: incremental_since(fetched_at, ctx.last_connect_at),
        },
        _ => SyncMode::Full,
    };

    Ok(SyncPlan {
        channel_id: channel.id.clone(),
        mode,
    })
}

/// Build sync plans for every input channel, in input order.
pub fn plan_channels<F>(
    channels: &[Channel],
    members: &[ChannelMember],
    store: &dyn ChatStore,
    ctx: &SyncContext,
    is_unread: &F,
) -> Result<Vec<SyncPlan>>
where
    F: Fn(&Channel, Option<&ChannelMember>) -> bool,
{
    let member_index: HashMap<&ChannelId, &ChannelMember> =
        members.iter().map(|m| (&m.channel_id, m)).collect();

    channels
        .iter()
        .map(|channel| {
            let member = member_index.get(&channel.id).copied();
            plan_channel(channel, member, store, ctx, is_unread)
        })
        .collect()
}
