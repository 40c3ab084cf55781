//! Chat crate - Business logic for the messaging client
//!
//! This crate provides platform-independent chat functionality including:
//! - Domain models (Channel, ChannelMember, Post)
//! - Chat server REST client
//! - Storage trait abstractions (in-memory and SQLite backends)
//! - The unread-channel post synchronization routine
//!
//! This crate has zero UI dependencies.

pub mod config;
pub mod models;
pub mod server;
pub mod storage;
pub mod sync;

pub use config::ServerCredentials;
pub use models::{Channel, ChannelId, ChannelMember, Page, Post, PostId, is_unread_channel};
pub use server::{ChatClient, SessionExpiredError};
pub use storage::{ChatStore, InMemoryChatStore, SqliteChatStore, apply_event_batch};
pub use sync::{
    // Sync execution
    PostFetcher, SyncContext, SyncOutcome, SyncStats, sync_unread_channels,
    sync_unread_channels_with,
    // Sync decision (per-channel planning)
    SyncMode, SyncPlan, classify, plan_channel, plan_channels,
    // Events
    EventBatch, FetchKind, SyncEvent,
    // Timing
    incremental_since,
};
