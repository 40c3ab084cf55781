//! Timestamp selection for incremental fetches
//!
//! Pure functions that can be tested without store or network dependencies.

/// Pick the "since" bound for an incremental fetch.
///
/// Returns the later of the channel's last recorded fetch and the time the
/// realtime connection was last (re)established. A fetch timestamp that
/// predates the most recent reconnect cannot be trusted: posts delivered over
/// the old connection may never have arrived. Taking the later bound may
/// re-fetch a small overlapping window; the store deduplicates by post ID.
///
/// # Arguments
/// * `last_fetch_at` - When posts were last fetched for the channel (epoch millis)
/// * `last_connect_at` - When the realtime connection was last established (epoch millis)
pub fn incremental_since(last_fetch_at: i64, last_connect_at: i64) -> i64 {
    last_fetch_at.max(last_connect_at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_fetch_time_when_no_reconnect_since() {
        // Fetched after the connection was established
        assert_eq!(incremental_since(2_000, 1_000), 2_000);
    }

    #[test]
    fn test_uses_connect_time_after_reconnect() {
        // Reconnected after the last fetch, so the fetch time is stale
        assert_eq!(incremental_since(1_000, 2_000), 2_000);
    }

    #[test]
    fn test_equal_timestamps() {
        assert_eq!(incremental_since(1_500, 1_500), 1_500);
    }

    #[test]
    fn test_zero_connect_time() {
        // Never connected in this session
        assert_eq!(incremental_since(1_000, 0), 1_000);
    }
}
