//! SQLite-based chat storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::ChatStore;
use crate::models::{Channel, ChannelId, Post, PostId};

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Channels the user belongs to
            CREATE TABLE channels (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                display_name TEXT NOT NULL DEFAULT '',
                total_msg_count INTEGER NOT NULL DEFAULT 0,
                last_post_at INTEGER NOT NULL DEFAULT 0
            );

            -- Posts, keyed by server post ID. A post may arrive before its
            -- channel row, so there is no foreign key to channels.
            CREATE TABLE posts (
                id TEXT PRIMARY KEY,
                channel_id TEXT NOT NULL,
                user_id TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL DEFAULT '',
                create_at INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX idx_posts_channel_create_at
                ON posts(channel_id, create_at ASC);

            -- Per-channel fetch bookkeeping
            CREATE TABLE channel_sync (
                channel_id TEXT PRIMARY KEY,
                last_fetch_at INTEGER NOT NULL
            );
            "#,
        ),
    ])
}

/// SQLite implementation of ChatStore
///
/// The connection is behind a Mutex; one writer at a time is enough for a
/// single client process.
pub struct SqliteChatStore {
    conn: Mutex<Connection>,
}

impl SqliteChatStore {
    /// Open (or create) a store at the given path and apply migrations
    pub fn new(path: &Path) -> Result<Self> {
        let mut conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        migrations()
            .to_latest(&mut conn)
            .context("Failed to apply database migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for tests)
    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        migrations()
            .to_latest(&mut conn)
            .context("Failed to apply database migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: PostId::new(row.get::<_, String>(0)?),
            channel_id: ChannelId::new(row.get::<_, String>(1)?),
            user_id: row.get(2)?,
            message: row.get(3)?,
            create_at: row.get(4)?,
        })
    }
}

impl ChatStore for SqliteChatStore {
    fn upsert_channel(&self, channel: Channel) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO channels (id, name, display_name, total_msg_count, last_post_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                display_name = excluded.display_name,
                total_msg_count = excluded.total_msg_count,
                last_post_at = excluded.last_post_at
            "#,
            params![
                channel.id.as_str(),
                channel.name,
                channel.display_name,
                channel.total_msg_count,
                channel.last_post_at,
            ],
        )
        .context("Failed to upsert channel")?;
        Ok(())
    }

    fn get_channel(&self, id: &ChannelId) -> Result<Option<Channel>> {
        let conn = self.conn.lock().unwrap();
        let channel = conn
            .query_row(
                "SELECT id, name, display_name, total_msg_count, last_post_at
                 FROM channels WHERE id = ?1",
                params![id.as_str()],
                |row| {
                    Ok(Channel {
                        id: ChannelId::new(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                        display_name: row.get(2)?,
                        total_msg_count: row.get(3)?,
                        last_post_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .context("Failed to query channel")?;
        Ok(channel)
    }

    fn upsert_post(&self, post: Post) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO posts (id, channel_id, user_id, message, create_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                channel_id = excluded.channel_id,
                user_id = excluded.user_id,
                message = excluded.message,
                create_at = excluded.create_at
            "#,
            params![
                post.id.as_str(),
                post.channel_id.as_str(),
                post.user_id,
                post.message,
                post.create_at,
            ],
        )
        .context("Failed to upsert post")?;
        Ok(())
    }

    fn get_post(&self, id: &PostId) -> Result<Option<Post>> {
        let conn = self.conn.lock().unwrap();
        let post = conn
            .query_row(
                "SELECT id, channel_id, user_id, message, create_at
                 FROM posts WHERE id = ?1",
                params![id.as_str()],
                Self::row_to_post,
            )
            .optional()
            .context("Failed to query post")?;
        Ok(post)
    }

    fn has_post(&self, id: &PostId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM posts WHERE id = ?1",
                params![id.as_str()],
                |row| row.get(0),
            )
            .context("Failed to count posts")?;
        Ok(count > 0)
    }

    fn post_ids_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<PostId>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT id FROM posts WHERE channel_id = ?1")
            .context("Failed to prepare post id query")?;
        let ids = stmt
            .query_map(params![channel_id.as_str()], |row| {
                Ok(PostId::new(row.get::<_, String>(0)?))
            })
            .context("Failed to query post ids")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read post ids")?;
        Ok(ids)
    }

    fn posts_in_channel(&self, channel_id: &ChannelId) -> Result<Vec<Post>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT id, channel_id, user_id, message, create_at
                 FROM posts WHERE channel_id = ?1 ORDER BY create_at ASC",
            )
            .context("Failed to prepare post query")?;
        let posts = stmt
            .query_map(params![channel_id.as_str()], Self::row_to_post)
            .context("Failed to query posts")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read posts")?;
        Ok(posts)
    }

    fn count_posts_in_channel(&self, channel_id: &ChannelId) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM posts WHERE channel_id = ?1",
                params![channel_id.as_str()],
                |row| row.get(0),
            )
            .context("Failed to count posts")?;
        Ok(count as usize)
    }

    fn last_fetch_at(&self, channel_id: &ChannelId) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let fetched_at = conn
            .query_row(
                "SELECT last_fetch_at FROM channel_sync WHERE channel_id = ?1",
                params![channel_id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query fetch record")?;
        Ok(fetched_at)
    }

    fn save_last_fetch_at(&self, channel_id: &ChannelId, fetched_at: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO channel_sync (channel_id, last_fetch_at)
            VALUES (?1, ?2)
            ON CONFLICT(channel_id) DO UPDATE SET last_fetch_at = excluded.last_fetch_at
            "#,
            params![channel_id.as_str(), fetched_at],
        )
        .context("Failed to save fetch record")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "DELETE FROM posts;
             DELETE FROM channels;
             DELETE FROM channel_sync;",
        )
        .context("Failed to clear store")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_channel(id: &str) -> Channel {
        Channel::new(ChannelId::new(id), id, id.to_uppercase(), 3, 1_000)
    }

    fn make_post(id: &str, channel_id: &str, create_at: i64) -> Post {
        Post::builder(PostId::new(id), ChannelId::new(channel_id))
            .user_id("u1")
            .message(format!("message {}", id))
            .create_at(create_at)
            .build()
    }

    #[test]
    fn test_migrations_are_valid() {
        migrations().validate().unwrap();
    }

    #[test]
    fn test_channel_roundtrip() {
        let store = SqliteChatStore::in_memory().unwrap();
        store.upsert_channel(make_channel("c1")).unwrap();

        let channel = store.get_channel(&ChannelId::new("c1")).unwrap().unwrap();
        assert_eq!(channel.name, "c1");
        assert_eq!(channel.total_msg_count, 3);

        // Upsert updates in place
        let mut updated = make_channel("c1");
        updated.total_msg_count = 7;
        store.upsert_channel(updated).unwrap();
        let channel = store.get_channel(&ChannelId::new("c1")).unwrap().unwrap();
        assert_eq!(channel.total_msg_count, 7);
    }

    #[test]
    fn test_post_roundtrip_and_ordering() {
        let store = SqliteChatStore::in_memory().unwrap();

        store.upsert_post(make_post("p2", "c1", 200)).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.upsert_post(make_post("p3", "c2", 50)).unwrap();

        assert!(store.has_post(&PostId::new("p1")).unwrap());
        assert_eq!(store.count_posts_in_channel(&ChannelId::new("c1")).unwrap(), 2);

        let posts = store.posts_in_channel(&ChannelId::new("c1")).unwrap();
        assert_eq!(posts[0].id.as_str(), "p1");
        assert_eq!(posts[1].id.as_str(), "p2");
    }

    #[test]
    fn test_duplicate_post_upsert_deduplicates() {
        let store = SqliteChatStore::in_memory().unwrap();

        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();

        assert_eq!(store.count_posts_in_channel(&ChannelId::new("c1")).unwrap(), 1);
    }

    #[test]
    fn test_fetch_record_roundtrip() {
        let store = SqliteChatStore::in_memory().unwrap();
        let channel_id = ChannelId::new("c1");

        assert!(store.last_fetch_at(&channel_id).unwrap().is_none());
        store.save_last_fetch_at(&channel_id, 5_000).unwrap();
        assert_eq!(store.last_fetch_at(&channel_id).unwrap(), Some(5_000));
        store.save_last_fetch_at(&channel_id, 6_000).unwrap();
        assert_eq!(store.last_fetch_at(&channel_id).unwrap(), Some(6_000));
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.db");

        let store = SqliteChatStore::new(&path).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        drop(store);

        // Reopen and verify persistence
        let store = SqliteChatStore::new(&path).unwrap();
        assert!(store.has_post(&PostId::new("p1")).unwrap());
    }

    #[test]
    fn test_clear() {
        let store = SqliteChatStore::in_memory().unwrap();
        store.upsert_channel(make_channel("c1")).unwrap();
        store.upsert_post(make_post("p1", "c1", 100)).unwrap();
        store.save_last_fetch_at(&ChannelId::new("c1"), 5_000).unwrap();

        store.clear().unwrap();

        assert!(store.get_channel(&ChannelId::new("c1")).unwrap().is_none());
        assert!(!store.has_post(&PostId::new("p1")).unwrap());
        assert!(store.last_fetch_at(&ChannelId::new("c1")).unwrap().is_none());
    }
}
