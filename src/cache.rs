use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::models::Comment;

/// Video-keyed persistent store of fetched comments. This is a correctness
/// cache, not a bounded one: entries are only ever replaced wholesale by
/// `put`, never merged, so a re-fetch can never leave duplicates behind.
pub trait CommentCache: Send + Sync {
    fn get(&self, video_id: &str) -> Result<Option<Vec<Comment>>>;
    /// Replaces the full comment set for the video. Last write wins.
    fn put(&self, video_id: &str, comments: &[Comment]) -> Result<()>;
    /// Whether the cached entry (if any) is younger than `max_age`.
    fn is_fresh(&self, video_id: &str, max_age: Duration) -> Result<bool>;
}

/// SQLite-backed cache: one row per comment keyed by (video_id, comment_id),
/// plus the fetch timestamp used for freshness checks.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS comments (
                video_id     TEXT NOT NULL,
                comment_id   TEXT NOT NULL,
                text         TEXT NOT NULL,
                author       TEXT NOT NULL,
                like_count   INTEGER NOT NULL,
                published_at TEXT NOT NULL,
                parent_id    TEXT,
                fetched_at   TEXT NOT NULL,
                PRIMARY KEY (video_id, comment_id)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CommentCache for SqliteCache {
    fn get(&self, video_id: &str) -> Result<Option<Vec<Comment>>> {
        let conn = self.conn.lock().expect("cache lock");
        let mut stmt = conn.prepare(
            "SELECT comment_id, text, author, like_count, published_at, parent_id
             FROM comments WHERE video_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![video_id], |row| {
            let published: String = row.get(4)?;
            Ok(Comment {
                id: row.get(0)?,
                video_id: video_id.to_string(),
                text: row.get(1)?,
                author: row.get(2)?,
                like_count: row.get::<_, i64>(3)? as u64,
                published_at: DateTime::parse_from_rfc3339(&published)
                    .map(|t| t.to_utc())
                    .map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            4,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                parent_id: row.get(5)?,
            })
        })?;
        let comments: Vec<Comment> = rows.collect::<std::result::Result<_, _>>()?;
        if comments.is_empty() {
            Ok(None)
        } else {
            Ok(Some(comments))
        }
    }

    fn put(&self, video_id: &str, comments: &[Comment]) -> Result<()> {
        let mut conn = self.conn.lock().expect("cache lock");
        let fetched_at = Utc::now().to_rfc3339();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM comments WHERE video_id = ?1", params![video_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO comments
                   (video_id, comment_id, text, author, like_count, published_at, parent_id, fetched_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for c in comments {
                stmt.execute(params![
                    video_id,
                    c.id,
                    c.text,
                    c.author,
                    c.like_count as i64,
                    c.published_at.to_rfc3339(),
                    c.parent_id,
                    fetched_at,
                ])?;
            }
        }
        tx.commit()?;
        debug!(
            "Cache updated - video={}, comments={}",
            video_id,
            comments.len()
        );
        Ok(())
    }

    fn is_fresh(&self, video_id: &str, max_age: Duration) -> Result<bool> {
        let conn = self.conn.lock().expect("cache lock");
        let fetched_at: Option<String> = conn
            .query_row(
                "SELECT MAX(fetched_at) FROM comments WHERE video_id = ?1",
                params![video_id],
                |row| row.get(0),
            )
            .unwrap_or(None);
        let Some(fetched_at) = fetched_at else {
            return Ok(false);
        };
        let Ok(fetched_at) = DateTime::parse_from_rfc3339(&fetched_at) else {
            return Ok(false);
        };
        Ok(Utc::now() - fetched_at.to_utc() < max_age)
    }
}
