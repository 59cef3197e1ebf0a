//! Download history store.
//!
//! Every trailer that was ever downloaded and probed is kept in a SQLite
//! `downloads` table, one row per `(tmdb_id, url)`. Rows are looked up by
//! URL, by TMDB ID and by content hash, each backed by an index.
//!
//! At most one row per `tmdb_id` carries the `forced` flag.

use crate::models::media::MediaDetails;
use crate::models::trailer::{SourceVideo, TrailerRecord};
use crate::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS downloads (
    id INTEGER PRIMARY KEY,
    tmdb_id INTEGER NOT NULL,
    url TEXT NOT NULL,
    iso_639_1 TEXT NOT NULL,
    iso_3166_1 TEXT NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    official INTEGER NOT NULL,
    broken INTEGER NOT NULL,
    hash TEXT NOT NULL,
    height INTEGER,
    width INTEGER,
    duration REAL,
    frames INTEGER,
    bitrate INTEGER,
    codec_name TEXT,
    forced INTEGER NOT NULL DEFAULT 0,
    UNIQUE(tmdb_id, url)
);
CREATE INDEX IF NOT EXISTS url_idx ON downloads (url);
CREATE INDEX IF NOT EXISTS tmdb_idx ON downloads (tmdb_id);
CREATE INDEX IF NOT EXISTS hash_idx ON downloads (hash);
";

const COLUMNS: &str = "tmdb_id, url, iso_639_1, iso_3166_1, name, type, official, \
     broken, hash, height, width, duration, frames, bitrate, codec_name, forced";

/// SQLite-backed download history.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open (or create) the history database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory history, discarded on drop.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Check that the database answers queries.
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Insert a record or replace the one stored under the same
    /// `(tmdb_id, url)`. Storing a forced record clears the flag on its
    /// siblings in the same transaction.
    pub fn upsert(&self, record: &TrailerRecord) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        if record.forced {
            tx.execute(
                "UPDATE downloads SET forced = 0 WHERE tmdb_id = ?1",
                params![to_sql_id(record.tmdb_id())],
            )?;
        }

        let sql = format!(
            "INSERT INTO downloads ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(tmdb_id, url) DO UPDATE SET
                iso_639_1 = excluded.iso_639_1,
                iso_3166_1 = excluded.iso_3166_1,
                name = excluded.name,
                type = excluded.type,
                official = excluded.official,
                broken = excluded.broken,
                hash = excluded.hash,
                height = excluded.height,
                width = excluded.width,
                duration = excluded.duration,
                frames = excluded.frames,
                bitrate = excluded.bitrate,
                codec_name = excluded.codec_name,
                forced = excluded.forced"
        );

        let source = &record.source;
        let details = &record.details;
        tx.execute(
            &sql,
            params![
                to_sql_id(source.tmdb_id),
                source.url,
                source.language,
                source.region,
                source.name,
                source.kind,
                source.official,
                details.broken,
                details.hash,
                details.height,
                details.width,
                details.duration,
                details.frames.map(to_sql_id),
                details.bitrate.map(to_sql_id),
                details.codec,
                record.forced,
            ],
        )?;

        tx.commit()?;
        tracing::debug!("Stored download history for {}", record);
        Ok(())
    }

    /// Whether `(tmdb_id, url)` has been downloaded before.
    pub fn contains(&self, tmdb_id: u64, url: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM downloads WHERE tmdb_id = ?1 AND url = ?2",
                params![to_sql_id(tmdb_id), url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// First record downloaded from `url`.
    pub fn by_url(&self, url: &str) -> Result<Option<TrailerRecord>> {
        self.select_one("url = ?1", url)
    }

    /// First record whose content hash is `hash`.
    pub fn by_hash(&self, hash: &str) -> Result<Option<TrailerRecord>> {
        self.select_one("hash = ?1", hash)
    }

    /// Every record for a movie, oldest first.
    pub fn by_tmdb_id(&self, tmdb_id: u64) -> Result<Vec<TrailerRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM downloads WHERE tmdb_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![to_sql_id(tmdb_id)], parse_row)?;
        let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Forget every record for a movie. Returns the number of rows removed.
    pub fn delete(&self, tmdb_id: u64) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM downloads WHERE tmdb_id = ?1",
            params![to_sql_id(tmdb_id)],
        )?;
        tracing::info!("Removed {} history records for tmdb {}", removed, tmdb_id);
        Ok(removed)
    }

    /// Clear the forced flag on every record of a movie.
    pub fn clear_forced(&self, tmdb_id: u64) -> Result<()> {
        self.conn.execute(
            "UPDATE downloads SET forced = 0 WHERE tmdb_id = ?1",
            params![to_sql_id(tmdb_id)],
        )?;
        Ok(())
    }

    /// Force the record `(tmdb_id, url)`, clearing its siblings first.
    ///
    /// Returns `false` (and leaves existing flags untouched) when no such
    /// record exists.
    pub fn set_forced(&self, tmdb_id: u64, url: &str) -> Result<bool> {
        if !self.contains(tmdb_id, url)? {
            return Ok(false);
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE downloads SET forced = 0 WHERE tmdb_id = ?1",
            params![to_sql_id(tmdb_id)],
        )?;
        tx.execute(
            "UPDATE downloads SET forced = 1 WHERE tmdb_id = ?1 AND url = ?2",
            params![to_sql_id(tmdb_id), url],
        )?;
        tx.commit()?;
        Ok(true)
    }

    fn select_one(&self, predicate: &str, value: &str) -> Result<Option<TrailerRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM downloads WHERE {predicate} ORDER BY id LIMIT 1");
        let record = self
            .conn
            .query_row(&sql, params![value], parse_row)
            .optional()?;
        Ok(record)
    }
}

/// SQLite integers are signed; IDs and counters never come close to the limit.
fn to_sql_id(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_id(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

fn parse_row(row: &Row<'_>) -> rusqlite::Result<TrailerRecord> {
    Ok(TrailerRecord {
        source: SourceVideo {
            tmdb_id: from_sql_id(row.get(0)?),
            url: row.get(1)?,
            language: row.get(2)?,
            region: row.get(3)?,
            name: row.get(4)?,
            kind: row.get(5)?,
            official: row.get(6)?,
        },
        details: MediaDetails {
            broken: row.get(7)?,
            hash: row.get(8)?,
            height: row.get(9)?,
            width: row.get(10)?,
            duration: row.get(11)?,
            frames: row.get::<_, Option<i64>>(12)?.map(from_sql_id),
            bitrate: row.get::<_, Option<i64>>(13)?.map(from_sql_id),
            codec: row.get(14)?,
        },
        forced: row.get(15)?,
    })
}
