//! Session history persistence
//!
//! Best-effort SQLite storage of finished sessions. Saving is advisory:
//! the engine keeps playing whatever happens here, and a corrupted
//! database file is discarded and recreated rather than surfaced as a
//! crash. Retention is capped at the most recent 50 sessions.

use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{info, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    initial_state_id TEXT NOT NULL,
    task_id          TEXT,
    target_state_id  TEXT,
    duration_secs    INTEGER NOT NULL,
    completed        INTEGER NOT NULL,
    created_at       INTEGER NOT NULL DEFAULT (strftime('%s','now'))
);
";

/// Rows kept after each save
const RETENTION: usize = 50;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no data directory available")]
    NoDataDir,
}

/// One finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub initial_state_id: String,
    pub task_id: Option<String>,
    pub target_state_id: Option<String>,
    pub duration_secs: u64,
    pub completed: bool,
}

/// Aggregates over the stored history
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub total_secs: u64,
    pub most_used_task: Option<String>,
    pub most_common_initial: Option<String>,
}

pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open the store at the platform data directory
    pub fn open_default() -> Result<Self, SessionStoreError> {
        let dir = dirs::data_dir()
            .ok_or(SessionStoreError::NoDataDir)?
            .join("neuroflow");
        fs::create_dir_all(&dir)?;
        Self::open(&dir.join("sessions.db"))
    }

    /// Open (or create) the store at `path`. A file SQLite refuses to
    /// treat as a database is discarded and recreated empty.
    pub fn open(path: &Path) -> Result<Self, SessionStoreError> {
        match Self::try_open(path) {
            Ok(store) => Ok(store),
            Err(err) => {
                warn!(%err, path = %path.display(), "discarding unreadable session database");
                fs::remove_file(path)?;
                let store = Self::try_open(path)?;
                info!(path = %path.display(), "session database recreated");
                Ok(store)
            }
        }
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self, SessionStoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    fn try_open(path: &Path) -> Result<Self, SessionStoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert one record and trim history beyond the retention cap
    pub fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        self.conn.execute(
            "INSERT INTO sessions
                 (initial_state_id, task_id, target_state_id, duration_secs, completed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.initial_state_id,
                record.task_id,
                record.target_state_id,
                record.duration_secs,
                record.completed,
            ],
        )?;
        self.conn.execute(
            "DELETE FROM sessions WHERE id NOT IN
                 (SELECT id FROM sessions ORDER BY id DESC LIMIT ?1)",
            params![RETENTION],
        )?;
        Ok(())
    }

    /// The `n` most recent sessions, newest first
    pub fn recent(&self, n: usize) -> Result<Vec<SessionRecord>, SessionStoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT initial_state_id, task_id, target_state_id, duration_secs, completed
             FROM sessions ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![n], |row| {
            Ok(SessionRecord {
                initial_state_id: row.get(0)?,
                task_id: row.get(1)?,
                target_state_id: row.get(2)?,
                duration_secs: row.get(3)?,
                completed: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    pub fn stats(&self) -> Result<SessionStats, SessionStoreError> {
        let (total_sessions, total_secs): (u64, u64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0) FROM sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let most_used_task: Option<String> = self
            .conn
            .query_row(
                "SELECT task_id FROM sessions WHERE task_id IS NOT NULL
                 GROUP BY task_id ORDER BY COUNT(*) DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let most_common_initial: Option<String> = self
            .conn
            .query_row(
                "SELECT initial_state_id FROM sessions
                 GROUP BY initial_state_id ORDER BY COUNT(*) DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(SessionStats {
            total_sessions,
            total_secs,
            most_used_task,
            most_common_initial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(initial: &str, secs: u64) -> SessionRecord {
        SessionRecord {
            initial_state_id: initial.to_string(),
            task_id: None,
            target_state_id: Some("FOCO".to_string()),
            duration_secs: secs,
            completed: true,
        }
    }

    #[test]
    fn test_save_and_recent() {
        let store = SessionStore::open_in_memory().unwrap();
        store.save(&record("RAIVA", 300)).unwrap();
        store.save(&record("NEUTRO", 600)).unwrap();
        let recent = store.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first
        assert_eq!(recent[0].initial_state_id, "NEUTRO");
        assert_eq!(recent[1].duration_secs, 300);
    }

    #[test]
    fn test_retention_caps_history() {
        let store = SessionStore::open_in_memory().unwrap();
        for i in 0..60 {
            store.save(&record("NEUTRO", i)).unwrap();
        }
        let recent = store.recent(100).unwrap();
        assert_eq!(recent.len(), 50);
        // The oldest ten were trimmed
        assert_eq!(recent.last().unwrap().duration_secs, 10);
    }

    #[test]
    fn test_stats() {
        let store = SessionStore::open_in_memory().unwrap();
        store.save(&record("RAIVA", 100)).unwrap();
        store.save(&record("RAIVA", 200)).unwrap();
        let mut with_task = record("NEUTRO", 50);
        with_task.task_id = Some("ESTUDAR".to_string());
        store.save(&with_task).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_secs, 350);
        assert_eq!(stats.most_used_task.as_deref(), Some("ESTUDAR"));
        assert_eq!(stats.most_common_initial.as_deref(), Some("RAIVA"));
    }

    #[test]
    fn test_empty_stats() {
        let store = SessionStore::open_in_memory().unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.total_sessions, 0);
        assert!(stats.most_used_task.is_none());
    }

    #[test]
    fn test_corrupted_file_recreated() {
        let dir = std::env::temp_dir().join("neuroflow-session-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("corrupt.db");
        fs::write(&path, b"this is not a sqlite database, not even close").unwrap();

        let store = SessionStore::open(&path).expect("corrupt file must be replaced");
        store.save(&record("NEUTRO", 10)).unwrap();
        assert_eq!(store.recent(10).unwrap().len(), 1);

        fs::remove_file(&path).ok();
    }
}
