use chrono::{DateTime, Local};
use directories::ProjectDirs;
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

use crate::session::SessionSummary;

/// One finished practice session as stored in the history database.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub script: String,
    pub started_at: DateTime<Local>,
    pub stopped_at: DateTime<Local>,
    pub elapsed_secs: u64,
    pub words_covered: usize,
    pub words_total: usize,
    pub target_wpm: u16,
    pub attained_wpm: f64,
    pub score: f64,
}

impl SessionRecord {
    pub fn from_summary(script: &str, summary: &SessionSummary, score: f64) -> Self {
        Self {
            script: script.to_string(),
            started_at: summary.started_at.unwrap_or(summary.stopped_at),
            stopped_at: summary.stopped_at,
            elapsed_secs: summary.elapsed_secs,
            words_covered: summary.words_covered,
            words_total: summary.words_total,
            target_wpm: summary.target_wpm,
            attained_wpm: summary.attained_wpm,
            score,
        }
    }
}

/// Per-script aggregates for the progress view.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptProgress {
    pub attempts: i64,
    pub avg_score: f64,
    pub best_score: f64,
    pub avg_attained_wpm: f64,
}

/// Database manager for practice-session history
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Initialize the database connection and create tables if needed
    pub fn new() -> Result<Self> {
        let db_path = Self::get_db_path().unwrap_or_else(|| PathBuf::from("patter_history.db"));
        Self::open_at(&db_path)
    }

    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(HistoryDb { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(HistoryDb { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS practice_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                script TEXT NOT NULL,
                started_at TEXT NOT NULL,
                stopped_at TEXT NOT NULL,
                elapsed_secs INTEGER NOT NULL,
                words_covered INTEGER NOT NULL,
                words_total INTEGER NOT NULL,
                target_wpm INTEGER NOT NULL,
                attained_wpm REAL NOT NULL,
                score REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_practice_sessions_script ON practice_sessions(script)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_practice_sessions_stopped ON practice_sessions(stopped_at)",
            [],
        )?;
        Ok(())
    }

    /// Get the database file path under $HOME/.local/state/patter
    fn get_db_path() -> Option<PathBuf> {
        // Try the XDG-compliant ~/.local/state directory first
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("patter");
            Some(state_dir.join("history.db"))
        } else if let Some(proj_dirs) = ProjectDirs::from("", "", "patter") {
            let state_dir = proj_dirs.data_local_dir();
            Some(state_dir.join("history.db"))
        } else {
            None
        }
    }

    pub fn record_session(&self, rec: &SessionRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO practice_sessions
            (script, started_at, stopped_at, elapsed_secs, words_covered, words_total, target_wpm, attained_wpm, score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                rec.script,
                rec.started_at.to_rfc3339(),
                rec.stopped_at.to_rfc3339(),
                rec.elapsed_secs,
                rec.words_covered as i64,
                rec.words_total as i64,
                rec.target_wpm,
                rec.attained_wpm,
                rec.score,
            ],
        )?;
        Ok(())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT script, started_at, stopped_at, elapsed_secs, words_covered, words_total, target_wpm, attained_wpm, score
            FROM practice_sessions
            ORDER BY stopped_at DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let started: String = row.get(1)?;
            let stopped: String = row.get(2)?;
            let started_at = DateTime::parse_from_rfc3339(&started)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        1,
                        "started_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);
            let stopped_at = DateTime::parse_from_rfc3339(&stopped)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "stopped_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(SessionRecord {
                script: row.get(0)?,
                started_at,
                stopped_at,
                elapsed_secs: row.get::<_, i64>(3)? as u64,
                words_covered: row.get::<_, i64>(4)? as usize,
                words_total: row.get::<_, i64>(5)? as usize,
                target_wpm: row.get::<_, i64>(6)? as u16,
                attained_wpm: row.get(7)?,
                score: row.get(8)?,
            })
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Aggregates for one script, or `None` when it has never been practiced.
    pub fn script_progress(&self, script: &str) -> Result<Option<ScriptProgress>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT COUNT(*), AVG(score), MAX(score), AVG(attained_wpm)
            FROM practice_sessions
            WHERE script = ?1
            "#,
        )?;

        let (attempts, avg_score, best_score, avg_wpm): (i64, Option<f64>, Option<f64>, Option<f64>) =
            stmt.query_row([script], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?;

        if attempts == 0 {
            return Ok(None);
        }
        Ok(Some(ScriptProgress {
            attempts,
            avg_score: avg_score.unwrap_or(0.0),
            best_score: best_score.unwrap_or(0.0),
            avg_attained_wpm: avg_wpm.unwrap_or(0.0),
        }))
    }

    /// All scores for one script, oldest first; feeds variability stats.
    pub fn script_scores(&self, script: &str) -> Result<Vec<f64>> {
        let mut stmt = self.conn.prepare(
            "SELECT score FROM practice_sessions WHERE script = ?1 ORDER BY stopped_at ASC",
        )?;
        let rows = stmt.query_map([script], |row| row.get(0))?;
        let mut scores = Vec::new();
        for row in rows {
            scores.push(row?);
        }
        Ok(scores)
    }

    /// Total sessions across every script.
    pub fn total_sessions(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM practice_sessions", [], |row| {
                row.get(0)
            })
    }

    /// Clear all history (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM practice_sessions", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(script: &str, score: f64, attained_wpm: f64, offset_secs: i64) -> SessionRecord {
        let stopped = Local::now() + Duration::seconds(offset_secs);
        SessionRecord {
            script: script.to_string(),
            started_at: stopped - Duration::seconds(30),
            stopped_at: stopped,
            elapsed_secs: 30,
            words_covered: 25,
            words_total: 40,
            target_wpm: 110,
            attained_wpm,
            score,
        }
    }

    #[test]
    fn test_record_and_recent() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record_session(&record("peppers", 80.0, 100.0, 0)).unwrap();
        db.record_session(&record("seashells", 60.0, 90.0, 10)).unwrap();

        let sessions = db.recent_sessions(10).unwrap();
        assert_eq!(sessions.len(), 2);
        // Most recent first
        assert_eq!(sessions[0].script, "seashells");
        assert_eq!(sessions[1].script, "peppers");
        assert_eq!(sessions[1].score, 80.0);
        assert_eq!(sessions[1].words_covered, 25);
        assert_eq!(sessions[1].target_wpm, 110);
    }

    #[test]
    fn test_recent_respects_limit() {
        let db = HistoryDb::open_in_memory().unwrap();
        for i in 0..5 {
            db.record_session(&record("peppers", 50.0 + i as f64, 100.0, i))
                .unwrap();
        }
        assert_eq!(db.recent_sessions(3).unwrap().len(), 3);
    }

    #[test]
    fn test_script_progress_aggregates() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record_session(&record("peppers", 70.0, 100.0, 0)).unwrap();
        db.record_session(&record("peppers", 90.0, 120.0, 1)).unwrap();
        db.record_session(&record("seashells", 40.0, 80.0, 2)).unwrap();

        let progress = db.script_progress("peppers").unwrap().unwrap();
        assert_eq!(progress.attempts, 2);
        assert_eq!(progress.avg_score, 80.0);
        assert_eq!(progress.best_score, 90.0);
        assert_eq!(progress.avg_attained_wpm, 110.0);
    }

    #[test]
    fn test_unpracticed_script_has_no_progress() {
        let db = HistoryDb::open_in_memory().unwrap();
        assert_eq!(db.script_progress("peppers").unwrap(), None);
    }

    #[test]
    fn test_script_scores_ordered_oldest_first() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record_session(&record("peppers", 50.0, 100.0, 0)).unwrap();
        db.record_session(&record("peppers", 75.0, 100.0, 5)).unwrap();
        assert_eq!(db.script_scores("peppers").unwrap(), vec![50.0, 75.0]);
    }

    #[test]
    fn test_total_and_clear() {
        let db = HistoryDb::open_in_memory().unwrap();
        db.record_session(&record("peppers", 50.0, 100.0, 0)).unwrap();
        assert_eq!(db.total_sessions().unwrap(), 1);
        db.clear_all().unwrap();
        assert_eq!(db.total_sessions().unwrap(), 0);
    }

    #[test]
    fn test_from_summary_uses_stop_time_when_never_recorded() {
        let summary = SessionSummary {
            elapsed_secs: 0,
            final_word_index: 0,
            words_covered: 0,
            words_total: 10,
            target_wpm: 110,
            attained_wpm: 0.0,
            started_at: None,
            stopped_at: Local::now(),
        };
        let rec = SessionRecord::from_summary("peppers", &summary, 0.0);
        assert_eq!(rec.started_at, rec.stopped_at);
    }
}
