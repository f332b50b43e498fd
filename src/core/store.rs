use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::core::error::GuardError;
use crate::core::record::RiskResult;

/// SQLite-backed assessment history and per-source pattern counters. The
/// pipeline itself never touches this store; the caller records outcomes
/// after the fact and treats any failure here as non-fatal.
pub struct HistoryStore {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRow {
    pub source: String,
    pub signal: String,
    pub occurrences: u64,
}

impl HistoryStore {
    pub fn open(path: &Path) -> Result<Self, GuardError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, GuardError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), GuardError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS assessments (
              fingerprint TEXT PRIMARY KEY,
              assessed_at TEXT NOT NULL,
              score INTEGER NOT NULL,
              category TEXT NOT NULL,
              times_seen INTEGER NOT NULL DEFAULT 1
            );
            CREATE TABLE IF NOT EXISTS patterns (
              source TEXT NOT NULL,
              signal TEXT NOT NULL,
              occurrences INTEGER NOT NULL DEFAULT 0,
              last_seen TEXT NOT NULL,
              PRIMARY KEY (source, signal)
            );
            ",
        )?;
        Ok(())
    }

    /// Record one assessment outcome. Returns true when the message was not
    /// seen before; resubmissions bump `times_seen` and refresh the row.
    pub fn record_assessment(
        &mut self,
        fingerprint: &str,
        result: &RiskResult,
    ) -> Result<bool, GuardError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT times_seen FROM assessments WHERE fingerprint = ?1",
                params![fingerprint],
                |row| row.get(0),
            )
            .optional()?;

        let now = Utc::now().to_rfc3339();
        match existing {
            Some(times_seen) => {
                self.conn.execute(
                    "UPDATE assessments
                     SET assessed_at = ?2, score = ?3, category = ?4, times_seen = ?5
                     WHERE fingerprint = ?1",
                    params![
                        fingerprint,
                        now,
                        result.score,
                        result.category.label(),
                        times_seen + 1
                    ],
                )?;
                Ok(false)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO assessments (fingerprint, assessed_at, score, category)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![fingerprint, now, result.score, result.category.label()],
                )?;
                Ok(true)
            }
        }
    }

    /// Bump the occurrence counter for one observed pattern.
    pub fn record_pattern(&mut self, source: &str, signal: &str) -> Result<(), GuardError> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO patterns (source, signal, occurrences, last_seen)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(source, signal)
             DO UPDATE SET occurrences = occurrences + 1, last_seen = ?3",
            params![source, signal, now],
        )?;
        Ok(())
    }

    pub fn pattern_counts(&self) -> Result<Vec<PatternRow>, GuardError> {
        let mut stmt = self.conn.prepare(
            "SELECT source, signal, occurrences FROM patterns
             ORDER BY occurrences DESC, source, signal",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PatternRow {
                source: row.get(0)?,
                signal: row.get(1)?,
                occurrences: row.get::<_, i64>(2)? as u64,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
