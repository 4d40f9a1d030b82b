//! Append-only audit log writer
//!
//! Each entry is one JSON line, flushed as soon as it is written.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::error::{CifraError, CifraResult};

use super::entry::AuditEntry;

/// Writes and reads the JSONL audit log
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry
    pub fn log(&self, entry: &AuditEntry) -> CifraResult<()> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| CifraError::Io(format!("Failed to open audit log: {}", e)))?;

        let json = serde_json::to_string(entry)
            .map_err(|e| CifraError::Json(format!("Failed to serialize audit entry: {}", e)))?;

        writeln!(file, "{}", json)
            .map_err(|e| CifraError::Io(format!("Failed to write audit entry: {}", e)))?;

        file.flush()
            .map_err(|e| CifraError::Io(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// All entries, oldest first. Lines that fail to parse are skipped.
    pub fn read_all(&self) -> CifraResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| CifraError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                CifraError::Io(format!("Failed to read audit log line {}: {}", line_num + 1, e))
            })?;

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(line = line_num + 1, error = %e, "skipping unreadable audit entry"),
            }
        }

        Ok(entries)
    }

    /// The most recent `count` entries, optionally only those owned by `user_id`
    pub fn read_recent(&self, count: usize, user_id: Option<&str>) -> CifraResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        if let Some(user_id) = user_id {
            entries.retain(|e| e.user_id.as_deref() == Some(user_id));
        }
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    /// Number of lines in the log
    pub fn entry_count(&self) -> CifraResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| CifraError::Io(format!("Failed to open audit log: {}", e)))?;

        Ok(BufReader::new(file)
            .lines()
            .filter_map(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count())
    }

    pub fn path(&self) -> &PathBuf {
        &self.log_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::{EntityType, Operation};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_logger() -> (AuditLogger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let logger = AuditLogger::new(temp_dir.path().join("audit.log"));
        (logger, temp_dir)
    }

    fn expense_entry(i: usize, user: &str) -> AuditEntry {
        AuditEntry::create(
            EntityType::Expense,
            format!("exp-{}", i),
            Some(format!("Gasto {}", i)),
            &json!({"index": i}),
        )
        .for_user(user)
    }

    #[test]
    fn test_log_and_read() {
        let (logger, _temp) = create_test_logger();
        logger.log(&expense_entry(0, "usr-a")).unwrap();

        let entries = logger.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].operation, Operation::Create);
        assert_eq!(logger.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_read_recent_filters_by_user() {
        let (logger, _temp) = create_test_logger();
        for i in 0..6 {
            let user = if i % 2 == 0 { "usr-a" } else { "usr-b" };
            logger.log(&expense_entry(i, user)).unwrap();
        }

        let recent = logger.read_recent(2, Some("usr-a")).unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["exp-2", "exp-4"]);

        assert_eq!(logger.read_recent(10, None).unwrap().len(), 6);
    }

    #[test]
    fn test_empty_log() {
        let (logger, _temp) = create_test_logger();
        assert_eq!(logger.entry_count().unwrap(), 0);
        assert!(logger.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let (logger, temp) = create_test_logger();
        logger.log(&expense_entry(1, "usr-a")).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(temp.path().join("audit.log"))
            .unwrap();
        writeln!(file, "garbage").unwrap();
        logger.log(&expense_entry(2, "usr-a")).unwrap();

        assert_eq!(logger.read_all().unwrap().len(), 2);
    }
}
