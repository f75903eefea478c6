//! Operation log — SQLite-based history of vault operations.
//!
//! Records every operation performed through the CLI (set, delete,
//! import, backup, ...) in `<config_dir>/audit.db`.  Only service and
//! field names are recorded, never values.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.  Built only
//! with the `audit-log` feature (on by default).

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::Settings;

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub service: Option<String>,
    pub field: Option<String>,
    pub details: Option<String>,
}

#[cfg(feature = "audit-log")]
pub use sqlite::AuditLog;

#[cfg(feature = "audit-log")]
mod sqlite {
    use std::path::Path;

    use chrono::{DateTime, Utc};
    use rusqlite::Connection;

    use super::AuditEntry;
    use crate::errors::{Result, VaultError};

    /// SQLite-backed audit log.
    pub struct AuditLog {
        conn: Connection,
    }

    impl AuditLog {
        /// Open (or create) the audit database at `db_path`.
        ///
        /// Returns `None` if the database can't be opened; callers should
        /// treat this as "audit logging unavailable" and continue normally.
        pub fn open(db_path: &Path) -> Option<Self> {
            let conn = Connection::open(db_path).ok()?;

            // Owner-only, like everything else in the config directory.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o600);
                let _ = std::fs::set_permissions(db_path, perms);
            }

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS audit_log (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    timestamp   TEXT NOT NULL,
                    operation   TEXT NOT NULL,
                    service     TEXT,
                    field       TEXT,
                    details     TEXT
                );",
            )
            .ok()?;

            Some(Self { conn })
        }

        /// Record an operation. Fire-and-forget; errors are silently ignored.
        pub fn log(
            &self,
            operation: &str,
            service: Option<&str>,
            field: Option<&str>,
            details: Option<&str>,
        ) {
            let now = Utc::now().to_rfc3339();
            let _ = self.conn.execute(
                "INSERT INTO audit_log (timestamp, operation, service, field, details)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![now, operation, service, field, details],
            );
        }

        /// Query recent audit entries, most recent first.
        ///
        /// - `limit`: maximum number of entries to return.
        /// - `since`: if provided, only return entries at or after this time.
        pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
            let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
            // RFC 3339 in UTC sorts lexically, so a string bound works.
            let since_str = since.map_or_else(String::new, |ts| ts.to_rfc3339());

            let mut stmt = self
                .conn
                .prepare(
                    "SELECT id, timestamp, operation, service, field, details
                     FROM audit_log
                     WHERE timestamp >= ?1
                     ORDER BY id DESC
                     LIMIT ?2",
                )
                .map_err(|e| VaultError::AuditError(format!("query prepare: {e}")))?;

            let rows = stmt
                .query_map(rusqlite::params![since_str, limit_i64], |row| {
                    let ts_str: String = row.get(1)?;
                    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                        .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                    Ok(AuditEntry {
                        id: row.get(0)?,
                        timestamp,
                        operation: row.get(2)?,
                        service: row.get(3)?,
                        field: row.get(4)?,
                        details: row.get(5)?,
                    })
                })
                .map_err(|e| VaultError::AuditError(format!("query exec: {e}")))?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.map_err(|e| VaultError::AuditError(format!("row parse: {e}")))?);
            }

            Ok(entries)
        }
    }
}

/// Convenience helper: log an operation for the configured vault.
///
/// Opens the audit database, logs the event, and silently ignores any errors.
/// This is safe to call from any command; it never fails the parent operation.
pub fn log_audit(
    settings: &Settings,
    op: &str,
    service: Option<&str>,
    field: Option<&str>,
    details: Option<&str>,
) {
    log_to(&settings.audit_db_path(), op, service, field, details);
}

#[cfg(feature = "audit-log")]
fn log_to(db_path: &Path, op: &str, service: Option<&str>, field: Option<&str>, details: Option<&str>) {
    if let Some(audit) = AuditLog::open(db_path) {
        audit.log(op, service, field, details);
    }
}

#[cfg(not(feature = "audit-log"))]
fn log_to(
    _db_path: &Path,
    _op: &str,
    _service: Option<&str>,
    _field: Option<&str>,
    _details: Option<&str>,
) {
}

#[cfg(all(test, feature = "audit-log"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("audit.db");
        assert!(AuditLog::open(&db).is_some(), "should open successfully");
        assert!(db.exists());
    }

    #[test]
    fn log_and_query_roundtrip() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(&dir.path().join("audit.db")).unwrap();

        audit.log("set", Some("github"), Some("token"), Some("added"));
        audit.log("set", Some("db"), Some("user"), Some("updated"));
        audit.log("delete", Some("db"), Some("user"), None);

        let entries = audit.query(10, None).unwrap();
        assert_eq!(entries.len(), 3);

        // Most recent first.
        assert_eq!(entries[0].operation, "delete");
        assert_eq!(entries[1].operation, "set");
        assert_eq!(entries[2].service.as_deref(), Some("github"));
        assert_eq!(entries[2].field.as_deref(), Some("token"));
    }

    #[test]
    fn query_with_limit() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(&dir.path().join("audit.db")).unwrap();

        for i in 0..10 {
            audit.log("set", Some("svc"), Some(&format!("field_{i}")), None);
        }

        let entries = audit.query(3, None).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn query_with_since_filter() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(&dir.path().join("audit.db")).unwrap();

        audit.log("backup", None, None, Some("/tmp/x"));

        let past = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(audit.query(10, Some(past)).unwrap().len(), 1);

        let future = Utc::now() + chrono::Duration::hours(1);
        assert_eq!(audit.query(10, Some(future)).unwrap().len(), 0);
    }

    #[test]
    fn open_returns_none_on_bad_path() {
        let result = AuditLog::open(Path::new("/nonexistent/path/that/does/not/exist/audit.db"));
        assert!(result.is_none());
    }

    #[test]
    fn log_audit_writes_to_config_dir() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path()).unwrap();

        log_audit(&settings, "import", None, None, Some("2 services"));

        let audit = AuditLog::open(&settings.audit_db_path()).unwrap();
        let entries = audit.query(5, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].details.as_deref(), Some("2 services"));
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let db = dir.path().join("audit.db");
        let _audit = AuditLog::open(&db).unwrap();

        let perms = std::fs::metadata(&db).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
