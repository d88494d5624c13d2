//! SQLite store behind the audit log.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::Operation;
use crate::errors::{CredSwapError, Result};
use crate::vault::Service;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS operations (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    at        TEXT NOT NULL,
    operation TEXT NOT NULL,
    service   TEXT,
    account   TEXT,
    details   TEXT
);
CREATE INDEX IF NOT EXISTS operations_at ON operations (at);";

/// One recorded operation.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub service: Option<String>,
    pub account: Option<String>,
    pub details: Option<String>,
}

impl AuditEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let at: String = row.get("at")?;
        // Rows written by hand with a bad timestamp sort as "now".
        let timestamp = DateTime::parse_from_rfc3339(&at)
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            id: row.get("id")?,
            timestamp,
            operation: row.get("operation")?,
            service: row.get("service")?,
            account: row.get("account")?,
            details: row.get("details")?,
        })
    }
}

/// Filter for [`AuditLog::query`].
#[derive(Debug, Clone, Copy)]
pub struct AuditQuery {
    pub limit: usize,
    pub since: Option<DateTime<Utc>>,
    pub service: Option<Service>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            since: None,
            service: None,
        }
    }
}

/// Operation history in `<data_dir>/audit.db`.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the database. `None` means auditing is unavailable
    /// and the caller carries on without it.
    pub fn open(data_dir: &Path) -> Option<Self> {
        let path = Self::db_path(data_dir);
        let conn = Connection::open(&path)
            .and_then(|conn| conn.execute_batch(SCHEMA).map(|()| conn))
            .map_err(|e| debug!(path = %path.display(), error = %e, "audit log unavailable"))
            .ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        Some(Self { conn })
    }

    /// Append an entry. Failures are logged at debug level and dropped.
    pub fn record(
        &self,
        operation: Operation,
        service: Option<Service>,
        account: Option<&str>,
        details: Option<&str>,
    ) {
        let inserted = self.conn.execute(
            "INSERT INTO operations (at, operation, service, account, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Utc::now().to_rfc3339(),
                operation.as_str(),
                service.map(Service::as_str),
                account,
                details
            ],
        );
        if let Err(e) = inserted {
            debug!(operation = %operation, error = %e, "failed to write audit entry");
        }
    }

    /// Matching entries, newest first.
    pub fn query(&self, filter: AuditQuery) -> Result<Vec<AuditEntry>> {
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        let since = filter.since.map(|ts| ts.to_rfc3339());
        let service = filter.service.map(Service::as_str);

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, at, operation, service, account, details
                 FROM operations
                 WHERE (?1 IS NULL OR at >= ?1)
                   AND (?2 IS NULL OR service = ?2)
                 ORDER BY id DESC
                 LIMIT ?3",
            )
            .map_err(audit_error)?;

        let rows = stmt
            .query_map(params![since, service, limit], AuditEntry::from_row)
            .map_err(audit_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(audit_error)
    }

    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join("audit.db")
    }
}

fn audit_error(e: rusqlite::Error) -> CredSwapError {
    CredSwapError::AuditError(e.to_string())
}
