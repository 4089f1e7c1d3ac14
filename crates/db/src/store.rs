//! Swappable database handle.
//!
//! Requests hold a read guard on the connection for as long as they run.
//! Import and backup restore take the write guard, which waits for in-flight
//! requests to finish, then close the pool, move files around, and reopen.
//! Any failure after the pool is closed puts the previous file back and
//! reopens it. Restart opens the new pool before dropping the old one.

use std::path::{Path, PathBuf};

use chrono::Local;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard};

/// First bytes of every SQLite 3 database file.
const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Errors from store management operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The uploaded bytes are not a SQLite database.
    #[error("Uploaded file is not a SQLite database")]
    NotADatabase,

    /// Backup name is outside the allowed prefix.
    #[error("Invalid backup filename: {0}")]
    InvalidBackupName(String),

    /// Backup file does not exist.
    #[error("Backup file not found: {0}")]
    BackupNotFound(String),

    /// The database file does not exist.
    #[error("Database file not found")]
    FileNotFound,

    /// Opening the replacement failed; the previous database was restored.
    #[error("Failed to open replacement database, previous database restored: {0}")]
    Reopen(#[source] DbErr),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Health of the current connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Whether `SELECT 1` succeeded.
    pub ok: bool,
    /// Database file path.
    pub path: String,
    /// Error from the probe, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// SQLite file plus the connection pool currently open on it.
#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    max_connections: u32,
    conn: RwLock<DatabaseConnection>,
}

impl Store {
    /// Opens (creating if needed) and migrates the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub async fn open(path: impl Into<PathBuf>, max_connections: u32) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = crate::connect_and_migrate(&path, max_connections).await?;
        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self {
            path,
            max_connections,
            conn: RwLock::new(conn),
        })
    }

    /// Database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Borrows the current connection. Hold the guard for the whole request.
    pub async fn read(&self) -> RwLockReadGuard<'_, DatabaseConnection> {
        self.conn.read().await
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn backup_prefix(&self) -> String {
        format!("{}.backup-", self.file_name())
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Probes the connection with `SELECT 1`.
    pub async fn status(&self) -> StoreStatus {
        let conn = self.read().await;
        let probe = conn.execute_unprepared("SELECT 1").await;
        StoreStatus {
            ok: probe.is_ok(),
            path: self.path.display().to_string(),
            error: probe.err().map(|e| e.to_string()),
        }
    }

    /// Reads the database file while no request is using it.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file is missing.
    pub async fn export(&self) -> Result<Vec<u8>, StoreError> {
        let _quiet = self.conn.write().await;
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::FileNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists backup file names, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn list_backups(&self) -> Result<Vec<String>, StoreError> {
        let prefix = self.backup_prefix();
        let dir = self.directory();
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                names.push(name);
            }
        }
        names.sort_unstable_by(|a, b| b.cmp(a));
        Ok(names)
    }

    /// Deletes every backup file and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or removing fails.
    pub async fn delete_backups(&self) -> Result<usize, StoreError> {
        let names = self.list_backups().await?;
        let dir = self.directory();
        for name in &names {
            tokio::fs::remove_file(dir.join(name)).await?;
        }
        tracing::info!(deleted = names.len(), "Backups deleted");
        Ok(names.len())
    }

    /// Checks a caller-supplied backup name and resolves it to a path.
    ///
    /// Directory components are dropped, so only files next to the database
    /// can be addressed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBackupName` if the name does not carry the backup prefix.
    pub fn backup_path(&self, filename: &str) -> Result<PathBuf, StoreError> {
        let base = Path::new(filename)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prefix = self.backup_prefix();
        if base.len() <= prefix.len() || !base.starts_with(&prefix) {
            return Err(StoreError::InvalidBackupName(filename.to_string()));
        }
        Ok(self.directory().join(base))
    }

    /// Replaces the database with uploaded bytes.
    ///
    /// Returns the backup name of the previous database, if one existed.
    ///
    /// # Errors
    ///
    /// Returns `NotADatabase` for non-SQLite uploads, `Reopen` if the upload
    /// could not be opened (the previous file is restored), or an I/O error.
    pub async fn import(&self, bytes: &[u8]) -> Result<Option<String>, StoreError> {
        if !bytes.starts_with(SQLITE_HEADER) {
            return Err(StoreError::NotADatabase);
        }
        self.swap(bytes).await
    }

    /// Restores a backup over the current database.
    ///
    /// The current database is itself backed up first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBackupName`, `BackupNotFound`, `Reopen`, or an I/O error.
    pub async fn restore_backup(&self, filename: &str) -> Result<Option<String>, StoreError> {
        let source = self.backup_path(filename)?;
        if !tokio::fs::try_exists(&source).await? {
            return Err(StoreError::BackupNotFound(filename.to_string()));
        }
        // The swap writes a new backup into the same directory; read first.
        let bytes = tokio::fs::read(&source).await?;
        self.swap(&bytes).await
    }

    /// Reopens the connection pool on the same file.
    ///
    /// The current pool stays in place if the file cannot be opened.
    ///
    /// # Errors
    ///
    /// Returns `Reopen` if the database cannot be opened.
    pub async fn restart(&self) -> Result<(), StoreError> {
        let mut guard = self.conn.write().await;
        let fresh = match crate::connect_and_migrate(&self.path, self.max_connections).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Database restart failed, keeping current connection");
                return Err(StoreError::Reopen(e));
            }
        };
        let old = std::mem::replace(&mut *guard, fresh);
        if let Err(e) = old.close().await {
            tracing::warn!(error = %e, "Closing database pool failed");
        }
        tracing::info!(path = %self.path.display(), "Database restarted");
        Ok(())
    }

    async fn swap(&self, bytes: &[u8]) -> Result<Option<String>, StoreError> {
        let mut guard = self.conn.write().await;

        let old = std::mem::replace(&mut *guard, DatabaseConnection::Disconnected);
        if let Err(e) = old.close().await {
            tracing::warn!(error = %e, "Closing database pool failed");
        }

        let backup = match self.backup_current().await {
            Ok(backup) => backup,
            Err(e) => {
                tracing::error!(error = %e, "Backup failed, reopening current database");
                self.reopen(&mut guard).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::write(&self.path, bytes).await {
            tracing::error!(error = %e, "Writing replacement database failed");
            self.put_back(backup.as_deref(), &mut guard).await;
            return Err(e.into());
        }

        match crate::connect_and_migrate(&self.path, self.max_connections).await {
            Ok(conn) => {
                *guard = conn;
                tracing::info!(
                    path = %self.path.display(),
                    backup = ?backup,
                    "Database replaced"
                );
                Ok(backup)
            }
            Err(e) => {
                tracing::error!(error = %e, "Replacement database failed to open, restoring previous file");
                self.put_back(backup.as_deref(), &mut guard).await;
                Err(StoreError::Reopen(e))
            }
        }
    }

    /// Copies the current file to a timestamped backup next to it.
    ///
    /// Two backups within the same second get a `-2`, `-3`, ... suffix.
    async fn backup_current(&self) -> Result<Option<String>, StoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let stem = format!(
            "{}{}",
            self.backup_prefix(),
            Local::now().format("%Y-%m-%d_%H-%M-%S")
        );
        let dir = self.directory();
        let mut name = stem.clone();
        let mut n = 1;
        while tokio::fs::try_exists(dir.join(&name)).await? {
            n += 1;
            name = format!("{stem}-{n}");
        }
        tokio::fs::copy(&self.path, dir.join(&name)).await?;
        Ok(Some(name))
    }

    /// Restores the backed-up file (or removes the broken one) and reopens.
    async fn put_back(&self, backup: Option<&str>, conn: &mut DatabaseConnection) {
        let restored = match backup {
            Some(name) => tokio::fs::copy(self.directory().join(name), &self.path)
                .await
                .map(|_| ()),
            None => match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
        };
        if let Err(e) = restored {
            tracing::error!(error = %e, "Failed to restore previous database file");
        }
        self.reopen(conn).await;
    }

    /// Opens the file at `path` into `conn`. On failure `conn` stays
    /// disconnected and requests report a database error.
    async fn reopen(&self, conn: &mut DatabaseConnection) {
        match crate::connect_and_migrate(&self.path, self.max_connections).await {
            Ok(reopened) => *conn = reopened,
            Err(e) => tracing::error!(error = %e, "Failed to reopen previous database"),
        }
    }
}
