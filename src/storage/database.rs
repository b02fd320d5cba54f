// Book Inventory - Inventory of Books for Mobile
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Database connection and management
//!
//! This module handles database connection pooling, initialization, and maintenance.
//!
//! # Database Location
//! - Desktop (macOS): ~/Library/Application Support/BookInventory/inventory.db
//! - Desktop (Linux): ~/.local/share/BookInventory/inventory.db
//! - Desktop (Windows): %APPDATA%/BookInventory/inventory.db
//! - Android: app-specific data directory (context.getDatabasePath())
//!
//! # SQLite Configuration
//! - WAL mode
//! - Foreign keys enabled
//! - Incremental auto-vacuum
//! - Normal synchronous mode

use crate::error::{InventoryError, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous},
    ConnectOptions,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

/// File name of the inventory database inside the app data directory
pub const DATABASE_FILE_NAME: &str = "inventory.db";

/// Database manager - handles connection pooling and operations
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl Database {
    /// Open (or create) the database file and apply migrations
    ///
    /// # Errors
    /// Returns error if:
    /// - Parent directory doesn't exist and can't be created
    /// - Database file can't be opened
    /// - Migrations fail
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    InventoryError::FileIoError(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let connection_string = format!("sqlite://{}?mode=rwc", path.display());
        let connect_opts = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        Self::configure_database(&pool).await?;

        let db = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        db.migrate().await?;

        info!(path = %path.display(), "Opened inventory database");
        Ok(db)
    }

    /// Create in-memory database for testing
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .disable_statement_logging();

        // Every connection to :memory: is its own database, so stay at one
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;

        Self::configure_database(&pool).await?;

        let db = Self { pool, path: None };
        db.migrate().await?;

        debug!("Opened in-memory inventory database");
        Ok(db)
    }

    async fn configure_database(pool: &SqlitePool) -> Result<()> {
        sqlx::query("PRAGMA auto_vacuum = INCREMENTAL")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Apply all pending migrations
    ///
    /// Migrations are run automatically when creating a new database connection.
    pub async fn migrate(&self) -> Result<()> {
        crate::storage::migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| InventoryError::MigrationFailed(e.to_string()))?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path
    ///
    /// Returns `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }

    /// Get default database path for the platform
    ///
    /// Note: On Android the app passes its own database path instead
    pub fn get_default_path() -> PathBuf {
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("BookInventory")
                .join(DATABASE_FILE_NAME)
        }

        #[cfg(target_os = "linux")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("BookInventory")
                .join(DATABASE_FILE_NAME)
        }

        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata)
                .join("BookInventory")
                .join(DATABASE_FILE_NAME)
        }

        #[cfg(target_os = "android")]
        {
            PathBuf::from("/data/data/com.example.android.inventory/databases").join(DATABASE_FILE_NAME)
        }

        #[cfg(not(any(
            target_os = "macos",
            target_os = "linux",
            target_os = "windows",
            target_os = "android"
        )))]
        {
            PathBuf::from(".").join(DATABASE_FILE_NAME)
        }
    }

    /// Vacuum database to reclaim unused space
    pub async fn vacuum(&self) -> Result<()> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    /// Get database statistics (page count, page size, free pages)
    pub async fn get_stats(&self) -> Result<DatabaseStats> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await?;

        let freelist_count: i64 = sqlx::query_scalar("PRAGMA freelist_count")
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            page_count: page_count as u64,
            page_size: page_size as u64,
            freelist_count: freelist_count as u64,
            total_size: (page_count * page_size) as u64,
            unused_size: (freelist_count * page_size) as u64,
        })
    }

    /// Checkpoint WAL file to main database
    pub async fn checkpoint(&self) -> Result<()> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Runs SQLite integrity check and returns true if database is okay
    pub async fn check_integrity(&self) -> Result<bool> {
        let result: String = sqlx::query_scalar("PRAGMA integrity_check")
            .fetch_one(&self.pool)
            .await?;

        Ok(result == "ok")
    }

    /// Routine upkeep: integrity check, WAL checkpoint, then a vacuum when
    /// more than a fifth of the file is free pages
    ///
    /// Fails with [`InventoryError::DatabaseError`] when the integrity check
    /// does not pass, before anything is rewritten.
    pub async fn maintain(&self) -> Result<MaintenanceReport> {
        if !self.check_integrity().await? {
            warn!("Integrity check failed, skipping maintenance");
            return Err(InventoryError::DatabaseError(
                "integrity check failed".to_string(),
            ));
        }

        self.checkpoint().await?;

        let before = self.get_stats().await?;
        let vacuumed = before.should_vacuum();
        if vacuumed {
            debug!(unused = before.unused_size, "Vacuuming database");
            self.vacuum().await?;
        }
        let after = self.get_stats().await?;

        info!(
            vacuumed,
            size_before = before.total_size,
            size_after = after.total_size,
            "Database maintenance finished"
        );
        Ok(MaintenanceReport { before, after, vacuumed })
    }
}

/// Outcome of [`Database::maintain`]
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceReport {
    pub before: DatabaseStats,
    pub after: DatabaseStats,
    pub vacuumed: bool,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    /// Total number of pages in database
    pub page_count: u64,
    /// Size of each page in bytes
    pub page_size: u64,
    /// Number of free pages (unused space)
    pub freelist_count: u64,
    /// Total size of database (page_count * page_size)
    pub total_size: u64,
    /// Unused space (freelist_count * page_size)
    pub unused_size: u64,
}

impl DatabaseStats {
    /// Get percentage of unused space
    pub fn unused_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.unused_size as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Check if vacuum is recommended (>20% unused space)
    pub fn should_vacuum(&self) -> bool {
        self.unused_percentage() > 20.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new_in_memory().await.expect("Failed to create in-memory database");

        let result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(db.pool())
            .await
            .expect("Failed to query database");

        assert_eq!(result, 1);
        assert!(db.path().is_none());
    }

    #[tokio::test]
    async fn test_database_stats() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let stats = db.get_stats().await.expect("Failed to get stats");

        assert!(stats.page_size > 0);
        assert!(stats.page_count > 0);
        assert!(stats.unused_percentage() <= 100.0);
    }

    #[tokio::test]
    async fn test_integrity_check() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let is_ok = db.check_integrity().await.expect("Failed to check integrity");

        assert!(is_ok, "Database integrity check failed");
    }

    #[tokio::test]
    async fn test_maintain_fresh_database() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let report = db.maintain().await.expect("Maintenance failed");

        assert!(!report.before.should_vacuum());
        assert!(!report.vacuumed);
        assert_eq!(report.before.page_size, report.after.page_size);
    }

    #[tokio::test]
    async fn test_maintain_after_bulk_delete() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let filler = "x".repeat(2000);
        for i in 0..200 {
            sqlx::query("INSERT INTO books (name, supplier_name) VALUES (?, 0)")
                .bind(format!("{filler}{i}"))
                .execute(db.pool())
                .await
                .unwrap();
        }
        sqlx::query("DELETE FROM books").execute(db.pool()).await.unwrap();

        let report = db.maintain().await.expect("Maintenance failed");
        if report.vacuumed {
            assert!(report.after.total_size < report.before.total_size);
        } else {
            assert!(!report.before.should_vacuum());
        }
        assert!(!report.after.should_vacuum());
    }

    #[test]
    fn test_should_vacuum_threshold() {
        let stats = |free: u64| DatabaseStats {
            page_count: 10,
            page_size: 4096,
            freelist_count: free,
            total_size: 10 * 4096,
            unused_size: free * 4096,
        };
        assert!(!stats(2).should_vacuum());
        assert!(stats(3).should_vacuum());
        assert_eq!(stats(0).unused_percentage(), 0.0);
    }

    #[test]
    fn test_default_path_ends_with_file_name() {
        let path = Database::get_default_path();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(DATABASE_FILE_NAME));
    }
}
