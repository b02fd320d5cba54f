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


//! Database migrations
//!
//! Schema creation runs as plain SQL at startup instead of sqlx's
//! compile-time migrations, which need a database at build time and don't
//! fit a library that ships inside a mobile app.
//!
//! Table and column names come from [`crate::contract`].

use crate::contract::{
    COLUMN_BOOK_NAME, COLUMN_BOOK_PRICE, COLUMN_BOOK_QUANTITY, COLUMN_BOOK_SUPPLIER_NAME,
    COLUMN_BOOK_SUPPLIER_PHONE, SUPPLIER_NAME_AK, SUPPLIER_NAME_HOWARTH_PRESS,
    SUPPLIER_NAME_PEARSON, TABLE_NAME, _ID,
};
use crate::error::Result;
use sqlx::{Executor, SqlitePool};
use tracing::info;

/// Run all database migrations
///
/// Applied migrations are tracked in the `_migrations` table.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    run_migration(pool, 1, "create_books", create_books_table(pool)).await?;

    Ok(())
}

async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    info!(id, name, "Applied migration");
    Ok(())
}

/// SQL for the books table, built from the contract constants
pub fn books_table_sql() -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {TABLE_NAME} (
    {_ID} INTEGER PRIMARY KEY AUTOINCREMENT,
    {COLUMN_BOOK_NAME} TEXT NOT NULL,
    {COLUMN_BOOK_PRICE} INTEGER NOT NULL DEFAULT 0,
    {COLUMN_BOOK_QUANTITY} INTEGER NOT NULL DEFAULT 0,
    {COLUMN_BOOK_SUPPLIER_NAME} INTEGER NOT NULL DEFAULT {SUPPLIER_NAME_PEARSON}
        CHECK ({COLUMN_BOOK_SUPPLIER_NAME} IN ({SUPPLIER_NAME_PEARSON}, {SUPPLIER_NAME_AK}, {SUPPLIER_NAME_HOWARTH_PRESS})),
    {COLUMN_BOOK_SUPPLIER_PHONE} TEXT
);

CREATE INDEX IF NOT EXISTS idx_books_name ON {TABLE_NAME}({COLUMN_BOOK_NAME});
"#
    )
}

async fn create_books_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(books_table_sql().as_str()).await?;
    Ok(())
}
