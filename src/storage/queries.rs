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


//! Database query functions
//!
//! Repository functions for the books table. Statements are assembled from
//! the contract constants so a renamed column only changes in one place.
//!
//! Callers that need validation go through [`crate::provider::BookProvider`];
//! these functions only rely on the schema's own constraints.

use crate::contract::{
    COLUMN_BOOK_NAME as NAME, COLUMN_BOOK_PRICE as PRICE, COLUMN_BOOK_QUANTITY as QUANTITY,
    COLUMN_BOOK_SUPPLIER_NAME as SUPPLIER_NAME, COLUMN_BOOK_SUPPLIER_PHONE as SUPPLIER_PHONE,
    TABLE_NAME, _ID,
};
use crate::error::{InventoryError, Result};
use crate::storage::models::*;
use sqlx::SqlitePool;

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book
///
/// Returns the generated `_id`.
pub async fn insert_book(pool: &SqlitePool, book: &NewBook) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {TABLE_NAME} ({NAME}, {PRICE}, {QUANTITY}, {SUPPLIER_NAME}, {SUPPLIER_PHONE}) \
         VALUES (?, ?, ?, ?, ?)"
    );
    let result = sqlx::query(&sql)
        .bind(&book.name)
        .bind(book.price)
        .bind(book.quantity)
        .bind(book.supplier_name)
        .bind(&book.supplier_phone)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Book>> {
    let sql = format!("SELECT * FROM {TABLE_NAME} WHERE {_ID} = ?");
    let book = sqlx::query_as::<_, Book>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(book)
}

/// List books ordered by id with pagination
pub async fn list_books(pool: &SqlitePool, limit: i64, offset: i64) -> Result<Vec<Book>> {
    let sql = format!("SELECT * FROM {TABLE_NAME} ORDER BY {_ID} LIMIT ? OFFSET ?");
    let books = sqlx::query_as::<_, Book>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(books)
}

/// List every book
pub async fn list_all_books(pool: &SqlitePool) -> Result<Vec<Book>> {
    // LIMIT -1 means no limit in SQLite
    list_books(pool, -1, 0).await
}

/// Search books by name (case-insensitive substring match)
pub async fn search_books_by_name(pool: &SqlitePool, query: &str, limit: i64) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT * FROM {TABLE_NAME} WHERE {NAME} LIKE ? ESCAPE '\\' ORDER BY {NAME} LIMIT ?"
    );
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{}%", escaped);
    let books = sqlx::query_as::<_, Book>(&sql)
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(books)
}

/// Count total books
pub async fn count_books(pool: &SqlitePool) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {TABLE_NAME}");
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;

    Ok(count)
}

/// SET clause shared by the partial updates
///
/// Binds, in order: name, price, quantity, supplier, then a flag and a value
/// for the phone so it can be set to NULL.
fn update_assignments() -> String {
    format!(
        "{NAME} = COALESCE(?, {NAME}), \
         {PRICE} = COALESCE(?, {PRICE}), \
         {QUANTITY} = COALESCE(?, {QUANTITY}), \
         {SUPPLIER_NAME} = COALESCE(?, {SUPPLIER_NAME}), \
         {SUPPLIER_PHONE} = CASE WHEN ? THEN ? ELSE {SUPPLIER_PHONE} END"
    )
}

/// Apply a partial update
///
/// Returns the number of rows changed (0 or 1). An empty update touches
/// nothing and returns 0.
pub async fn update_book(pool: &SqlitePool, id: i64, update: &BookUpdate) -> Result<u64> {
    if update.is_empty() {
        return Ok(0);
    }

    let sql = format!("UPDATE {TABLE_NAME} SET {} WHERE {_ID} = ?", update_assignments());
    let result = sqlx::query(&sql)
        .bind(&update.name)
        .bind(update.price)
        .bind(update.quantity)
        .bind(update.supplier_name)
        .bind(update.supplier_phone.is_some())
        .bind(update.supplier_phone.as_ref().and_then(|p| p.as_deref()))
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Apply the same partial update to every row
pub async fn update_all_books(pool: &SqlitePool, update: &BookUpdate) -> Result<u64> {
    if update.is_empty() {
        return Ok(0);
    }

    let sql = format!("UPDATE {TABLE_NAME} SET {}", update_assignments());
    let result = sqlx::query(&sql)
        .bind(&update.name)
        .bind(update.price)
        .bind(update.quantity)
        .bind(update.supplier_name)
        .bind(update.supplier_phone.is_some())
        .bind(update.supplier_phone.as_ref().and_then(|p| p.as_deref()))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete a book
///
/// Returns the number of rows deleted (0 or 1).
pub async fn delete_book(pool: &SqlitePool, id: i64) -> Result<u64> {
    let sql = format!("DELETE FROM {TABLE_NAME} WHERE {_ID} = ?");
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    Ok(result.rows_affected())
}

/// Delete every book
pub async fn delete_all_books(pool: &SqlitePool) -> Result<u64> {
    let sql = format!("DELETE FROM {TABLE_NAME}");
    let result = sqlx::query(&sql).execute(pool).await?;

    Ok(result.rows_affected())
}

// ============================================================================
// STOCK HELPERS
// ============================================================================

/// Change the stock by `delta`, clamping at zero
///
/// The sum saturates instead of overflowing, so any `delta` is accepted.
/// Returns the new quantity.
pub async fn adjust_quantity(pool: &SqlitePool, id: i64, delta: i64) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let sql = format!("SELECT {QUANTITY} FROM {TABLE_NAME} WHERE {_ID} = ?");
    let current: i64 = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| InventoryError::not_found(format!("book {}", id)))?;

    let quantity = current.saturating_add(delta).max(0);

    let sql = format!("UPDATE {TABLE_NAME} SET {QUANTITY} = ? WHERE {_ID} = ?");
    sqlx::query(&sql)
        .bind(quantity)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(quantity)
}

/// Sell one copy: decrement the stock by one, never below zero
///
/// Returns the new quantity.
pub async fn record_sale(pool: &SqlitePool, id: i64) -> Result<i64> {
    adjust_quantity(pool, id, -1).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Supplier;
    use crate::storage::database::Database;

    fn sample(name: &str) -> NewBook {
        NewBook::new(name.to_string(), Supplier::Pearson)
            .with_price(20)
            .with_quantity(2)
            .with_supplier_phone("555-0199")
    }

    #[tokio::test]
    async fn test_insert_and_find_book() {
        let db = Database::new_in_memory().await.expect("Failed to create database");

        let id = insert_book(db.pool(), &sample("Test Book"))
            .await
            .expect("Failed to insert book");
        assert!(id > 0);

        let book = find_book_by_id(db.pool(), id)
            .await
            .expect("Failed to find book")
            .expect("Book missing");

        assert_eq!(book.name, "Test Book");
        assert_eq!(book.price, 20);
        assert_eq!(book.quantity, 2);
        assert_eq!(book.supplier(), Some(Supplier::Pearson));
        assert_eq!(book.supplier_phone.as_deref(), Some("555-0199"));

        assert!(find_book_by_id(db.pool(), id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let id = insert_book(db.pool(), &sample("Original")).await.unwrap();

        let update = BookUpdate {
            name: Some("Renamed".to_string()),
            supplier_name: Some(Supplier::HowarthPress.code()),
            ..Default::default()
        };
        let changed = update_book(db.pool(), id, &update).await.unwrap();
        assert_eq!(changed, 1);

        let book = find_book_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(book.name, "Renamed");
        assert_eq!(book.supplier(), Some(Supplier::HowarthPress));
        assert_eq!(book.price, 20, "untouched fields keep their value");

        assert_eq!(update_book(db.pool(), id, &BookUpdate::default()).await.unwrap(), 0);
        assert_eq!(update_book(db.pool(), 9999, &update).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_sale_stops_at_zero() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let id = insert_book(db.pool(), &sample("Stocked")).await.unwrap();

        assert_eq!(record_sale(db.pool(), id).await.unwrap(), 1);
        assert_eq!(record_sale(db.pool(), id).await.unwrap(), 0);
        assert_eq!(record_sale(db.pool(), id).await.unwrap(), 0);

        assert_eq!(adjust_quantity(db.pool(), id, 5).await.unwrap(), 5);

        let missing = record_sale(db.pool(), 9999).await;
        assert!(matches!(missing, Err(InventoryError::RecordNotFound(_))));
    }

    #[tokio::test]
    async fn test_adjust_quantity_saturates() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let id = insert_book(db.pool(), &sample("Bestseller")).await.unwrap();

        assert_eq!(adjust_quantity(db.pool(), id, i64::MAX).await.unwrap(), i64::MAX);
        assert_eq!(adjust_quantity(db.pool(), id, 1).await.unwrap(), i64::MAX);
        assert_eq!(adjust_quantity(db.pool(), id, i64::MIN).await.unwrap(), 0);

        let book = find_book_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(book.quantity, 0);
    }

    #[tokio::test]
    async fn test_update_clears_supplier_phone() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        let id = insert_book(db.pool(), &sample("Phoned")).await.unwrap();
        let other = insert_book(db.pool(), &sample("Also Phoned")).await.unwrap();

        let keep = BookUpdate {
            price: Some(25),
            ..Default::default()
        };
        update_book(db.pool(), id, &keep).await.unwrap();
        let book = find_book_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(book.supplier_phone.as_deref(), Some("555-0199"));

        let clear = BookUpdate {
            supplier_phone: Some(None),
            ..Default::default()
        };
        assert_eq!(update_book(db.pool(), id, &clear).await.unwrap(), 1);
        let book = find_book_by_id(db.pool(), id).await.unwrap().unwrap();
        assert_eq!(book.supplier_phone, None);
        assert_eq!(book.price, 25);

        let untouched = find_book_by_id(db.pool(), other).await.unwrap().unwrap();
        assert_eq!(untouched.supplier_phone.as_deref(), Some("555-0199"));

        assert_eq!(update_all_books(db.pool(), &clear).await.unwrap(), 2);
        let untouched = find_book_by_id(db.pool(), other).await.unwrap().unwrap();
        assert_eq!(untouched.supplier_phone, None);
    }

    #[tokio::test]
    async fn test_search_list_and_delete() {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        insert_book(db.pool(), &sample("The Hobbit")).await.unwrap();
        insert_book(db.pool(), &sample("100% Rust")).await.unwrap();
        let id = insert_book(db.pool(), &sample("Middlemarch")).await.unwrap();

        let hits = search_books_by_name(db.pool(), "hobbit", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "The Hobbit");

        let hits = search_books_by_name(db.pool(), "%", 10).await.unwrap();
        assert_eq!(hits.len(), 1, "wildcards are matched literally");

        assert_eq!(list_books(db.pool(), 2, 0).await.unwrap().len(), 2);
        assert_eq!(list_all_books(db.pool()).await.unwrap().len(), 3);

        assert_eq!(delete_book(db.pool(), id).await.unwrap(), 1);
        assert_eq!(count_books(db.pool()).await.unwrap(), 2);

        assert_eq!(delete_all_books(db.pool()).await.unwrap(), 2);
        assert_eq!(count_books(db.pool()).await.unwrap(), 0);
    }
}
