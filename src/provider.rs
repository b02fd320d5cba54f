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


//! Content provider for books
//!
//! Routes content URIs to the books table, the way an Android provider does
//! with a `UriMatcher`:
//!
//! | URI | Match | MIME type |
//! |---|---|---|
//! | `content://com.example.android.books/books` | [`BookUri::Books`] | `CONTENT_LIST_TYPE` |
//! | `content://com.example.android.books/books/<id>` | [`BookUri::BookId`] | `CONTENT_ITEM_TYPE` |
//!
//! Rows are validated before they are written. Every mutation that changes
//! at least one row is broadcast to subscribers with the URI it touched.

use crate::contract;
pub use crate::contract::BookUri;
use crate::error::{InventoryError, Result};
use crate::storage::{queries, Book, BookUpdate, Database, NewBook};
use tokio::sync::broadcast;
use tracing::{debug, info};
use url::Url;

/// Buffered change notifications per subscriber before it starts lagging
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Content provider over the books table
#[derive(Debug, Clone)]
pub struct BookProvider {
    db: Database,
    changes: broadcast::Sender<Url>,
}

impl BookProvider {
    pub fn new(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { db, changes }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Receive the URI of every row or collection that changes from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Url> {
        self.changes.subscribe()
    }

    /// MIME type of the data behind `uri`
    pub fn get_type(&self, uri: &Url) -> Result<&'static str> {
        Ok(BookUri::parse(uri)?.mime_type())
    }

    /// All books for the collection URI, zero or one for an item URI
    pub async fn query(&self, uri: &Url) -> Result<Vec<Book>> {
        let books = match BookUri::parse(uri)? {
            BookUri::Books => queries::list_all_books(self.db.pool()).await?,
            BookUri::BookId(id) => queries::find_book_by_id(self.db.pool(), id)
                .await?
                .into_iter()
                .collect(),
        };

        debug!(%uri, rows = books.len(), "Query");
        Ok(books)
    }

    /// Insert a validated book into the collection
    ///
    /// Returns the URI of the new row.
    pub async fn insert(&self, uri: &Url, book: &NewBook) -> Result<Url> {
        match BookUri::parse(uri)? {
            BookUri::Books => {}
            BookUri::BookId(_) => {
                return Err(InventoryError::invalid_input(format!(
                    "Insertion is not supported for {}",
                    uri
                )))
            }
        }

        book.validate()?;

        let id = queries::insert_book(self.db.pool(), book).await?;
        let new_uri = contract::book_uri(id);

        info!(id, name = %book.name, "Inserted book");
        self.notify_change(uri);
        Ok(new_uri)
    }

    /// Apply a validated partial update
    ///
    /// Returns the number of rows changed.
    pub async fn update(&self, uri: &Url, update: &BookUpdate) -> Result<u64> {
        let target = BookUri::parse(uri)?;

        if update.is_empty() {
            return Ok(0);
        }
        update.validate()?;

        let rows = match target {
            BookUri::Books => queries::update_all_books(self.db.pool(), update).await?,
            BookUri::BookId(id) => queries::update_book(self.db.pool(), id, update).await?,
        };

        if rows > 0 {
            info!(%uri, rows, "Updated books");
            self.notify_change(uri);
        }
        Ok(rows)
    }

    /// Delete the row (or every row for the collection URI)
    ///
    /// Returns the number of rows deleted.
    pub async fn delete(&self, uri: &Url) -> Result<u64> {
        let rows = match BookUri::parse(uri)? {
            BookUri::Books => queries::delete_all_books(self.db.pool()).await?,
            BookUri::BookId(id) => queries::delete_book(self.db.pool(), id).await?,
        };

        if rows > 0 {
            info!(%uri, rows, "Deleted books");
            self.notify_change(uri);
        }
        Ok(rows)
    }

    /// Sell one copy of the book at an item URI
    ///
    /// Returns the remaining quantity.
    pub async fn record_sale(&self, uri: &Url) -> Result<i64> {
        let id = match BookUri::parse(uri)? {
            BookUri::BookId(id) => id,
            BookUri::Books => {
                return Err(InventoryError::invalid_input(format!(
                    "A sale needs a single book URI, got {}",
                    uri
                )))
            }
        };

        let quantity = queries::record_sale(self.db.pool(), id).await?;

        info!(id, quantity, "Recorded sale");
        self.notify_change(uri);
        Ok(quantity)
    }

    fn notify_change(&self, uri: &Url) {
        // No receivers is fine, nobody is watching
        let _ = self.changes.send(uri.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{book_uri, content_uri, Supplier, CONTENT_ITEM_TYPE, CONTENT_LIST_TYPE};

    async fn provider() -> BookProvider {
        let db = Database::new_in_memory().await.expect("Failed to create database");
        BookProvider::new(db)
    }

    fn sample(name: &str) -> NewBook {
        NewBook::new(name.to_string(), Supplier::Ak)
            .with_price(15)
            .with_quantity(1)
    }

    #[test]
    fn test_uri_matching() {
        assert_eq!(BookUri::parse(&content_uri()).unwrap(), BookUri::Books);
        assert_eq!(BookUri::parse(&book_uri(3)).unwrap(), BookUri::BookId(3));
        assert_eq!(
            BookUri::parse_str("content://com.example.android.books/books/").unwrap(),
            BookUri::Books
        );

        for bad in [
            "content://com.example.android.books",
            "content://com.example.android.books/pets",
            "content://com.example.android.books/books/abc",
            "content://com.example.android.books/books/1/extra",
            "content://com.example.other/books",
            "https://com.example.android.books/books",
        ] {
            assert!(
                matches!(BookUri::parse_str(bad), Err(InventoryError::UnknownUri(_))),
                "{bad} should not match"
            );
        }
    }

    #[tokio::test]
    async fn test_get_type() {
        let provider = provider().await;
        assert_eq!(provider.get_type(&content_uri()).unwrap(), CONTENT_LIST_TYPE);
        assert_eq!(provider.get_type(&book_uri(1)).unwrap(), CONTENT_ITEM_TYPE);
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let provider = provider().await;

        let uri = provider.insert(&content_uri(), &sample("Ulysses")).await.unwrap();
        let id = contract::parse_book_id(&uri).expect("item uri");

        let rows = provider.query(&uri).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);

        assert!(provider.query(&book_uri(id + 1)).await.unwrap().is_empty());
        assert_eq!(provider.query(&content_uri()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_rows() {
        let provider = provider().await;

        let mut bad = sample("Bad Supplier");
        bad.supplier_name = -1;
        let err = provider.insert(&content_uri(), &bad).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidSupplier(-1)));

        let err = provider
            .insert(&content_uri(), &sample(""))
            .await
            .unwrap_err();
        assert!(err.is_validation_error());

        let err = provider
            .insert(&content_uri(), &sample("Cheap").with_price(-3))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NegativeValue { field: "price", .. }));

        let err = provider.insert(&book_uri(1), &sample("Item")).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidInput(_)));

        assert!(provider.query(&content_uri()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let provider = provider().await;
        let first = provider.insert(&content_uri(), &sample("One")).await.unwrap();
        provider.insert(&content_uri(), &sample("Two")).await.unwrap();

        let update = BookUpdate {
            quantity: Some(9),
            ..Default::default()
        };
        assert_eq!(provider.update(&first, &update).await.unwrap(), 1);
        assert_eq!(provider.query(&first).await.unwrap()[0].quantity, 9);

        let price = BookUpdate {
            price: Some(30),
            ..Default::default()
        };
        assert_eq!(provider.update(&content_uri(), &price).await.unwrap(), 2);

        let bad = BookUpdate {
            supplier_name: Some(4),
            ..Default::default()
        };
        assert!(provider.update(&first, &bad).await.is_err());

        assert_eq!(provider.delete(&first).await.unwrap(), 1);
        assert_eq!(provider.delete(&first).await.unwrap(), 0);
        assert_eq!(provider.delete(&content_uri()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_change_notifications() {
        let provider = provider().await;
        let mut changes = provider.subscribe();

        let uri = provider.insert(&content_uri(), &sample("Watched")).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), content_uri());

        provider.record_sale(&uri).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), uri);

        // Deleting nothing stays silent
        provider.delete(&book_uri(9999)).await.unwrap();
        provider.delete(&uri).await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), uri);
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_record_sale_requires_item_uri() {
        let provider = provider().await;
        let err = provider.record_sale(&content_uri()).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidInput(_)));

        let err = provider.record_sale(&book_uri(42)).await.unwrap_err();
        assert!(matches!(err, InventoryError::RecordNotFound(_)));
    }
}
