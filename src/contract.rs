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


//! API contract for the inventory app
//!
//! Single source of truth for the books table, its columns, the closed set of
//! supplier codes and the content URI scheme. Storage, the provider and the
//! platform bridges all name things through this module.
//!
//! # Content URIs
//! - Base: `content://com.example.android.books`
//! - Collection: `content://com.example.android.books/books`
//! - Single row: `content://com.example.android.books/books/<id>`
//!
//! # MIME Types
//! - Collection: `vnd.android.cursor.dir/com.example.android.books/books`
//! - Single row: `vnd.android.cursor.item/com.example.android.books/books`

use crate::error::{InventoryError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// CONTENT URIS
// ============================================================================

/// Authority of the books content provider (unique to this app)
pub const CONTENT_AUTHORITY: &str = "com.example.android.books";

/// Scheme prefix shared by every content URI
pub const SCHEME: &str = "content://";

/// Path segment appended to the base URI for the books collection
pub const PATH_BOOKS: &str = "books";

/// Base MIME type for a URI that names a collection of rows
pub const CURSOR_DIR_BASE_TYPE: &str = "vnd.android.cursor.dir";

/// Base MIME type for a URI that names a single row
pub const CURSOR_ITEM_BASE_TYPE: &str = "vnd.android.cursor.item";

/// MIME type for the list of books
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/com.example.android.books/books";

/// MIME type for a single book
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/com.example.android.books/books";

/// `content://com.example.android.books`
pub fn base_content_uri() -> Url {
    Url::parse(&format!("{SCHEME}{CONTENT_AUTHORITY}"))
        .expect("content authority is a valid URI host")
}

/// Collection URI for the books table: the base URI with `books` appended
pub fn content_uri() -> Url {
    let mut uri = base_content_uri();
    uri.set_path(&format!("/{PATH_BOOKS}"));
    uri
}

/// URI of a single book row (`content_uri()` + `/<id>`)
pub fn book_uri(id: i64) -> Url {
    let mut uri = content_uri();
    uri.set_path(&format!("/{PATH_BOOKS}/{id}"));
    uri
}

/// Extract the row id from a single-book URI
///
/// Returns `None` for the collection URI and for anything [`BookUri::parse`]
/// rejects.
pub fn parse_book_id(uri: &Url) -> Option<i64> {
    match BookUri::parse(uri).ok()? {
        BookUri::BookId(id) => Some(id),
        BookUri::Books => None,
    }
}

/// Result of matching a content URI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookUri {
    /// The whole books table
    Books,
    /// A single row
    BookId(i64),
}

impl BookUri {
    /// Match a URI against the books patterns
    pub fn parse(uri: &Url) -> Result<Self> {
        let unknown = || InventoryError::UnknownUri(uri.to_string());

        if uri.scheme() != "content" || uri.host_str() != Some(CONTENT_AUTHORITY) {
            return Err(unknown());
        }

        let segments: Vec<&str> = uri
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [PATH_BOOKS] => Ok(BookUri::Books),
            [PATH_BOOKS, id] => id.parse().map(BookUri::BookId).map_err(|_| unknown()),
            _ => Err(unknown()),
        }
    }

    pub fn parse_str(uri: &str) -> Result<Self> {
        Self::parse(&Url::parse(uri)?)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            BookUri::Books => CONTENT_LIST_TYPE,
            BookUri::BookId(_) => CONTENT_ITEM_TYPE,
        }
    }

    pub fn to_url(self) -> Url {
        match self {
            BookUri::Books => content_uri(),
            BookUri::BookId(id) => book_uri(id),
        }
    }
}

/// Derive the collection MIME type from its parts
pub fn list_type() -> String {
    format!("{CURSOR_DIR_BASE_TYPE}/{CONTENT_AUTHORITY}/{PATH_BOOKS}")
}

/// Derive the single-item MIME type from its parts
pub fn item_type() -> String {
    format!("{CURSOR_ITEM_BASE_TYPE}/{CONTENT_AUTHORITY}/{PATH_BOOKS}")
}

// ============================================================================
// BOOKS TABLE
// ============================================================================

/// Name of the database table for books. Each row is a single book.
pub const TABLE_NAME: &str = "books";

/// Unique id of the book (only for use in the database table).
///
/// Type: INTEGER
pub const _ID: &str = "_id";

/// Name of the book.
///
/// Type: TEXT
pub const COLUMN_BOOK_NAME: &str = "name";

/// Price of the book.
///
/// Type: INTEGER
pub const COLUMN_BOOK_PRICE: &str = "price";

/// Quantity in stock.
///
/// Type: INTEGER
pub const COLUMN_BOOK_QUANTITY: &str = "quantity";

/// Supplier of the book. Only [`SUPPLIER_NAME_PEARSON`], [`SUPPLIER_NAME_AK`]
/// and [`SUPPLIER_NAME_HOWARTH_PRESS`] are allowed.
///
/// Type: INTEGER
pub const COLUMN_BOOK_SUPPLIER_NAME: &str = "supplier_name";

/// Supplier contact phone.
///
/// Type: TEXT
pub const COLUMN_BOOK_SUPPLIER_PHONE: &str = "supplier_phone";

/// Every column in schema order
pub const COLUMNS: [&str; 6] = [
    _ID,
    COLUMN_BOOK_NAME,
    COLUMN_BOOK_PRICE,
    COLUMN_BOOK_QUANTITY,
    COLUMN_BOOK_SUPPLIER_NAME,
    COLUMN_BOOK_SUPPLIER_PHONE,
];

// Possible values for the supplier column
pub const SUPPLIER_NAME_PEARSON: i32 = 0;
pub const SUPPLIER_NAME_AK: i32 = 1;
pub const SUPPLIER_NAME_HOWARTH_PRESS: i32 = 2;

// ============================================================================
// SUPPLIERS
// ============================================================================

/// Book supplier, stored as its integer code in `supplier_name`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Supplier {
    Pearson = SUPPLIER_NAME_PEARSON,
    Ak = SUPPLIER_NAME_AK,
    HowarthPress = SUPPLIER_NAME_HOWARTH_PRESS,
}

impl Supplier {
    /// All suppliers ordered by code
    pub const fn all() -> [Supplier; 3] {
        [Supplier::Pearson, Supplier::Ak, Supplier::HowarthPress]
    }

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            SUPPLIER_NAME_PEARSON => Some(Supplier::Pearson),
            SUPPLIER_NAME_AK => Some(Supplier::Ak),
            SUPPLIER_NAME_HOWARTH_PRESS => Some(Supplier::HowarthPress),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Supplier::Pearson => "Pearson",
            Supplier::Ak => "AK",
            Supplier::HowarthPress => "Howarth Press",
        }
    }
}

impl TryFrom<i32> for Supplier {
    type Error = InventoryError;

    fn try_from(code: i32) -> Result<Self> {
        Supplier::from_code(code).ok_or(InventoryError::InvalidSupplier(code))
    }
}

impl std::fmt::Display for Supplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returns whether `code` is one of the defined supplier codes
pub fn is_valid_supplier(code: i32) -> bool {
    Supplier::from_code(code).is_some()
}
