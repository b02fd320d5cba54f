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


//! Database storage and models
//!
//! This module keeps the books table of [`crate::contract`] in SQLite via sqlx.
//!
//! # Usage Example
//! ```no_run
//! use inventory_core::contract::Supplier;
//! use inventory_core::storage::{Database, queries, NewBook};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./inventory.db").await?;
//!
//! let book = NewBook::new("The Hobbit".to_string(), Supplier::Pearson).with_quantity(4);
//! let id = queries::insert_book(db.pool(), &book).await?;
//!
//! let remaining = queries::record_sale(db.pool(), id).await?;
//! assert_eq!(remaining, 3);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, DatabaseStats, MaintenanceReport};
pub use models::{Book, BookUpdate, NewBook};
