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


//! Database models
//!
//! Row types for the books table described in [`crate::contract`].
//!
//! - [`Book`]: a stored row, read back with its generated id
//! - [`NewBook`]: values for an insert
//! - [`BookUpdate`]: partial update, only the `Some` fields are written

use crate::contract::{self, Supplier};
use crate::error::{InventoryError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// Book row
///
/// `supplier_name` stays the raw integer code as stored; use
/// [`Book::supplier`] for the typed value.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Book {
    /// Primary key (auto-increment), immutable once assigned
    #[sqlx(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
    pub supplier_name: i32,
    #[sqlx(default)]
    pub supplier_phone: Option<String>,
}

impl Book {
    /// Typed supplier, `None` only if the row was written around the schema check
    pub fn supplier(&self) -> Option<Supplier> {
        Supplier::from_code(self.supplier_name)
    }

    /// Content URI addressing this row
    pub fn uri(&self) -> url::Url {
        contract::book_uri(self.id)
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// New book record for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
    pub supplier_name: i32,
    #[serde(default)]
    pub supplier_phone: Option<String>,
}

impl NewBook {
    pub fn new(name: String, supplier: Supplier) -> Self {
        Self {
            name,
            price: 0,
            quantity: 0,
            supplier_name: supplier.code(),
            supplier_phone: None,
        }
    }

    pub fn with_price(mut self, price: i64) -> Self {
        self.price = price;
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_supplier_phone(mut self, phone: impl Into<String>) -> Self {
        self.supplier_phone = Some(phone.into());
        self
    }

    /// Check the row before it reaches the database
    ///
    /// Requires a non-blank name, a known supplier code and non-negative
    /// price and quantity.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_supplier(self.supplier_name)?;
        validate_non_negative(contract::COLUMN_BOOK_PRICE, self.price)?;
        validate_non_negative(contract::COLUMN_BOOK_QUANTITY, self.quantity)?;
        Ok(())
    }
}

/// Partial update of a book row
///
/// Fields left as `None` keep their stored value. `supplier_phone` is the one
/// nullable column: `Some(None)` clears it, and in JSON an explicit `null`
/// clears it while a missing key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub supplier_name: Option<i32>,
    #[serde(
        default,
        deserialize_with = "present_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier_phone: Option<Option<String>>,
}

/// Maps a key that is present (even as `null`) to `Some`
fn present_field<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.supplier_name.is_none()
            && self.supplier_phone.is_none()
    }

    /// Same rules as [`NewBook::validate`], applied to the present fields only
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(code) = self.supplier_name {
            validate_supplier(code)?;
        }
        if let Some(price) = self.price {
            validate_non_negative(contract::COLUMN_BOOK_PRICE, price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_non_negative(contract::COLUMN_BOOK_QUANTITY, quantity)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(InventoryError::MissingRequiredField(
            contract::COLUMN_BOOK_NAME.to_string(),
        ));
    }
    Ok(())
}

fn validate_supplier(code: i32) -> Result<()> {
    if !contract::is_valid_supplier(code) {
        return Err(InventoryError::InvalidSupplier(code));
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(InventoryError::NegativeValue { field, value });
    }
    Ok(())
}
