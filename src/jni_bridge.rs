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


//! JNI bridge for Android - exposes the book provider to the app
//!
//! # Architecture
//! Activities / CursorAdapter (Java) → `BookBridge` (Java) → JNI → Rust
//!
//! # Design Patterns
//! 1. **JSON Communication**: All complex data is serialized to JSON for FFI crossing
//! 2. **Error Handling**: All errors are caught and returned as JSON error responses
//! 3. **Async Runtime**: One Tokio runtime executes the async provider calls
//! 4. **No Panics**: All panics are caught to prevent crashes across FFI boundary
//!
//! # Response Format
//! ```json
//! { "success": true, "data": { ... } }
//! ```
//! Or on error:
//! ```json
//! { "success": false, "error": "Error message", "kind": "validation", "user_message": "..." }
//! ```

use crate::error::{InventoryError, Result};
use crate::provider::BookProvider;
use crate::storage::{BookUpdate, Database, NewBook};
use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jint, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Mutex;
use url::Url;

lazy_static::lazy_static! {
    static ref RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    // Provider cache (db_path -> provider)
    static ref PROVIDERS: Mutex<HashMap<String, BookProvider>> = Mutex::new(HashMap::new());
}

/// Get or open the provider for a database path
async fn get_or_create_provider(db_path: &str) -> Result<BookProvider> {
    {
        let providers = PROVIDERS
            .lock()
            .map_err(|_| InventoryError::internal("provider cache poisoned"))?;
        if let Some(provider) = providers.get(db_path) {
            return Ok(provider.clone());
        }
    }

    let provider = BookProvider::new(Database::new(db_path).await?);

    let mut providers = PROVIDERS
        .lock()
        .map_err(|_| InventoryError::internal("provider cache poisoned"))?;
    Ok(providers
        .entry(db_path.to_string())
        .or_insert(provider)
        .clone())
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn jstring_to_string(env: &mut JNIEnv, jstr: JString) -> Result<String> {
    env.get_string(&jstr)
        .map(|s| s.into())
        .map_err(|e| InventoryError::JniError(format!("JNI string conversion failed: {}", e)))
}

fn success_response<T: Serialize>(data: T) -> String {
    serde_json::json!({
        "success": true,
        "data": data
    })
    .to_string()
}

fn error_response(error: &InventoryError) -> String {
    serde_json::json!({
        "success": false,
        "error": error.to_string(),
        "kind": error.kind(),
        "user_message": error.user_message(),
    })
    .to_string()
}

fn panic_response(message: &str) -> String {
    serde_json::json!({
        "success": false,
        "error": format!("Rust panic: {}", message)
    })
    .to_string()
}

/// Wrap a function call with panic catching
fn catch_panic<F>(f: F) -> String
where
    F: FnOnce() -> String,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_err) => {
            let panic_msg = if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic occurred".to_string()
            };
            panic_response(&panic_msg)
        }
    }
}

/// Decode the JSON params, run `handler`, and encode the envelope
fn json_call<P, T, F>(env: &mut JNIEnv, params_json: JString, handler: F) -> jstring
where
    P: DeserializeOwned,
    T: Serialize,
    F: FnOnce(P) -> Result<T>,
{
    let params_str = jstring_to_string(env, params_json);

    let response = catch_panic(move || {
        let result = params_str.and_then(|s| {
            let params: P = serde_json::from_str(&s)
                .map_err(|e| InventoryError::InvalidInput(format!("Invalid JSON: {}", e)))?;
            handler(params)
        });
        match result {
            Ok(data) => success_response(data),
            Err(e) => error_response(&e),
        }
    });

    new_java_string(env, response)
}

fn new_java_string(env: &mut JNIEnv, value: String) -> jstring {
    match env.new_string(value) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[derive(Deserialize)]
struct DbParams {
    db_path: String,
}

#[derive(Deserialize)]
struct UriParams {
    db_path: String,
    uri: String,
}

#[derive(Deserialize)]
struct InsertParams {
    db_path: String,
    book: NewBook,
}

#[derive(Deserialize)]
struct UpdateParams {
    db_path: String,
    uri: String,
    values: BookUpdate,
}

// ============================================================================
// CONTRACT FUNCTIONS
// ============================================================================

/// Check a supplier code
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeIsValidSupplier(
    _env: JNIEnv,
    _class: JClass,
    code: jint,
) -> jboolean {
    if crate::contract::is_valid_supplier(code) {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

/// Collection URI of the books table
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeGetContentUri(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    new_java_string(&mut env, crate::contract::content_uri().to_string())
}

// ============================================================================
// PROVIDER FUNCTIONS
// ============================================================================

/// Open (and migrate) the database
///
/// # Arguments (JSON string)
/// ```json
/// { "db_path": "/data/data/com.example.android.inventory/databases/inventory.db" }
/// ```
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeInitDatabase(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: DbParams| {
        RUNTIME.block_on(async {
            get_or_create_provider(&params.db_path).await?;
            Ok::<_, InventoryError>(serde_json::json!({ "initialized": true }))
        })
    })
}

/// Query the collection or a single row
///
/// # Arguments (JSON string)
/// ```json
/// { "db_path": "...", "uri": "content://com.example.android.books/books" }
/// ```
///
/// # Returns (JSON)
/// `data` holds `{ "mime_type": "...", "books": [ ... ] }`
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeQueryBooks(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: UriParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            let uri = Url::parse(&params.uri)?;
            let mime_type = provider.get_type(&uri)?;
            let books = provider.query(&uri).await?;
            Ok::<_, InventoryError>(serde_json::json!({ "mime_type": mime_type, "books": books }))
        })
    })
}

/// Insert a book; `data.uri` is the new row's URI
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeInsertBook(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: InsertParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            let uri = provider
                .insert(&crate::contract::content_uri(), &params.book)
                .await?;
            Ok::<_, InventoryError>(serde_json::json!({ "uri": uri.to_string() }))
        })
    })
}

/// Partial update; `data.rows` is the number of rows changed
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeUpdateBook(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: UpdateParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            let rows = provider.update(&Url::parse(&params.uri)?, &params.values).await?;
            Ok::<_, InventoryError>(serde_json::json!({ "rows": rows }))
        })
    })
}

/// Delete a row or the whole collection; `data.rows` is the number deleted
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeDeleteBooks(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: UriParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            let rows = provider.delete(&Url::parse(&params.uri)?).await?;
            Ok::<_, InventoryError>(serde_json::json!({ "rows": rows }))
        })
    })
}

/// Sell one copy; `data.quantity` is the remaining stock
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeRecordSale(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: UriParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            let quantity = provider.record_sale(&Url::parse(&params.uri)?).await?;
            Ok::<_, InventoryError>(serde_json::json!({ "quantity": quantity }))
        })
    })
}

/// Integrity check, checkpoint and vacuum when worthwhile
///
/// # Returns (JSON)
/// `data` holds `{ "before": {...}, "after": {...}, "vacuumed": bool }`
#[no_mangle]
pub extern "C" fn Java_com_example_android_inventory_data_BookBridge_nativeMaintainDatabase(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    json_call(&mut env, params_json, |params: DbParams| {
        RUNTIME.block_on(async {
            let provider = get_or_create_provider(&params.db_path).await?;
            provider.database().maintain().await
        })
    })
}
