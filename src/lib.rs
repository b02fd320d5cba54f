uniffi::setup_scaffolding!();

pub mod contract;
pub mod error;
pub mod provider;
pub mod storage;

// JNI bridge for Android
#[cfg(target_os = "android")]
mod jni_bridge;

pub use error::InventoryError;

/// Check a supplier code from the platform side
#[uniffi::export]
pub fn is_valid_supplier(code: i32) -> bool {
    contract::is_valid_supplier(code)
}

/// Collection URI of the books table
#[uniffi::export]
pub fn books_content_uri() -> String {
    contract::content_uri().to_string()
}

/// Display name for a supplier code, `None` for unknown codes
#[uniffi::export]
pub fn supplier_display_name(code: i32) -> Option<String> {
    contract::Supplier::from_code(code).map(|s| s.display_name().to_string())
}
