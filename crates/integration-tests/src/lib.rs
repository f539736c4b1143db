//! Integration tests for Go Marketplace.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Shopper flows against the in-memory store
//! - `cart_persistence` - App restarts against the file store
//!
//! This crate also holds the fixtures shared by those tests.

use std::path::Path;
use std::time::Duration;

use go_marketplace_cart::{CartConfig, LogFormat, PersistConfig};
use go_marketplace_core::{Price, Product, ProductId};

/// Build a catalog product with a predictable image URL.
#[must_use]
pub fn product(id: &str, title: &str, cents: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        image_url: format!("https://img.example.com/{id}.jpg"),
        price: Price::from_cents(cents),
    }
}

/// Configuration with fast retries, rooted at `data_dir`.
///
/// Also installs the tracing subscriber so failing tests show the store's logs.
#[must_use]
pub fn test_config(data_dir: &Path) -> CartConfig {
    let _ = go_marketplace_cart::telemetry::init(LogFormat::Pretty);

    CartConfig {
        data_dir: data_dir.to_path_buf(),
        persist: PersistConfig {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(1),
        },
        ..CartConfig::default()
    }
}
