//! Go Marketplace Cart - Persisted shopping cart store.
//!
//! Tracks the products a shopper has added and their quantities, and keeps
//! that list in a key-value store so it survives app restarts.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the canonical cart and exposes `add`, `increment`
//!   and `decrement` plus read-only snapshots and change subscriptions
//! - [`persist`] runs a single background writer per store, so storage
//!   always converges on the latest cart
//! - [`storage`] defines the [`KeyValueStore`] trait and its backends
//! - [`codec`] is the persisted JSON format
//!
//! # Example
//!
//! ```no_run
//! use go_marketplace_cart::{CartConfig, CartStore, FileStore};
//! use go_marketplace_core::{Price, Product, ProductId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CartConfig::from_env()?;
//! let mut cart = CartStore::load(FileStore::new(&config.data_dir), &config).await?;
//!
//! cart.add(Product {
//!     id: ProductId::new("p1"),
//!     title: "Pineapple".to_string(),
//!     image_url: "https://img.example.com/p1.jpg".to_string(),
//!     price: Price::from_cents(399),
//! });
//! cart.increment(&ProductId::new("p1"))?;
//!
//! cart.flush().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod codec;
pub mod config;
pub mod error;
pub mod persist;
pub mod storage;
pub mod store;
pub mod telemetry;

pub use config::{CartConfig, ConfigError, LogFormat, PersistConfig};
pub use error::{CartStoreError, Result};
pub use persist::{PersistError, PersistOutcome, PersistStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, Hydration};
