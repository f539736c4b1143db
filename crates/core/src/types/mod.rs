//! Core types for Go Marketplace.
//!
//! This module provides type-safe wrappers for cart domain concepts.

pub mod cart;
pub mod id;
pub mod price;

pub use cart::{AddOutcome, Cart, CartError, CartItem, Decrement, Product};
pub use id::*;
pub use price::{MAX_SIGNIFICANT_DIGITS, Price, PriceError};
