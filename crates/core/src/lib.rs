//! Go Marketplace Core - Shared cart types.
//!
//! This crate provides the cart domain model used by the cart store:
//! - [`Product`] - A catalog product the shopper can add
//! - [`CartItem`] - One distinct product in the cart with its quantity
//! - [`Cart`] - The ordered collection and its add/increment/decrement rules
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! persistence, no async runtime. Storage and change notification live in
//! `go-marketplace-cart`.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices and the cart collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
