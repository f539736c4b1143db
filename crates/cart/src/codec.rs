//! Persisted cart format.
//!
//! The cart is stored as a JSON array of line items in display order:
//!
//! ```json
//! [{"id":"p2","title":"X","image_url":"u","price":5,"quantity":3}]
//! ```
//!
//! This is the exact layout earlier app releases wrote, so it carries no
//! version tag. `imageUrl` is accepted as an alias when reading.

use go_marketplace_core::{Cart, CartError, CartItem};
use thiserror::Error;

/// Errors encoding or decoding a stored cart.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not a valid JSON array of line items.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The items parsed but do not form a valid cart.
    #[error("Invalid cart: {0}")]
    Invalid(#[from] CartError),
}

/// Serialize a cart to its stored representation.
///
/// # Errors
///
/// Returns `CodecError::Json` if serialization fails.
pub fn encode(cart: &Cart) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(cart.items())?)
}

/// Parse a stored cart.
///
/// # Errors
///
/// Returns `CodecError::Json` for malformed JSON or missing/invalid fields
/// (including a zero quantity or negative price) and `CodecError::Invalid`
/// if two items share a product ID.
pub fn decode(bytes: &[u8]) -> Result<Cart, CodecError> {
    let items: Vec<CartItem> = serde_json::from_slice(bytes)?;
    Ok(Cart::from_items(items)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use go_marketplace_core::{Price, Product, ProductId};

    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        for (id, cents, qty) in [("b", 1999, 2), ("a", 500, 1), ("c", 0, 7)] {
            cart.add(
                Product {
                    id: ProductId::new(id),
                    title: format!("Title {id}"),
                    image_url: format!("https://img.example.com/{id}.jpg"),
                    price: Price::from_cents(cents),
                },
                NonZeroU32::new(qty).unwrap(),
            );
        }
        cart
    }

    #[test]
    fn test_roundtrip_preserves_order_and_fields() {
        let cart = sample_cart();
        let decoded = decode(&encode(&cart).unwrap()).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_empty_cart_encodes_as_empty_array() {
        assert_eq!(encode(&Cart::new()).unwrap(), b"[]");
    }

    #[test]
    fn test_decode_legacy_blob() {
        let blob = br#"[{"id":"p2","title":"X","image_url":"u","price":5,"quantity":3}]"#;
        let cart = decode(blob).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_decode_garbage_is_json_error() {
        assert!(matches!(decode(b"not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode(br#"{"id":"p1"}"#), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_decode_duplicate_is_invalid() {
        let blob = br#"[
            {"id":"p1","title":"X","image_url":"u","price":5,"quantity":1},
            {"id":"p1","title":"X","image_url":"u","price":5,"quantity":1}
        ]"#;
        assert!(matches!(
            decode(blob),
            Err(CodecError::Invalid(CartError::DuplicateItem(_)))
        ));
    }
}
