//! Cart line items and the ordered cart collection.
//!
//! [`Cart`] holds the merge rules for the shopping cart:
//!
//! - Adding a product that is already in the cart only bumps its quantity.
//!   The title, image and price of the first-added entry are kept.
//! - Adding a new product appends it, so display order is insertion order.
//! - Decrementing an item with a quantity of one removes it.
//!
//! Quantities are [`NonZeroU32`], so an item with a zero quantity cannot be
//! represented at all.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Errors returned by cart operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No line item exists for the product.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),
    /// Two line items share the same product ID.
    #[error("product {0} appears more than once in the cart")]
    DuplicateItem(ProductId),
}

/// A product as offered by the catalog, before it is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
}

/// One distinct product in the cart.
///
/// The serialized field names (`id`, `title`, `image_url`, `price`,
/// `quantity`) are the persisted format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Product image URL.
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    /// Unit price.
    pub price: Price,
    /// Number of units in the cart.
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// Create a line item for `product` with the given quantity.
    #[must_use]
    pub fn new(product: Product, quantity: NonZeroU32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity,
        }
    }
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The product was new and has been appended.
    Inserted {
        /// Quantity of the new line item.
        quantity: NonZeroU32,
    },
    /// The product was already in the cart; its quantity was increased.
    Merged {
        /// Quantity after the merge.
        quantity: NonZeroU32,
    },
}

/// Result of [`Cart::decrement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The quantity went down and the item is still in the cart.
    Decreased(NonZeroU32),
    /// The item had a quantity of one and was removed.
    Removed,
}

/// Ordered collection of cart line items, unique by product ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from previously stored items.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateItem`] if two items share a product ID.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartError> {
        for (index, item) in items.iter().enumerate() {
            if items.iter().skip(index + 1).any(|other| other.id == item.id) {
                return Err(CartError::DuplicateItem(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities, as shown on the cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line keeps its metadata and only its quantity grows
    /// (saturating at `u32::MAX`). A new product is appended at the end.
    pub fn add(&mut self, product: Product, quantity: NonZeroU32) -> AddOutcome {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == product.id) {
            item.quantity = item.quantity.saturating_add(quantity.get());
            return AddOutcome::Merged {
                quantity: item.quantity,
            };
        }

        self.items.push(CartItem::new(product, quantity));
        AddOutcome::Inserted { quantity }
    }

    /// Increase the quantity of a product by one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn increment(&mut self, id: &ProductId) -> Result<NonZeroU32, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        item.quantity = item.quantity.saturating_add(1);
        Ok(item.quantity)
    }

    /// Decrease the quantity of a product by one, removing it at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if the product is not in the cart.
    pub fn decrement(&mut self, id: &ProductId) -> Result<Decrement, CartError> {
        let index = self
            .position(id)
            .ok_or_else(|| CartError::ItemNotFound(id.clone()))?;

        let Some(item) = self.items.get_mut(index) else {
            return Err(CartError::ItemNotFound(id.clone()));
        };

        match NonZeroU32::new(item.quantity.get() - 1) {
            Some(quantity) => {
                item.quantity = quantity;
                Ok(Decrement::Decreased(quantity))
            }
            None => {
                self.items.remove(index);
                Ok(Decrement::Removed)
            }
        }
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<CartItem>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}
