//! The persisted shopping cart.
//!
//! [`CartStore`] owns the canonical cart. Mutations replace the whole cart
//! with a new immutable snapshot, notify subscribers, and hand the snapshot
//! to the background writer. Callers see the new state as soon as the
//! mutation returns; the write to storage finishes later.

use std::num::NonZeroU32;
use std::sync::Arc;

use go_marketplace_core::{AddOutcome, Cart, CartError, CartItem, Decrement, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::codec;
use crate::config::CartConfig;
use crate::error::Result;
use crate::persist::{PersistError, PersistHandle, PersistStatus};
use crate::storage::KeyValueStore;

/// How the cart was initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hydration {
    /// Nothing was stored; the cart started empty.
    Empty,
    /// The stored cart was loaded.
    Restored {
        /// Number of line items loaded.
        items: usize,
    },
    /// A stored cart existed but was malformed; the cart started empty.
    Recovered {
        /// Why decoding failed.
        reason: String,
    },
}

/// Shopping cart backed by a key-value store.
///
/// Pass the store explicitly to whatever needs it. Readers that only need to
/// observe the cart can hold a [`watch::Receiver`] from [`CartStore::subscribe`].
#[derive(Debug)]
pub struct CartStore {
    cart: Arc<Cart>,
    changes: watch::Sender<Arc<Cart>>,
    persist: PersistHandle,
    hydration: Hydration,
}

impl CartStore {
    /// Load the cart from `store` and start the background writer.
    ///
    /// A missing key yields an empty cart. A malformed stored cart yields an
    /// empty cart reported as [`Hydration::Recovered`], unless
    /// `config.strict_decode` is set.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::Storage` if the read fails, or
    /// `CartStoreError::Decode` for a malformed cart in strict mode.
    #[instrument(skip(store, config), fields(key = %config.storage_key))]
    pub async fn load<S>(store: S, config: &CartConfig) -> Result<Self>
    where
        S: KeyValueStore + 'static,
    {
        let stored = store.get(&config.storage_key).await?;

        let (cart, hydration) = match stored {
            None => {
                debug!("No stored cart, starting empty");
                (Cart::new(), Hydration::Empty)
            }
            Some(bytes) => match codec::decode(&bytes) {
                Ok(cart) => {
                    let items = cart.len();
                    info!(items, "Restored cart");
                    (cart, Hydration::Restored { items })
                }
                Err(e) if config.strict_decode => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Stored cart is malformed, starting empty");
                    (
                        Cart::new(),
                        Hydration::Recovered {
                            reason: e.to_string(),
                        },
                    )
                }
            },
        };

        let cart = Arc::new(cart);
        let (changes, _) = watch::channel(Arc::clone(&cart));
        let persist = PersistHandle::spawn(
            Arc::new(store),
            config.storage_key.clone(),
            config.persist,
            Arc::clone(&cart),
        );

        Ok(Self {
            cart,
            changes,
            persist,
            hydration,
        })
    }

    /// How the cart was initialized.
    #[must_use]
    pub const fn hydration(&self) -> &Hydration {
        &self.hydration
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Current cart snapshot. Later mutations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Cart> {
        Arc::clone(&self.cart)
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Look up the line item for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.cart.get(id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.cart.total_quantity()
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver starts at the current snapshot and sees every snapshot
    /// published after it, coalesced to the latest if it falls behind.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.changes.subscribe()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`.
    pub fn add(&mut self, product: Product) -> AddOutcome {
        self.add_quantity(product, NonZeroU32::MIN)
    }

    /// Add `quantity` units of `product`.
    ///
    /// If the product is already in the cart only its quantity changes; the
    /// title, image and price supplied here are ignored.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_quantity(&mut self, product: Product, quantity: NonZeroU32) -> AddOutcome {
        let mut next = Cart::clone(&self.cart);
        let outcome = next.add(product, quantity);
        debug!(?outcome, "Added to cart");
        self.commit(next);
        outcome
    }

    /// Increase a product's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart.
    /// The cart is left untouched and nothing is written.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn increment(&mut self, id: &ProductId) -> std::result::Result<NonZeroU32, CartError> {
        let mut next = Cart::clone(&self.cart);
        let quantity = next.increment(id).inspect_err(|e| {
            warn!(error = %e, "Increment ignored");
        })?;
        debug!(quantity = quantity.get(), "Incremented");
        self.commit(next);
        Ok(quantity)
    }

    /// Decrease a product's quantity by one, removing it when it reaches zero.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the product is not in the cart.
    /// The cart is left untouched and nothing is written.
    #[instrument(skip(self), fields(product_id = %id))]
    pub fn decrement(&mut self, id: &ProductId) -> std::result::Result<Decrement, CartError> {
        let mut next = Cart::clone(&self.cart);
        let outcome = next.decrement(id).inspect_err(|e| {
            warn!(error = %e, "Decrement ignored");
        })?;
        debug!(?outcome, "Decremented");
        self.commit(next);
        Ok(outcome)
    }

    fn commit(&mut self, next: Cart) {
        let next = Arc::new(next);
        self.cart = Arc::clone(&next);
        self.changes.send_replace(Arc::clone(&next));
        self.persist.schedule(next);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Result of the most recent write.
    #[must_use]
    pub fn persist_status(&self) -> PersistStatus {
        self.persist.status()
    }

    /// Subscribe to write results, e.g. to surface failures to the user.
    #[must_use]
    pub fn subscribe_persist(&self) -> watch::Receiver<PersistStatus> {
        self.persist.subscribe()
    }

    /// Wait until the current cart is in storage.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::WriteFailed` if the writer gave up on the
    /// current state. The in-memory cart is unaffected.
    pub async fn flush(&self) -> std::result::Result<(), PersistError> {
        self.persist.flush().await
    }
}
