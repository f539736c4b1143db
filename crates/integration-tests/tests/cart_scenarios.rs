//! Integration tests for shopper flows through the cart store.
//!
//! These run against `MemoryStore`, so they exercise the store, the merge
//! rules and the background writer without touching the filesystem.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::num::NonZeroU32;

use go_marketplace_cart::{CartConfig, CartStore, Hydration, KeyValueStore, MemoryStore, codec};
use go_marketplace_core::{AddOutcome, CartError, Decrement, ProductId};
use go_marketplace_integration_tests::product;

const KEY: &str = "@GoMarketplace:products";

async fn open(backend: &MemoryStore) -> CartStore {
    CartStore::load(backend.clone(), &CartConfig::default())
        .await
        .unwrap()
}

fn quantities(store: &CartStore) -> Vec<(String, u32)> {
    store
        .items()
        .iter()
        .map(|item| (item.id.to_string(), item.quantity.get()))
        .collect()
}

// =============================================================================
// Lifecycle Scenarios
// =============================================================================

#[tokio::test]
async fn test_add_increment_decrement_until_empty() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;
    let id = ProductId::new("p1");

    store.add(product("p1", "T", 1000));
    assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);

    store.increment(&id).unwrap();
    assert_eq!(quantities(&store), vec![("p1".to_string(), 2)]);

    store.decrement(&id).unwrap();
    assert_eq!(quantities(&store), vec![("p1".to_string(), 1)]);

    assert_eq!(store.decrement(&id).unwrap(), Decrement::Removed);
    assert!(store.is_empty());

    store.flush().await.unwrap();
    assert_eq!(backend.get_string(KEY).await.as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_load_legacy_blob() {
    let backend = MemoryStore::with_entry(
        KEY,
        r#"[{"id":"p2","title":"X","image_url":"u","price":5,"quantity":3}]"#,
    );
    let store = open(&backend).await;

    assert_eq!(store.hydration(), &Hydration::Restored { items: 1 });
    let item = store.get(&ProductId::new("p2")).unwrap();
    assert_eq!(item.quantity.get(), 3);
    assert_eq!(item.title, "X");
    assert_eq!(item.image_url, "u");
}

#[tokio::test]
async fn test_readding_keeps_first_metadata() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;

    store.add(product("p1", "Original", 1000));
    let outcome = store.add(product("p1", "Changed", 2500));

    assert_eq!(
        outcome,
        AddOutcome::Merged {
            quantity: NonZeroU32::new(2).unwrap()
        }
    );
    let item = store.get(&ProductId::new("p1")).unwrap();
    assert_eq!(item.title, "Original");
    assert_eq!(item.price.to_string(), "10.00");
}

#[tokio::test]
async fn test_add_with_quantity() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;

    store.add_quantity(product("p1", "T", 100), NonZeroU32::new(4).unwrap());
    store.add_quantity(product("p1", "T", 100), NonZeroU32::new(2).unwrap());

    assert_eq!(store.total_quantity(), 6);
}

#[tokio::test]
async fn test_removing_middle_item_keeps_order() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;

    store.add(product("a", "A", 100));
    store.add(product("b", "B", 100));
    store.add(product("c", "C", 100));
    store.decrement(&ProductId::new("b")).unwrap();
    store.flush().await.unwrap();

    let ids: Vec<_> = store.items().iter().map(|i| i.id.to_string()).collect();
    assert_eq!(ids, vec!["a", "c"]);

    let persisted = codec::decode(&backend.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted.items(), store.items());
}

#[tokio::test]
async fn test_unknown_id_is_rejected_without_side_effects() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;
    store.add(product("p1", "T", 100));
    store.flush().await.unwrap();
    let writes = backend.write_count();
    let before = store.snapshot();

    let missing = ProductId::new("missing");
    assert_eq!(
        store.increment(&missing),
        Err(CartError::ItemNotFound(missing.clone()))
    );
    assert_eq!(
        store.decrement(&missing),
        Err(CartError::ItemNotFound(missing))
    );
    store.flush().await.unwrap();

    assert_eq!(*store.snapshot(), *before);
    assert_eq!(backend.write_count(), writes);
}

#[tokio::test]
async fn test_corrupt_blob_is_overwritten_on_first_mutation() {
    let backend = MemoryStore::with_entry(KEY, "not-json");
    let mut store = open(&backend).await;
    assert!(matches!(store.hydration(), Hydration::Recovered { .. }));

    // Untouched until the shopper changes something
    assert_eq!(backend.get_string(KEY).await.as_deref(), Some("not-json"));

    store.add(product("p1", "T", 100));
    store.flush().await.unwrap();
    let persisted = codec::decode(&backend.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
}

// =============================================================================
// Invariants
// =============================================================================

/// Small deterministic generator so the operation mix is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) % bound
    }
}

#[tokio::test]
async fn test_random_operation_sequences_keep_invariants() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;
    let mut rng = Lcg(42);
    let catalog = ["a", "b", "c", "d", "e"];

    for _ in 0..500 {
        let id = catalog[usize::try_from(rng.next(5)).unwrap()];
        match rng.next(3) {
            0 => {
                store.add(product(id, id, 100));
            }
            1 => {
                let _ = store.increment(&ProductId::new(id));
            }
            _ => {
                let _ = store.decrement(&ProductId::new(id));
            }
        }

        let mut seen = HashSet::new();
        for item in store.items() {
            assert!(item.quantity.get() > 0);
            assert!(seen.insert(item.id.clone()), "duplicate id {}", item.id);
        }
    }

    store.flush().await.unwrap();
    let persisted = codec::decode(&backend.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted, *store.snapshot());
}

// =============================================================================
// Persistence Ordering
// =============================================================================

#[tokio::test]
async fn test_burst_of_mutations_converges_to_last_state() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;

    for i in 0..50 {
        store.add(product(&format!("p{i}"), "T", 100));
    }
    for i in 0..25 {
        store.decrement(&ProductId::new(format!("p{i}"))).unwrap();
    }
    store.flush().await.unwrap();

    let persisted = codec::decode(&backend.get(KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(persisted.len(), 25);
    assert_eq!(persisted, *store.snapshot());
    // Nothing yields between mutations, so the writer only sees the last one
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test]
async fn test_subscriber_observes_latest_cart() {
    let backend = MemoryStore::new();
    let mut store = open(&backend).await;
    let mut changes = store.subscribe();

    store.add(product("p1", "T", 100));
    store.add(product("p2", "T", 100));

    changes.changed().await.unwrap();
    assert_eq!(changes.borrow_and_update().len(), 2);
}
