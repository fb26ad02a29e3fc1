// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The in-memory and SQLite stores must agree on every observable result.

use warden_auth::{OrderId, ProductId, ResourceType, UserId};
use warden_store::{
	find_by_id, find_by_id_scoped_to_owner, seed_demo, MemoryStore, NewOrder, OrderStatus,
	OrderUpdate, ProductUpdate, ResourceStore, SqliteStore, StoreError, UserUpdate,
};

async fn sqlite() -> SqliteStore {
	SqliteStore::connect("sqlite::memory:")
		.await
		.expect("in-memory sqlite opens")
}

/// Presence and owner for every (resource type, id) in a small window.
async fn snapshot<S: ResourceStore>(store: &S, owner: UserId) -> Vec<(ResourceType, i64, bool, bool)> {
	let mut rows = Vec::new();
	for resource_type in ResourceType::ALL {
		for id in 0..=7 {
			let found = find_by_id(store, resource_type, id)
				.await
				.expect("lookup succeeds")
				.is_some();
			let scoped = find_by_id_scoped_to_owner(store, resource_type, id, owner)
				.await
				.expect("scoped lookup succeeds")
				.is_some();
			rows.push((resource_type, id, found, scoped));
		}
	}
	rows
}

// ============================================================================
// Seeded fixture
// ============================================================================

#[tokio::test]
async fn seeded_fixtures_are_identical() {
	let memory = MemoryStore::new();
	let sqlite = sqlite().await;
	let a = seed_demo(&memory).await.expect("memory seeds");
	let b = seed_demo(&sqlite).await.expect("sqlite seeds");

	assert_eq!(a.products, b.products);
	assert_eq!(a.john_orders, b.john_orders);
	assert_eq!(a.bob_orders, b.bob_orders);
	for (x, y) in a.users().into_iter().zip(b.users()) {
		assert_eq!(x.identity, y.identity);
		assert_eq!(x.token, y.token);
	}
}

#[tokio::test]
async fn lookups_agree_for_every_caller() {
	let memory = MemoryStore::new();
	let sqlite = sqlite().await;
	seed_demo(&memory).await.expect("memory seeds");
	seed_demo(&sqlite).await.expect("sqlite seeds");

	for owner in [1, 2, 3, 9] {
		let owner = UserId::new(owner);
		assert_eq!(
			snapshot(&memory, owner).await,
			snapshot(&sqlite, owner).await,
			"owner {owner}"
		);
	}
}

// ============================================================================
// Mutations
// ============================================================================

async fn exercise<S: ResourceStore>(store: &S) -> (Vec<OrderStatus>, i64, bool, bool, usize) {
	seed_demo(store).await.expect("seeds");
	let bob = UserId::new(3);

	let shipped = store
		.update_order(OrderId::new(5), OrderUpdate::status(OrderStatus::Shipped))
		.await
		.expect("update succeeds")
		.expect("order 5 exists");

	let placed = store
		.create_order(NewOrder {
			user_id: bob,
			product_id: ProductId::new(1),
			amount: 10,
		})
		.await
		.expect("order placed");

	let over = store
		.create_order(NewOrder {
			user_id: bob,
			product_id: ProductId::new(2),
			amount: 1_000,
		})
		.await;
	assert!(matches!(over, Err(StoreError::InsufficientStock { .. })));

	let deleted = store.delete_order(OrderId::new(4)).await.expect("delete runs");
	let deleted_again = store.delete_order(OrderId::new(4)).await.expect("delete runs");

	let stock = store
		.find_product(ProductId::new(1))
		.await
		.expect("lookup succeeds")
		.expect("product 1 exists")
		.stock;
	let bob_orders = store.list_orders_for_user(bob).await.expect("list succeeds");

	(
		vec![shipped.status, placed.status],
		stock,
		deleted,
		deleted_again,
		bob_orders.len(),
	)
}

/// Which of a set of conflicting or harmless updates each backend rejects.
async fn update_conflicts<S: ResourceStore>(store: &S) -> Vec<bool> {
	seed_demo(store).await.expect("seeds");
	let john = UserId::new(2);
	let email = |email: &str| UserUpdate {
		email: Some(email.to_string()),
		..Default::default()
	};
	let username = |username: &str| UserUpdate {
		username: Some(username.to_string()),
		..Default::default()
	};
	let rename = ProductUpdate {
		name: Some("Phone".to_string()),
		..Default::default()
	};

	let attempts = vec![
		store.update_user(john, email("bob@example.com")).await.map(|u| u.is_some()),
		store.update_user(john, username("bob")).await.map(|u| u.is_some()),
		store.update_user(john, email("john@example.com")).await.map(|u| u.is_some()),
		store.update_user(john, email("johnny@example.com")).await.map(|u| u.is_some()),
		store.update_user(UserId::new(99), email("bob@example.com")).await.map(|u| u.is_some()),
		store.update_product(ProductId::new(1), rename).await.map(|p| p.is_some()),
	];
	attempts
		.into_iter()
		.map(|attempt| match attempt {
			Ok(_) => false,
			Err(StoreError::Conflict(_)) => true,
			Err(other) => panic!("unexpected store error: {other}"),
		})
		.collect()
}

#[tokio::test]
async fn uniqueness_conflicts_agree() {
	let memory = update_conflicts(&MemoryStore::new()).await;
	let sqlite = update_conflicts(&sqlite().await).await;

	assert_eq!(memory, sqlite);
	assert_eq!(memory, vec![true, true, false, false, false, true]);

	let store = MemoryStore::new();
	update_conflicts(&store).await;
	let john = store
		.find_user(UserId::new(2))
		.await
		.expect("lookup succeeds")
		.expect("john exists");
	assert_eq!(john.email, "johnny@example.com");
}

#[tokio::test]
async fn mutations_agree() {
	let memory = exercise(&MemoryStore::new()).await;
	let sqlite = exercise(&sqlite().await).await;

	assert_eq!(memory, sqlite);
	let (statuses, stock, deleted, deleted_again, bob_orders) = memory;
	assert_eq!(statuses, vec![OrderStatus::Shipped, OrderStatus::Pending]);
	assert!(deleted);
	assert!(!deleted_again);
	assert_eq!(bob_orders, 2);
	assert!(stock < 100);
}
