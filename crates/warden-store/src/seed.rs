// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Demo fixture: one admin, two ordinary users, two products and five orders.
//!
//! | id | user  | admin | orders |
//! |----|-------|-------|--------|
//! | 1  | admin | yes   |        |
//! | 2  | john  | no    | 1..=3  |
//! | 3  | bob   | no    | 4..=5  |

use tracing::info;
use warden_auth::{Identity, OrderId, ProductId, StaticTokenAuthenticator, UserId};

use crate::error::{Result, StoreError};
use crate::store::ResourceStore;
use crate::types::{NewOrder, NewProduct, NewUser};

pub const ADMIN_TOKEN: &str = "admin-token";
pub const JOHN_TOKEN: &str = "john-token";
pub const BOB_TOKEN: &str = "bob-token";

/// A seeded principal with its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededUser {
	pub username: String,
	pub token: String,
	pub identity: Identity,
}

/// Handles to everything [`seed_demo`] created.
#[derive(Debug, Clone)]
pub struct DemoFixture {
	pub admin: SeededUser,
	pub john: SeededUser,
	pub bob: SeededUser,
	pub products: Vec<ProductId>,
	pub john_orders: Vec<OrderId>,
	pub bob_orders: Vec<OrderId>,
}

impl DemoFixture {
	pub fn users(&self) -> [&SeededUser; 3] {
		[&self.admin, &self.john, &self.bob]
	}

	/// Token table covering every seeded user.
	pub fn authenticator(&self) -> StaticTokenAuthenticator {
		let mut auth = StaticTokenAuthenticator::new();
		for user in self.users() {
			auth.insert(user.token.clone(), user.identity);
		}
		auth
	}

	/// Identities used when probing, as `(label, identity)` pairs.
	pub fn probe_identities(&self) -> Vec<(String, Identity)> {
		self.users()
			.into_iter()
			.map(|u| (u.username.clone(), u.identity))
			.collect()
	}
}

async fn seed_user<S>(store: &S, username: &str, is_admin: bool, token: &str) -> Result<SeededUser>
where
	S: ResourceStore + ?Sized,
{
	let user = store
		.create_user(NewUser {
			username: username.to_string(),
			email: format!("{username}@example.com"),
			is_admin,
		})
		.await?;
	Ok(SeededUser {
		username: user.username,
		token: token.to_string(),
		identity: if user.is_admin {
			Identity::admin(user.id)
		} else {
			Identity::new(user.id)
		},
	})
}

async fn seed_orders<S>(
	store: &S,
	user_id: UserId,
	products: &[ProductId],
	count: usize,
) -> Result<Vec<OrderId>>
where
	S: ResourceStore + ?Sized,
{
	if products.is_empty() {
		return Err(StoreError::Internal("no products to order".to_string()));
	}
	let mut ids = Vec::with_capacity(count);
	for i in 0..count {
		let order = store
			.create_order(NewOrder {
				user_id,
				product_id: products[i % products.len()],
				amount: 1,
			})
			.await?;
		ids.push(order.id);
	}
	Ok(ids)
}

/// Populate an empty store with the demo fixture.
///
/// The store must be empty: ids are assigned by the store, and the fixture
/// expects them to start at 1.
pub async fn seed_demo<S>(store: &S) -> Result<DemoFixture>
where
	S: ResourceStore + ?Sized,
{
	let admin = seed_user(store, "admin", true, ADMIN_TOKEN).await?;
	let john = seed_user(store, "john", false, JOHN_TOKEN).await?;
	let bob = seed_user(store, "bob", false, BOB_TOKEN).await?;

	let mut products = Vec::new();
	for (name, description, price) in [
		("Laptop", "A portable computer", 999.99),
		("Phone", "A mobile phone", 499.5),
	] {
		let product = store
			.create_product(NewProduct {
				name: name.to_string(),
				description: description.to_string(),
				price,
				stock: 100,
			})
			.await?;
		products.push(product.id);
	}

	let john_orders = seed_orders(store, john.identity.id, &products, 3).await?;
	let bob_orders = seed_orders(store, bob.identity.id, &products, 2).await?;

	info!(
		users = 3,
		products = products.len(),
		orders = john_orders.len() + bob_orders.len(),
		"seeded demo fixture"
	);

	Ok(DemoFixture {
		admin,
		john,
		bob,
		products,
		john_orders,
		bob_orders,
	})
}
