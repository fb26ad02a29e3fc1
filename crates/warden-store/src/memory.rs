// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory resource store.
//!
//! Every call takes the table lock once, so each lookup and each write is
//! atomic with respect to concurrent callers.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use warden_auth::{OrderId, ProductId, UserId};

use crate::error::{Result, StoreError};
use crate::store::ResourceStore;
use crate::types::{
	NewOrder, NewProduct, NewUser, Order, OrderStatus, OrderUpdate, Product, ProductUpdate, User,
	UserUpdate,
};

#[derive(Debug, Default)]
struct Tables {
	users: BTreeMap<UserId, User>,
	products: BTreeMap<ProductId, Product>,
	orders: BTreeMap<OrderId, Order>,
	next_user: i64,
	next_product: i64,
	next_order: i64,
}

impl Tables {
	fn allocate(counter: &mut i64) -> i64 {
		*counter += 1;
		*counter
	}
}

/// Resource store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ResourceStore for MemoryStore {
	async fn find_user(&self, id: UserId) -> Result<Option<User>> {
		Ok(self.tables.read().await.users.get(&id).cloned())
	}

	async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
		Ok(self.tables.read().await.products.get(&id).cloned())
	}

	async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
		Ok(self.tables.read().await.orders.get(&id).cloned())
	}

	async fn find_order_scoped_to_owner(
		&self,
		id: OrderId,
		owner: UserId,
	) -> Result<Option<Order>> {
		Ok(self
			.tables
			.read()
			.await
			.orders
			.get(&id)
			.filter(|o| o.user_id == owner)
			.cloned())
	}

	async fn list_products(&self) -> Result<Vec<Product>> {
		Ok(self.tables.read().await.products.values().cloned().collect())
	}

	async fn list_orders(&self) -> Result<Vec<Order>> {
		Ok(self.tables.read().await.orders.values().cloned().collect())
	}

	async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>> {
		Ok(self
			.tables
			.read()
			.await
			.orders
			.values()
			.filter(|o| o.user_id == owner)
			.cloned()
			.collect())
	}

	#[tracing::instrument(skip(self, new), fields(username = %new.username))]
	async fn create_user(&self, new: NewUser) -> Result<User> {
		let mut tables = self.tables.write().await;
		if tables
			.users
			.values()
			.any(|u| u.username == new.username || u.email == new.email)
		{
			return Err(StoreError::Conflict(format!(
				"user '{}' already exists",
				new.username
			)));
		}

		let now = Utc::now();
		let id = UserId::new(Tables::allocate(&mut tables.next_user));
		let user = User {
			id,
			username: new.username,
			email: new.email,
			is_admin: new.is_admin,
			created_at: now,
			updated_at: now,
		};
		tables.users.insert(id, user.clone());
		Ok(user)
	}

	#[tracing::instrument(skip(self, new), fields(name = %new.name))]
	async fn create_product(&self, new: NewProduct) -> Result<Product> {
		new.validate()?;
		let mut tables = self.tables.write().await;
		if tables.products.values().any(|p| p.name == new.name) {
			return Err(StoreError::Conflict(format!(
				"product '{}' already exists",
				new.name
			)));
		}

		let now = Utc::now();
		let id = ProductId::new(Tables::allocate(&mut tables.next_product));
		let product = Product {
			id,
			name: new.name,
			description: new.description,
			price: new.price,
			stock: new.stock,
			created_at: now,
			updated_at: now,
		};
		tables.products.insert(id, product.clone());
		Ok(product)
	}

	#[tracing::instrument(skip(self), fields(user_id = %new.user_id, product_id = %new.product_id))]
	async fn create_order(&self, new: NewOrder) -> Result<Order> {
		if new.amount <= 0 {
			return Err(StoreError::InvalidInput(format!(
				"order amount must be positive, got {}",
				new.amount
			)));
		}

		let mut tables = self.tables.write().await;
		if !tables.users.contains_key(&new.user_id) {
			return Err(StoreError::NotFound(format!("user {}", new.user_id)));
		}

		let now = Utc::now();
		let product = tables
			.products
			.get_mut(&new.product_id)
			.ok_or_else(|| StoreError::NotFound(format!("product {}", new.product_id)))?;
		if product.stock < new.amount {
			return Err(StoreError::InsufficientStock {
				requested: new.amount,
				available: product.stock,
			});
		}
		product.stock -= new.amount;
		product.updated_at = now;
		let price = product.price;

		let id = OrderId::new(Tables::allocate(&mut tables.next_order));
		let order = Order {
			id,
			user_id: new.user_id,
			product_id: new.product_id,
			amount: new.amount,
			price,
			total_price: price * new.amount as f64,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		};
		tables.orders.insert(id, order.clone());
		Ok(order)
	}

	#[tracing::instrument(skip(self, update))]
	async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>> {
		let mut tables = self.tables.write().await;
		if !tables.users.contains_key(&id) {
			return Ok(None);
		}
		let taken = tables.users.values().filter(|u| u.id != id).find(|u| {
			update.username.as_ref() == Some(&u.username) || update.email.as_ref() == Some(&u.email)
		});
		if let Some(other) = taken {
			return Err(StoreError::Conflict(format!(
				"username or email already used by user {}",
				other.id
			)));
		}
		let Some(user) = tables.users.get_mut(&id) else {
			return Ok(None);
		};
		if update.apply(user) {
			user.updated_at = Utc::now();
		}
		Ok(Some(user.clone()))
	}

	#[tracing::instrument(skip(self, update))]
	async fn update_product(
		&self,
		id: ProductId,
		update: ProductUpdate,
	) -> Result<Option<Product>> {
		update.validate()?;
		let mut tables = self.tables.write().await;
		if !tables.products.contains_key(&id) {
			return Ok(None);
		}
		if let Some(name) = &update.name {
			if tables.products.values().any(|p| p.id != id && p.name == *name) {
				return Err(StoreError::Conflict(format!("product '{name}' exists")));
			}
		}
		let Some(product) = tables.products.get_mut(&id) else {
			return Ok(None);
		};
		if update.apply(product) {
			product.updated_at = Utc::now();
		}
		Ok(Some(product.clone()))
	}

	#[tracing::instrument(skip(self))]
	async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>> {
		let mut tables = self.tables.write().await;
		let Some(order) = tables.orders.get_mut(&id) else {
			return Ok(None);
		};
		if update.apply(order) {
			order.updated_at = Utc::now();
		}
		Ok(Some(order.clone()))
	}

	#[tracing::instrument(skip(self))]
	async fn delete_order(&self, id: OrderId) -> Result<bool> {
		Ok(self.tables.write().await.orders.remove(&id).is_some())
	}
}
