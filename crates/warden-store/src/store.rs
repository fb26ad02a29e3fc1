// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The resource store collaborator.
//!
//! Enforcement code never reaches for a global session: the store is passed in
//! explicitly, so tests can substitute [`crate::MemoryStore`] or one of the
//! fault-injecting stores in [`crate::testing`].

use async_trait::async_trait;
use warden_auth::{OrderId, ProductId, ResourceType, UserId};

use crate::error::Result;
use crate::types::{
	Entity, NewOrder, NewProduct, NewUser, Order, OrderUpdate, Product, ProductUpdate, User,
	UserUpdate,
};

#[async_trait]
pub trait ResourceStore: Send + Sync {
	async fn find_user(&self, id: UserId) -> Result<Option<User>>;
	async fn find_product(&self, id: ProductId) -> Result<Option<Product>>;
	async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

	/// Look up an order only if it belongs to `owner`.
	///
	/// A foreign order and a missing order are indistinguishable here.
	async fn find_order_scoped_to_owner(&self, id: OrderId, owner: UserId)
		-> Result<Option<Order>>;

	/// Look up a user only if it is `owner`.
	async fn find_user_scoped_to_owner(&self, id: UserId, owner: UserId) -> Result<Option<User>> {
		if id != owner {
			return Ok(None);
		}
		self.find_user(id).await
	}

	async fn list_products(&self) -> Result<Vec<Product>>;
	async fn list_orders(&self) -> Result<Vec<Order>>;
	async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>>;

	async fn create_user(&self, new: NewUser) -> Result<User>;
	async fn create_product(&self, new: NewProduct) -> Result<Product>;

	/// Place an order, decrementing product stock in the same step.
	async fn create_order(&self, new: NewOrder) -> Result<Order>;

	async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>>;
	async fn update_product(&self, id: ProductId, update: ProductUpdate)
		-> Result<Option<Product>>;
	async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>>;
	async fn delete_order(&self, id: OrderId) -> Result<bool>;
}

/// Look up any resource by type and raw id.
pub async fn find_by_id<S>(store: &S, resource_type: ResourceType, id: i64) -> Result<Option<Entity>>
where
	S: ResourceStore + ?Sized,
{
	Ok(match resource_type {
		ResourceType::User => store.find_user(UserId::new(id)).await?.map(Entity::User),
		ResourceType::Product => store
			.find_product(ProductId::new(id))
			.await?
			.map(Entity::Product),
		ResourceType::Order => store.find_order(OrderId::new(id)).await?.map(Entity::Order),
	})
}

/// Look up any resource by type and raw id, constrained to `owner`.
///
/// Products have no owner, so the scoped lookup equals the unscoped one.
pub async fn find_by_id_scoped_to_owner<S>(
	store: &S,
	resource_type: ResourceType,
	id: i64,
	owner: UserId,
) -> Result<Option<Entity>>
where
	S: ResourceStore + ?Sized,
{
	Ok(match resource_type {
		ResourceType::User => store
			.find_user_scoped_to_owner(UserId::new(id), owner)
			.await?
			.map(Entity::User),
		ResourceType::Product => store
			.find_product(ProductId::new(id))
			.await?
			.map(Entity::Product),
		ResourceType::Order => store
			.find_order_scoped_to_owner(OrderId::new(id), owner)
			.await?
			.map(Entity::Order),
	})
}
