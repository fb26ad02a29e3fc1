// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fault-injecting stores for exercising the `SystemError` path.

use async_trait::async_trait;
use std::time::Duration;
use warden_auth::{OrderId, ProductId, UserId};

use crate::error::{Result, StoreError};
use crate::store::ResourceStore;
use crate::types::{
	NewOrder, NewProduct, NewUser, Order, OrderUpdate, Product, ProductUpdate, User, UserUpdate,
};

/// A store whose every call fails as if the database were unreachable.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

fn unavailable<T>() -> Result<T> {
	Err(StoreError::Unavailable("store is unreachable".to_string()))
}

#[async_trait]
impl ResourceStore for FailingStore {
	async fn find_user(&self, _id: UserId) -> Result<Option<User>> {
		unavailable()
	}

	async fn find_product(&self, _id: ProductId) -> Result<Option<Product>> {
		unavailable()
	}

	async fn find_order(&self, _id: OrderId) -> Result<Option<Order>> {
		unavailable()
	}

	async fn find_order_scoped_to_owner(
		&self,
		_id: OrderId,
		_owner: UserId,
	) -> Result<Option<Order>> {
		unavailable()
	}

	async fn find_user_scoped_to_owner(&self, _id: UserId, _owner: UserId) -> Result<Option<User>> {
		unavailable()
	}

	async fn list_products(&self) -> Result<Vec<Product>> {
		unavailable()
	}

	async fn list_orders(&self) -> Result<Vec<Order>> {
		unavailable()
	}

	async fn list_orders_for_user(&self, _owner: UserId) -> Result<Vec<Order>> {
		unavailable()
	}

	async fn create_user(&self, _new: NewUser) -> Result<User> {
		unavailable()
	}

	async fn create_product(&self, _new: NewProduct) -> Result<Product> {
		unavailable()
	}

	async fn create_order(&self, _new: NewOrder) -> Result<Order> {
		unavailable()
	}

	async fn update_user(&self, _id: UserId, _update: UserUpdate) -> Result<Option<User>> {
		unavailable()
	}

	async fn update_product(
		&self,
		_id: ProductId,
		_update: ProductUpdate,
	) -> Result<Option<Product>> {
		unavailable()
	}

	async fn update_order(&self, _id: OrderId, _update: OrderUpdate) -> Result<Option<Order>> {
		unavailable()
	}

	async fn delete_order(&self, _id: OrderId) -> Result<bool> {
		unavailable()
	}
}

/// Wraps a store and delays every lookup by a fixed duration.
///
/// Writes are passed through without delay so fixtures can be seeded quickly.
#[derive(Debug)]
pub struct SlowStore<S> {
	inner: S,
	delay: Duration,
}

impl<S> SlowStore<S> {
	pub fn new(inner: S, delay: Duration) -> Self {
		Self { inner, delay }
	}

	pub fn inner(&self) -> &S {
		&self.inner
	}
}

#[async_trait]
impl<S: ResourceStore> ResourceStore for SlowStore<S> {
	async fn find_user(&self, id: UserId) -> Result<Option<User>> {
		tokio::time::sleep(self.delay).await;
		self.inner.find_user(id).await
	}

	async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
		tokio::time::sleep(self.delay).await;
		self.inner.find_product(id).await
	}

	async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
		tokio::time::sleep(self.delay).await;
		self.inner.find_order(id).await
	}

	async fn find_order_scoped_to_owner(
		&self,
		id: OrderId,
		owner: UserId,
	) -> Result<Option<Order>> {
		tokio::time::sleep(self.delay).await;
		self.inner.find_order_scoped_to_owner(id, owner).await
	}

	async fn find_user_scoped_to_owner(&self, id: UserId, owner: UserId) -> Result<Option<User>> {
		tokio::time::sleep(self.delay).await;
		self.inner.find_user_scoped_to_owner(id, owner).await
	}

	async fn list_products(&self) -> Result<Vec<Product>> {
		tokio::time::sleep(self.delay).await;
		self.inner.list_products().await
	}

	async fn list_orders(&self) -> Result<Vec<Order>> {
		tokio::time::sleep(self.delay).await;
		self.inner.list_orders().await
	}

	async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>> {
		tokio::time::sleep(self.delay).await;
		self.inner.list_orders_for_user(owner).await
	}

	async fn create_user(&self, new: NewUser) -> Result<User> {
		self.inner.create_user(new).await
	}

	async fn create_product(&self, new: NewProduct) -> Result<Product> {
		self.inner.create_product(new).await
	}

	async fn create_order(&self, new: NewOrder) -> Result<Order> {
		self.inner.create_order(new).await
	}

	async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>> {
		self.inner.update_user(id, update).await
	}

	async fn update_product(
		&self,
		id: ProductId,
		update: ProductUpdate,
	) -> Result<Option<Product>> {
		self.inner.update_product(id, update).await
	}

	async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>> {
		self.inner.update_order(id, update).await
	}

	async fn delete_order(&self, id: OrderId) -> Result<bool> {
		self.inner.delete_order(id).await
	}
}
