// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Entity types held by the resource store.
//!
//! Ownership is encoded only on [`Order::user_id`]; users own themselves and
//! products have no owner. Partial updates ([`UserUpdate`], [`ProductUpdate`],
//! [`OrderUpdate`]) apply a field only when it is present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use warden_auth::{OrderId, ProductId, ResourceDescriptor, ResourceType, UserId};

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub email: String,
	pub is_admin: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
	pub id: ProductId,
	pub name: String,
	pub description: String,
	pub price: f64,
	pub stock: i64,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// An order placed by a user.
///
/// `user_id` is fixed at creation; there is no way to transfer an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
	pub id: OrderId,
	pub user_id: UserId,
	pub product_id: ProductId,
	pub amount: i64,
	pub price: f64,
	pub total_price: f64,
	pub status: OrderStatus,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	#[default]
	Pending,
	Shipped,
	Completed,
	Cancelled,
}

impl OrderStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Pending => "pending",
			OrderStatus::Shipped => "shipped",
			OrderStatus::Completed => "completed",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = StoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"pending" => Ok(OrderStatus::Pending),
			"shipped" => Ok(OrderStatus::Shipped),
			"completed" => Ok(OrderStatus::Completed),
			"cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
			other => Err(StoreError::InvalidInput(format!(
				"unknown order status '{other}'"
			))),
		}
	}
}

/// Any entity returned by a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
	User(User),
	Product(Product),
	Order(Order),
}

impl Entity {
	pub fn resource_type(&self) -> ResourceType {
		match self {
			Entity::User(_) => ResourceType::User,
			Entity::Product(_) => ResourceType::Product,
			Entity::Order(_) => ResourceType::Order,
		}
	}

	/// The policy-facing view of this entity.
	pub fn descriptor(&self) -> ResourceDescriptor {
		match self {
			Entity::User(u) => ResourceDescriptor::user(u.id),
			Entity::Product(p) => ResourceDescriptor::product(p.id.get()),
			Entity::Order(o) => ResourceDescriptor::order(o.id.get(), o.user_id),
		}
	}

	pub fn owner_id(&self) -> Option<UserId> {
		self.descriptor().owner_id
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
	pub username: String,
	pub email: String,
	#[serde(default)]
	pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
	pub name: String,
	pub description: String,
	pub price: f64,
	pub stock: i64,
}

impl NewProduct {
	pub fn validate(&self) -> Result<(), StoreError> {
		validate_price(self.price)?;
		validate_stock(self.stock)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
	pub user_id: UserId,
	pub product_id: ProductId,
	pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

impl UserUpdate {
	pub fn is_empty(&self) -> bool {
		self.username.is_none() && self.email.is_none()
	}

	/// Apply present fields. Returns true if anything changed.
	pub fn apply(&self, user: &mut User) -> bool {
		let mut changed = false;
		if let Some(username) = &self.username {
			changed |= user.username != *username;
			user.username = username.clone();
		}
		if let Some(email) = &self.email {
			changed |= user.email != *email;
			user.email = email.clone();
		}
		changed
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stock: Option<i64>,
}

impl ProductUpdate {
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.description.is_none() && self.price.is_none() && self.stock.is_none()
	}

	pub fn validate(&self) -> Result<(), StoreError> {
		if let Some(price) = self.price {
			validate_price(price)?;
		}
		if let Some(stock) = self.stock {
			validate_stock(stock)?;
		}
		Ok(())
	}

	/// Apply present fields. Returns true if anything changed.
	pub fn apply(&self, product: &mut Product) -> bool {
		let mut changed = false;
		if let Some(name) = &self.name {
			changed |= product.name != *name;
			product.name = name.clone();
		}
		if let Some(description) = &self.description {
			changed |= product.description != *description;
			product.description = description.clone();
		}
		if let Some(price) = self.price {
			changed |= product.price != price;
			product.price = price;
		}
		if let Some(stock) = self.stock {
			changed |= product.stock != stock;
			product.stock = stock;
		}
		changed
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<OrderStatus>,
}

impl OrderUpdate {
	pub fn status(status: OrderStatus) -> Self {
		Self {
			status: Some(status),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.status.is_none()
	}

	/// Apply present fields. Returns true if anything changed.
	pub fn apply(&self, order: &mut Order) -> bool {
		match self.status {
			Some(status) if order.status != status => {
				order.status = status;
				true
			}
			_ => false,
		}
	}
}

fn validate_price(price: f64) -> Result<(), StoreError> {
	if price.is_finite() && price >= 0.0 {
		Ok(())
	} else {
		Err(StoreError::InvalidInput(format!("invalid price {price}")))
	}
}

fn validate_stock(stock: i64) -> Result<(), StoreError> {
	if stock >= 0 {
		Ok(())
	} else {
		Err(StoreError::InvalidInput(format!("invalid stock {stock}")))
	}
}
