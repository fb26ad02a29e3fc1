// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for policy evaluation.
//!
//! - [`ResourceType`]: which of the three protected classes is being accessed
//! - [`Action`]: the operation being performed
//! - [`ResourceDescriptor`]: what a store lookup revealed about the resource
//! - [`AccessDecision`]: the terminal result of a policy evaluation
//!
//! All types are `Copy` and serializable so decisions can be logged and
//! written into probe reports.

use crate::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Types of resources protected by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
	#[serde(alias = "users")]
	User,
	#[serde(alias = "products")]
	Product,
	#[serde(alias = "orders")]
	Order,
}

impl ResourceType {
	pub const ALL: [ResourceType; 3] = [ResourceType::User, ResourceType::Product, ResourceType::Order];

	pub fn as_str(&self) -> &'static str {
		match self {
			ResourceType::User => "user",
			ResourceType::Product => "product",
			ResourceType::Order => "order",
		}
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ResourceType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"user" | "users" => Ok(ResourceType::User),
			"product" | "products" => Ok(ResourceType::Product),
			"order" | "orders" => Ok(ResourceType::Order),
			other => Err(format!("unknown resource type '{other}'")),
		}
	}
}

/// Actions that can be performed on resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Read,
	Write,
	Delete,
}

impl Action {
	/// Returns true for actions that change state.
	pub fn is_mutation(&self) -> bool {
		matches!(self, Action::Write | Action::Delete)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Read => f.write_str("read"),
			Action::Write => f.write_str("write"),
			Action::Delete => f.write_str("delete"),
		}
	}
}

/// What is known about a resource after a lookup.
///
/// `owner_id` is only populated once a lookup has succeeded. It is `None` for
/// products (ownerless) and equal to `id` for users (self-owned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
	pub resource_type: ResourceType,
	pub id: i64,
	pub owner_id: Option<UserId>,
}

impl ResourceDescriptor {
	pub fn user(id: UserId) -> Self {
		Self {
			resource_type: ResourceType::User,
			id: id.get(),
			owner_id: Some(id),
		}
	}

	pub fn product(id: i64) -> Self {
		Self {
			resource_type: ResourceType::Product,
			id,
			owner_id: None,
		}
	}

	pub fn order(id: i64, owner: UserId) -> Self {
		Self {
			resource_type: ResourceType::Order,
			id,
			owner_id: Some(owner),
		}
	}
}

/// The result of a policy evaluation.
///
/// Denials are ordinary values, not errors: the enforcement strategy decides
/// when to reveal them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
	Allow,
	DenyForbidden,
	DenyNotFound,
}

impl AccessDecision {
	pub fn is_allow(&self) -> bool {
		matches!(self, AccessDecision::Allow)
	}
}
