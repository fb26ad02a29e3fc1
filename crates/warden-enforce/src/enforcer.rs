// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Strategy-parameterized enforcement.
//!
//! Every strategy shares two pieces: the capability gate (`requires_admin`)
//! that runs before any lookup, and the [`decide`](warden_auth::decide) policy
//! that runs after it. Strategies differ only in how, and whether, the store is
//! consulted in between.
//!
//! ```text
//! Start → capability gate → [store lookup] → policy decision → Outcome
//!                                  │
//!                                  └── store fault → Outcome::SystemError
//! ```

use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use warden_auth::{
	decide_descriptor, requires_admin, AccessDecision, Action, Identity, ResourceType, UserId,
};
use warden_store::{find_by_id, find_by_id_scoped_to_owner, Entity, ResourceStore, StoreError};

use crate::outcome::Outcome;
use crate::strategy::Strategy;

/// A single object-level access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRequest {
	pub resource_type: ResourceType,
	pub id: i64,
	pub action: Action,
}

impl AccessRequest {
	pub fn new(resource_type: ResourceType, id: i64, action: Action) -> Self {
		Self {
			resource_type,
			id,
			action,
		}
	}

	pub fn read(resource_type: ResourceType, id: i64) -> Self {
		Self::new(resource_type, id, Action::Read)
	}

	pub fn write(resource_type: ResourceType, id: i64) -> Self {
		Self::new(resource_type, id, Action::Write)
	}

	pub fn delete(resource_type: ResourceType, id: i64) -> Self {
		Self::new(resource_type, id, Action::Delete)
	}
}

/// Applies one of the [`Strategy`] orderings against an injected store.
pub struct Enforcer<S: ?Sized> {
	store: Arc<S>,
}

impl<S: ?Sized> Clone for Enforcer<S> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
		}
	}
}

impl<S: ResourceStore + ?Sized> Enforcer<S> {
	pub fn new(store: Arc<S>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<S> {
		&self.store
	}

	#[instrument(
		level = "debug",
		skip_all,
		fields(
			user_id = %identity.id,
			is_admin = identity.is_admin,
			%strategy,
			resource = %request.resource_type,
			id = request.id,
			action = %request.action,
		)
	)]
	pub async fn enforce(
		&self,
		identity: &Identity,
		strategy: Strategy,
		request: AccessRequest,
	) -> Outcome {
		let AccessRequest {
			resource_type,
			id,
			action,
		} = request;

		if requires_admin(resource_type, action) && !identity.is_admin() {
			info!("capability denied before lookup");
			return Outcome::Forbidden;
		}

		let lookup = match strategy {
			Strategy::OwnershipFirst => {
				if let Some(owner) = owner_implied_by_id(resource_type, id) {
					if !identity.is_admin() && !identity.owns(owner) {
						info!("ownership denied before lookup");
						return Outcome::Forbidden;
					}
				}
				find_by_id(self.store.as_ref(), resource_type, id).await
			}
			Strategy::ExistenceFirst => find_by_id(self.store.as_ref(), resource_type, id).await,
			Strategy::FilteredQuery => {
				if identity.is_admin() {
					find_by_id(self.store.as_ref(), resource_type, id).await
				} else {
					find_by_id_scoped_to_owner(self.store.as_ref(), resource_type, id, identity.id)
						.await
				}
			}
		};

		match lookup {
			Ok(Some(entity)) => apply_decision(identity, entity, action),
			Ok(None) => {
				info!("resource not found");
				Outcome::NotFound
			}
			Err(err) => system_error(err),
		}
	}
}

/// The owner of a resource when it follows from the id alone.
///
/// Only users are self-owned; order ownership lives in the row.
fn owner_implied_by_id(resource_type: ResourceType, id: i64) -> Option<UserId> {
	match resource_type {
		ResourceType::User => Some(UserId::new(id)),
		ResourceType::Product | ResourceType::Order => None,
	}
}

fn apply_decision(identity: &Identity, entity: Entity, action: Action) -> Outcome {
	match decide_descriptor(identity, &entity.descriptor(), action) {
		AccessDecision::Allow => {
			debug!("access allowed");
			Outcome::Allowed(entity)
		}
		AccessDecision::DenyForbidden => {
			info!(owner_id = ?entity.owner_id(), "access forbidden");
			Outcome::Forbidden
		}
		AccessDecision::DenyNotFound => {
			info!("resource not found");
			Outcome::NotFound
		}
	}
}

fn system_error(err: StoreError) -> Outcome {
	error!(error = %err, "store lookup failed");
	Outcome::SystemError(err.to_string())
}
