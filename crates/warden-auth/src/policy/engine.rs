// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy evaluation engine.
//!
//! [`decide`] evaluates in a fixed order:
//!
//! 1. **Existence**: absent resources are `DenyNotFound`; nothing else is computed
//! 2. **Admin bypass**: administrators are allowed everything
//! 3. **Ownerless resources**: products are readable by anyone, mutable by admins only
//! 4. **Ownership**: the recorded owner is allowed, everyone else is forbidden
//!
//! The function is pure and total. It is the only place ownership is compared.

use super::types::{AccessDecision, Action, ResourceDescriptor, ResourceType};
use crate::{Identity, UserId};
use tracing::instrument;

/// Evaluates the access decision for a resource that has (or has not) been looked up.
///
/// # Arguments
///
/// * `identity` - The resolved caller
/// * `resource_type` - Which class of resource is being accessed
/// * `owner_id` - The recorded owner, when the lookup found one
/// * `found` - Whether the lookup found the resource at all
/// * `action` - The operation being attempted
#[instrument(
	level = "debug",
	skip(identity),
	fields(user_id = %identity.id, is_admin = identity.is_admin),
	ret
)]
pub fn decide(
	identity: &Identity,
	resource_type: ResourceType,
	owner_id: Option<UserId>,
	found: bool,
	action: Action,
) -> AccessDecision {
	if !found {
		return AccessDecision::DenyNotFound;
	}

	if identity.is_admin() {
		return AccessDecision::Allow;
	}

	if is_ownerless(resource_type) {
		return match action {
			Action::Read => AccessDecision::Allow,
			Action::Write | Action::Delete => AccessDecision::DenyForbidden,
		};
	}

	match owner_id {
		Some(owner) if identity.owns(owner) => AccessDecision::Allow,
		_ => AccessDecision::DenyForbidden,
	}
}

/// Evaluates a decision for a resource that was found by a lookup.
pub fn decide_descriptor(
	identity: &Identity,
	resource: &ResourceDescriptor,
	action: Action,
) -> AccessDecision {
	decide(identity, resource.resource_type, resource.owner_id, true, action)
}

/// Returns true for resource types that have no owner.
pub fn is_ownerless(resource_type: ResourceType) -> bool {
	matches!(resource_type, ResourceType::Product)
}

/// Returns true when the action is reserved for administrators regardless of
/// which resource it targets.
///
/// This is a capability check and does not depend on existence, so strategies
/// may apply it before consulting the store.
pub fn requires_admin(resource_type: ResourceType, action: Action) -> bool {
	is_ownerless(resource_type) && action.is_mutation()
}
