// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity context and object-level authorization for Warden.
//!
//! - [`types`]: integer ID newtypes for users, products and orders
//! - [`middleware`]: the resolved caller [`Identity`], bearer extraction and the
//!   [`Authenticator`] collaborator seam
//! - [`policy`]: the pure [`decide`] function shared by every enforcement strategy

pub mod middleware;
pub mod policy;
pub mod types;

pub use middleware::{
	extract_bearer_token, AuthError, Authenticator, Identity, StaticTokenAuthenticator,
};
pub use policy::{
	decide, decide_descriptor, is_ownerless, requires_admin, AccessDecision, Action,
	ResourceDescriptor, ResourceType,
};
pub use types::{OrderId, ProductId, UserId};
