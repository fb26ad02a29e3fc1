// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity context for request processing.
//!
//! This module provides:
//! - [`Identity`] - the resolved caller (principal id + admin flag)
//! - [`Authenticator`] - the collaborator seam that turns a bearer credential
//!   into an [`Identity`]
//! - [`StaticTokenAuthenticator`] - in-memory token table for demos and tests
//! - [`extract_bearer_token`] - pulls the credential out of request headers
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Extract Bearer Token → Authenticator::resolve_identity → Identity
//!                                        │
//!                                        └── failure → AuthError (401, policy never runs)
//! ```
//!
//! # Security Notes
//!
//! - Credentials are never hashed or validated here; that is the collaborator's job
//! - Token values are never logged

use crate::UserId;
use async_trait::async_trait;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::instrument;

/// The resolved caller identity.
///
/// Immutable for the lifetime of a request and never persisted by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
	pub id: UserId,
	pub is_admin: bool,
}

impl Identity {
	/// A regular (non-admin) caller.
	pub fn new(id: UserId) -> Self {
		Self {
			id,
			is_admin: false,
		}
	}

	/// An administrator.
	pub fn admin(id: UserId) -> Self {
		Self { id, is_admin: true }
	}

	pub fn is_admin(&self) -> bool {
		self.is_admin
	}

	/// Returns true if `owner` is this identity.
	pub fn owns(&self, owner: UserId) -> bool {
		self.id == owner
	}
}

/// Error returned when a request cannot be attributed to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
	#[error("authentication required")]
	MissingCredential,

	#[error("invalid credential")]
	InvalidCredential,
}

/// Resolves bearer credentials into identities.
#[async_trait]
pub trait Authenticator: Send + Sync {
	async fn resolve_identity(&self, credential: &str) -> Result<Identity, AuthError>;
}

/// Authenticator backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
	tokens: HashMap<String, Identity>,
}

impl StaticTokenAuthenticator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder: register a token for an identity.
	pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
		self.tokens.insert(token.into(), identity);
		self
	}

	pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
		self.tokens.insert(token.into(), identity);
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
	#[instrument(level = "debug", skip_all)]
	async fn resolve_identity(&self, credential: &str) -> Result<Identity, AuthError> {
		let credential = credential.trim();
		if credential.is_empty() {
			return Err(AuthError::MissingCredential);
		}

		match self.tokens.get(credential) {
			Some(identity) => {
				tracing::debug!(user_id = %identity.id, is_admin = identity.is_admin, "credential resolved");
				Ok(*identity)
			}
			None => {
				tracing::debug!("credential rejected");
				Err(AuthError::InvalidCredential)
			}
		}
	}
}

/// Extract a bearer token from the Authorization header.
///
/// The scheme is matched case-insensitively. Empty tokens are treated as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
	let (scheme, token) = value.split_once(' ')?;
	if !scheme.eq_ignore_ascii_case("bearer") {
		return None;
	}
	let token = token.trim();
	if token.is_empty() {
		None
	} else {
		Some(token)
	}
}
