// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! What the prober talks to.

use async_trait::async_trait;
use http::StatusCode;
use warden_auth::{Action, Authenticator, Identity, ResourceType};
use warden_enforce::{Api, ApiRequest, Strategy};
use warden_store::ResourceStore;

/// A single synthetic request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
	pub identity_name: String,
	pub credential: String,
	pub identity: Identity,
	pub strategy: Strategy,
	pub resource_type: ResourceType,
	pub id: i64,
	pub action: Action,
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
	#[error("transport failure: {0}")]
	Transport(String),

	#[error("action {0} cannot be probed")]
	UnsupportedAction(Action),
}

/// Something that answers probes with a status code.
#[async_trait]
pub trait ProbeTarget: Send + Sync {
	async fn send(&self, probe: &Probe) -> Result<StatusCode, TargetError>;
}

/// Drives an [`Api`] in the same process.
pub struct InProcessTarget<S: ?Sized, A: ?Sized> {
	api: Api<S, A>,
}

impl<S, A> InProcessTarget<S, A>
where
	S: ResourceStore + ?Sized,
	A: Authenticator + ?Sized,
{
	pub fn new(api: Api<S, A>) -> Self {
		Self { api }
	}
}

#[async_trait]
impl<S, A> ProbeTarget for InProcessTarget<S, A>
where
	S: ResourceStore + ?Sized + 'static,
	A: Authenticator + ?Sized + 'static,
{
	async fn send(&self, probe: &Probe) -> Result<StatusCode, TargetError> {
		if probe.action != Action::Read {
			return Err(TargetError::UnsupportedAction(probe.action));
		}
		let response = self
			.api
			.handle(
				Some(probe.credential.as_str()),
				probe.strategy,
				ApiRequest::read(probe.resource_type, probe.id),
			)
			.await;
		Ok(response.status)
	}
}
