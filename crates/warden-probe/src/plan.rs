// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use warden_auth::{Action, Identity, ResourceType};
use warden_enforce::Strategy;
use warden_store::DemoFixture;

use crate::error::{ProbeError, Result};

/// Widest id range a single plan may sweep.
pub const MAX_PLAN_IDS: u64 = 100_000;

/// Number of ids in `ids`, saturating at `u64::MAX`.
pub fn id_count(ids: &RangeInclusive<i64>) -> u64 {
	if ids.is_empty() {
		return 0;
	}
	let span = i128::from(*ids.end()) - i128::from(*ids.start()) + 1;
	u64::try_from(span).unwrap_or(u64::MAX)
}

/// A caller the prober impersonates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeIdentity {
	pub name: String,
	pub credential: String,
	pub identity: Identity,
}

impl ProbeIdentity {
	pub fn new(name: impl Into<String>, credential: impl Into<String>, identity: Identity) -> Self {
		Self {
			name: name.into(),
			credential: credential.into(),
			identity,
		}
	}
}

/// Every (identity, strategy, resource type, id) tuple to attempt.
#[derive(Debug, Clone)]
pub struct ProbePlan {
	pub identities: Vec<ProbeIdentity>,
	pub strategies: Vec<Strategy>,
	pub resource_types: Vec<ResourceType>,
	pub ids: RangeInclusive<i64>,
	pub action: Action,
}

impl ProbePlan {
	/// Plan covering every seeded user of the demo fixture.
	pub fn for_fixture(
		fixture: &DemoFixture,
		strategies: Vec<Strategy>,
		resource_types: Vec<ResourceType>,
		ids: RangeInclusive<i64>,
	) -> Self {
		let identities = fixture
			.users()
			.into_iter()
			.map(|u| ProbeIdentity::new(&u.username, &u.token, u.identity))
			.collect();
		Self {
			identities,
			strategies,
			resource_types,
			ids,
			action: Action::Read,
		}
	}

	pub fn validate(&self) -> Result<()> {
		if !self.identities.iter().any(|p| p.identity.is_admin()) {
			return Err(ProbeError::InvalidPlan(
				"at least one admin identity is required".to_string(),
			));
		}

		let regular: BTreeSet<_> = self
			.identities
			.iter()
			.filter(|p| !p.identity.is_admin())
			.map(|p| p.identity.id)
			.collect();
		if regular.len() < 2 {
			return Err(ProbeError::InvalidPlan(
				"at least two distinct non-admin identities are required".to_string(),
			));
		}

		let names: BTreeSet<_> = self.identities.iter().map(|p| p.name.as_str()).collect();
		if names.len() != self.identities.len() {
			return Err(ProbeError::InvalidPlan(
				"identity names must be unique".to_string(),
			));
		}

		if self.strategies.is_empty() {
			return Err(ProbeError::InvalidPlan(
				"at least one strategy is required".to_string(),
			));
		}
		if self.resource_types.is_empty() {
			return Err(ProbeError::InvalidPlan(
				"at least one resource type is required".to_string(),
			));
		}
		if self.ids.is_empty() {
			return Err(ProbeError::InvalidPlan(format!(
				"id range {}..={} is empty",
				self.ids.start(),
				self.ids.end()
			)));
		}
		let ids = id_count(&self.ids);
		if ids > MAX_PLAN_IDS {
			return Err(ProbeError::InvalidPlan(format!(
				"id range {}..={} spans {ids} ids, more than the limit of {MAX_PLAN_IDS}",
				self.ids.start(),
				self.ids.end()
			)));
		}
		if self.action.is_mutation() {
			return Err(ProbeError::InvalidPlan(format!(
				"probes must not mutate, got action {}",
				self.action
			)));
		}
		Ok(())
	}

	/// Number of probe tuples this plan expands to.
	pub fn len(&self) -> usize {
		let ids = usize::try_from(id_count(&self.ids)).unwrap_or(usize::MAX);
		self
			.identities
			.len()
			.saturating_mul(self.strategies.len())
			.saturating_mul(self.resource_types.len())
			.saturating_mul(ids)
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
