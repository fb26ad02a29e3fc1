// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! What actually exists in the store, read without any enforcement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::debug;
use warden_auth::{Identity, ResourceType, UserId};
use warden_store::{find_by_id, ResourceStore, StoreError};

/// Ground truth for every probed resource type.
pub type Truths = BTreeMap<ResourceType, GroundTruth>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Presence {
	Missing,
	Exists { owner: Option<UserId> },
}

/// How an id relates to a particular caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
	/// Exists and belongs to the caller (every existing id, for an admin).
	Own,
	/// Exists and belongs to someone else.
	Foreign,
	/// Exists and has no owner.
	Shared,
	Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundTruth {
	resource_type: ResourceType,
	entries: BTreeMap<i64, Presence>,
}

impl GroundTruth {
	/// Read every id in `ids` straight from the store.
	pub async fn capture<S>(
		store: &S,
		resource_type: ResourceType,
		ids: RangeInclusive<i64>,
	) -> Result<Self, StoreError>
	where
		S: ResourceStore + ?Sized,
	{
		let mut entries = BTreeMap::new();
		for id in ids {
			let presence = match find_by_id(store, resource_type, id).await? {
				Some(entity) => Presence::Exists {
					owner: entity.owner_id(),
				},
				None => Presence::Missing,
			};
			entries.insert(id, presence);
		}
		debug!(
			%resource_type,
			existing = entries.values().filter(|p| **p != Presence::Missing).count(),
			"captured ground truth"
		);
		Ok(Self {
			resource_type,
			entries,
		})
	}

	pub async fn capture_all<S>(
		store: &S,
		resource_types: &[ResourceType],
		ids: RangeInclusive<i64>,
	) -> Result<Truths, StoreError>
	where
		S: ResourceStore + ?Sized,
	{
		let mut truths = Truths::new();
		for resource_type in resource_types {
			let truth = Self::capture(store, *resource_type, ids.clone()).await?;
			truths.insert(*resource_type, truth);
		}
		Ok(truths)
	}

	pub fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	pub fn presence(&self, id: i64) -> Presence {
		self.entries.get(&id).copied().unwrap_or(Presence::Missing)
	}

	pub fn partition(&self, identity: &Identity, id: i64) -> Partition {
		match self.presence(id) {
			Presence::Missing => Partition::Missing,
			Presence::Exists { .. } if identity.is_admin() => Partition::Own,
			Presence::Exists { owner: None } => Partition::Shared,
			Presence::Exists { owner: Some(owner) } if identity.owns(owner) => Partition::Own,
			Presence::Exists { owner: Some(_) } => Partition::Foreign,
		}
	}

	/// Ids that exist and belong to someone other than `identity`.
	pub fn foreign_ids(&self, identity: &Identity) -> Vec<i64> {
		self
			.entries
			.keys()
			.copied()
			.filter(|id| self.partition(identity, *id) == Partition::Foreign)
			.collect()
	}
}
