// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};

use crate::result::ProbeResult;

pub const DEFAULT_SHARDS: usize = 16;

/// Append-only result log shared by concurrent probe tasks.
///
/// Results are spread over independently locked shards by a hash of their
/// tuple, so concurrent writers rarely contend on the same lock.
#[derive(Debug)]
pub struct ShardedAccumulator {
	shards: Vec<Mutex<Vec<ProbeResult>>>,
}

impl Default for ShardedAccumulator {
	fn default() -> Self {
		Self::new(DEFAULT_SHARDS)
	}
}

impl ShardedAccumulator {
	pub fn new(shards: usize) -> Self {
		let shards = (0..shards.max(1)).map(|_| Mutex::new(Vec::new())).collect();
		Self { shards }
	}

	fn shard_for(&self, result: &ProbeResult) -> usize {
		let mut hasher = DefaultHasher::new();
		result.sort_key().hash(&mut hasher);
		(hasher.finish() % self.shards.len() as u64) as usize
	}

	pub fn push(&self, result: ProbeResult) {
		let shard = &self.shards[self.shard_for(&result)];
		shard
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.push(result);
	}

	pub fn len(&self) -> usize {
		self
			.shards
			.iter()
			.map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
			.sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Drain every shard, sorted by (resource type, identity, strategy, id).
	pub fn take_sorted(&self) -> Vec<ProbeResult> {
		let mut merged: Vec<ProbeResult> = self
			.shards
			.iter()
			.flat_map(|s| std::mem::take(&mut *s.lock().unwrap_or_else(PoisonError::into_inner)))
			.collect();
		merged.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
		merged
	}
}
