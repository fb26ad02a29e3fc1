// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Probe plan configuration section.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use warden_auth::ResourceType;
use warden_enforce::Strategy;

pub use warden_probe::DEFAULT_CONCURRENCY;

pub const DEFAULT_TIMEOUT_MS: u64 = warden_probe::DEFAULT_TIMEOUT.as_millis() as u64;
pub const DEFAULT_ID_START: i64 = 0;
pub const DEFAULT_ID_END: i64 = 6;

fn default_resources() -> Vec<ResourceType> {
	vec![ResourceType::User, ResourceType::Order]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfigLayer {
	pub concurrency: Option<usize>,
	pub timeout_ms: Option<u64>,
	pub id_start: Option<i64>,
	pub id_end: Option<i64>,
	pub strategies: Option<Vec<Strategy>>,
	pub resources: Option<Vec<ResourceType>>,
}

impl ProbeConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.concurrency.is_some() {
			self.concurrency = other.concurrency;
		}
		if other.timeout_ms.is_some() {
			self.timeout_ms = other.timeout_ms;
		}
		if other.id_start.is_some() {
			self.id_start = other.id_start;
		}
		if other.id_end.is_some() {
			self.id_end = other.id_end;
		}
		if other.strategies.is_some() {
			self.strategies = other.strategies;
		}
		if other.resources.is_some() {
			self.resources = other.resources;
		}
	}

	pub fn finalize(self) -> ProbeConfig {
		ProbeConfig {
			concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
			timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
			id_start: self.id_start.unwrap_or(DEFAULT_ID_START),
			id_end: self.id_end.unwrap_or(DEFAULT_ID_END),
			strategies: self.strategies.unwrap_or_else(|| Strategy::ALL.to_vec()),
			resources: self.resources.unwrap_or_else(default_resources),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeConfig {
	pub concurrency: usize,
	pub timeout_ms: u64,
	pub id_start: i64,
	pub id_end: i64,
	pub strategies: Vec<Strategy>,
	pub resources: Vec<ResourceType>,
}

impl Default for ProbeConfig {
	fn default() -> Self {
		ProbeConfigLayer::default().finalize()
	}
}

impl ProbeConfig {
	pub fn ids(&self) -> RangeInclusive<i64> {
		self.id_start..=self.id_end
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}
