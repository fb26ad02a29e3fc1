// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expectations and enumeration-leak analysis.
//!
//! A caller *discovers* a foreign id when the response it got for that id is
//! a denial (401/403) that the strategy would not give had the id been
//! missing, and that was never observed on a missing id under the same
//! (identity, strategy, resource type). Such a denial can only mean "exists".
//! The first check holds even when the swept range contains no missing ids.
//! `NotFound` never discovers anything, and `SystemError` results are
//! excluded from both sides of the rate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use warden_auth::{Identity, ResourceType};
use warden_enforce::Strategy;

use crate::ground_truth::{Partition, Truths};
use crate::result::{ProbeResult, StatusClass};

/// The status class a read probe should produce.
pub fn expected_class(
	strategy: Strategy,
	resource_type: ResourceType,
	identity: &Identity,
	partition: Partition,
	id: i64,
) -> StatusClass {
	match partition {
		Partition::Own | Partition::Shared => StatusClass::Allow,
		Partition::Foreign => match strategy {
			Strategy::OwnershipFirst | Strategy::ExistenceFirst => StatusClass::Forbidden,
			Strategy::FilteredQuery => StatusClass::NotFound,
		},
		Partition::Missing => {
			let foreign_user_id = resource_type == ResourceType::User
				&& !identity.is_admin()
				&& identity.id.get() != id;
			if strategy == Strategy::OwnershipFirst && foreign_user_id {
				StatusClass::Forbidden
			} else {
				StatusClass::NotFound
			}
		}
	}
}

/// A probe whose observed class differs from its expected class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
	pub identity: String,
	pub strategy: Strategy,
	pub resource_type: ResourceType,
	pub id: i64,
	pub partition: Partition,
	pub expected: StatusClass,
	pub observed: StatusClass,
	pub status: u16,
}

/// Compare every conclusive result against its expectation.
pub fn find_violations(results: &[ProbeResult], truths: &Truths) -> Vec<Violation> {
	results
		.iter()
		.filter(|r| r.class != StatusClass::SystemError)
		.filter_map(|r| {
			let truth = truths.get(&r.resource_type)?;
			let partition = truth.partition(&r.principal, r.id);
			let expected = expected_class(r.strategy, r.resource_type, &r.principal, partition, r.id);
			(expected != r.class).then(|| Violation {
				identity: r.identity.clone(),
				strategy: r.strategy,
				resource_type: r.resource_type,
				id: r.id,
				partition,
				expected,
				observed: r.class,
				status: r.status,
			})
		})
		.collect()
}

/// Enumeration leakage for one (resource type, identity, strategy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakageReport {
	pub resource_type: ResourceType,
	pub identity: String,
	pub strategy: Strategy,
	pub discovered_ids: BTreeSet<i64>,
	/// Foreign ids with a conclusive result; the rate's denominator.
	pub foreign_ids: usize,
	/// Foreign ids whose probe ended in a system error.
	pub inconclusive: usize,
	pub discovery_rate: f64,
}

type GroupKey<'a> = (ResourceType, &'a str, Strategy);

/// Compute a leakage report for every (resource type, identity, strategy)
/// present in `results`, in that order.
pub fn analyze(results: &[ProbeResult], truths: &Truths) -> Vec<LeakageReport> {
	let mut groups: BTreeMap<GroupKey<'_>, Vec<&ProbeResult>> = BTreeMap::new();
	for result in results {
		groups
			.entry((result.resource_type, result.identity.as_str(), result.strategy))
			.or_default()
			.push(result);
	}

	groups
		.into_iter()
		.filter_map(|((resource_type, identity, strategy), group)| {
			let truth = truths.get(&resource_type)?;
			let partitioned: Vec<(Partition, &ProbeResult)> = group
				.into_iter()
				.map(|r| (truth.partition(&r.principal, r.id), r))
				.collect();

			let missing_denials: BTreeSet<StatusClass> = partitioned
				.iter()
				.filter(|(p, r)| *p == Partition::Missing && r.class.is_denial())
				.map(|(_, r)| r.class)
				.collect();

			let mut discovered_ids = BTreeSet::new();
			let mut foreign_ids = 0;
			let mut inconclusive = 0;
			for (partition, result) in &partitioned {
				if *partition != Partition::Foreign {
					continue;
				}
				if result.class == StatusClass::SystemError {
					inconclusive += 1;
					continue;
				}
				foreign_ids += 1;
				let if_missing = expected_class(
					strategy,
					resource_type,
					&result.principal,
					Partition::Missing,
					result.id,
				);
				if result.class.is_denial()
					&& result.class != if_missing
					&& !missing_denials.contains(&result.class)
				{
					discovered_ids.insert(result.id);
				}
			}

			let discovery_rate = if foreign_ids == 0 {
				0.0
			} else {
				discovered_ids.len() as f64 / foreign_ids as f64
			};

			Some(LeakageReport {
				resource_type,
				identity: identity.to_string(),
				strategy,
				discovered_ids,
				foreign_ids,
				inconclusive,
				discovery_rate,
			})
		})
		.collect()
}
