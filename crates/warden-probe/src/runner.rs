// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bounded-parallel probe execution.
//!
//! Every tuple of the plan becomes one task on a [`JoinSet`]. A shared
//! [`Semaphore`] caps how many probes are in flight, and each probe is wrapped
//! in its own timeout. A timeout, target error or panic is recorded as a
//! `SystemError` for the tuple that produced it; the rest of the batch runs on.

use http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{error, info, instrument, warn};

use crate::accumulator::ShardedAccumulator;
use crate::analysis::{find_violations, Violation};
use crate::error::Result;
use crate::ground_truth::Truths;
use crate::plan::ProbePlan;
use crate::result::{ProbeResult, StatusClass};
use crate::target::{Probe, ProbeTarget};

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Everything one probe run observed.
#[derive(Debug, Clone, Default)]
pub struct ProbeRun {
	pub results: Vec<ProbeResult>,
	pub violations: Vec<Violation>,
}

impl ProbeRun {
	pub fn inconclusive(&self) -> usize {
		self
			.results
			.iter()
			.filter(|r| r.class == StatusClass::SystemError)
			.count()
	}
}

#[derive(Debug, Clone)]
pub struct Prober {
	concurrency: usize,
	timeout: Duration,
}

impl Default for Prober {
	fn default() -> Self {
		Self::new(DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT)
	}
}

fn record(probe: &Probe, status: Option<StatusCode>, elapsed: Duration) -> ProbeResult {
	let (status, class) = match status {
		Some(status) => (status.as_u16(), StatusClass::from_status(status)),
		None => (0, StatusClass::SystemError),
	};
	ProbeResult {
		identity: probe.identity_name.clone(),
		principal: probe.identity,
		strategy: probe.strategy,
		resource_type: probe.resource_type,
		id: probe.id,
		status,
		class,
		elapsed_ms: elapsed.as_secs_f64() * 1000.0,
	}
}

impl Prober {
	pub fn new(concurrency: usize, timeout: Duration) -> Self {
		Self {
			concurrency: concurrency.max(1),
			timeout,
		}
	}

	pub fn concurrency(&self) -> usize {
		self.concurrency
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	fn expand(plan: &ProbePlan) -> Vec<Probe> {
		let mut probes = Vec::with_capacity(plan.len());
		for who in &plan.identities {
			for strategy in &plan.strategies {
				for resource_type in &plan.resource_types {
					for id in plan.ids.clone() {
						probes.push(Probe {
							identity_name: who.name.clone(),
							credential: who.credential.clone(),
							identity: who.identity,
							strategy: *strategy,
							resource_type: *resource_type,
							id,
							action: plan.action,
						});
					}
				}
			}
		}
		probes
	}

	/// Issue one attempt per plan tuple and check each against `truths`.
	#[instrument(
		skip_all,
		fields(probes = plan.len(), concurrency = self.concurrency, timeout_ms = self.timeout.as_millis() as u64)
	)]
	pub async fn run<T>(&self, plan: &ProbePlan, target: Arc<T>, truths: &Truths) -> Result<ProbeRun>
	where
		T: ProbeTarget + ?Sized + 'static,
	{
		plan.validate()?;
		let probes = Self::expand(plan);
		let accumulator = Arc::new(ShardedAccumulator::default());
		let semaphore = Arc::new(Semaphore::new(self.concurrency));
		let mut set = JoinSet::new();
		let mut tuples: HashMap<task::Id, Probe> = HashMap::with_capacity(probes.len());
		let started = Instant::now();

		for probe in probes {
			let target = Arc::clone(&target);
			let semaphore = Arc::clone(&semaphore);
			let accumulator = Arc::clone(&accumulator);
			let timeout = self.timeout;
			let task_probe = probe.clone();

			let handle = set.spawn(async move {
				let probe = task_probe;
				// Held until the probe finishes so in-flight work stays bounded.
				let Ok(_permit) = semaphore.acquire_owned().await else {
					accumulator.push(record(&probe, None, Duration::ZERO));
					return;
				};

				let sent = Instant::now();
				let status = match tokio::time::timeout(timeout, target.send(&probe)).await {
					Ok(Ok(status)) => Some(status),
					Ok(Err(e)) => {
						warn!(
							identity = %probe.identity_name,
							strategy = %probe.strategy,
							resource = %probe.resource_type,
							id = probe.id,
							error = %e,
							"probe failed"
						);
						None
					}
					Err(_) => {
						warn!(
							identity = %probe.identity_name,
							strategy = %probe.strategy,
							resource = %probe.resource_type,
							id = probe.id,
							"probe timed out"
						);
						None
					}
				};
				accumulator.push(record(&probe, status, sent.elapsed()));
			});
			tuples.insert(handle.id(), probe);
		}

		while let Some(joined) = set.join_next_with_id().await {
			match joined {
				Ok((id, ())) => {
					tuples.remove(&id);
				}
				Err(join_error) => {
					let Some(probe) = tuples.remove(&join_error.id()) else {
						error!(error = %join_error, "probe task failed with unknown id");
						continue;
					};
					error!(
						identity = %probe.identity_name,
						strategy = %probe.strategy,
						resource = %probe.resource_type,
						id = probe.id,
						error = %join_error,
						"probe task panicked"
					);
					accumulator.push(record(&probe, None, Duration::ZERO));
				}
			}
		}

		let results = accumulator.take_sorted();
		let violations = find_violations(&results, truths);

		let run = ProbeRun {
			results,
			violations,
		};
		info!(
			results = run.results.len(),
			violations = run.violations.len(),
			inconclusive = run.inconclusive(),
			elapsed_ms = started.elapsed().as_millis() as u64,
			"probe run complete"
		);
		Ok(run)
	}
}
