// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The run artifact: results, leakage, violations and scenario outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;
use uuid::Uuid;
use warden_auth::ResourceType;
use warden_enforce::Strategy;

use crate::analysis::{analyze, LeakageReport, Violation};
use crate::error::{ProbeError, Result};
use crate::ground_truth::Truths;
use crate::plan::ProbePlan;
use crate::result::ProbeResult;
use crate::runner::{ProbeRun, Prober};
use crate::scenario::ScenarioResult;

/// Leakage keyed by resource type, then identity.
pub type LeakageMap = BTreeMap<String, BTreeMap<String, Vec<LeakageReport>>>;

/// The settings a run was made with, plus headline counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
	pub store_backend: String,
	pub strategies: Vec<Strategy>,
	pub resource_types: Vec<ResourceType>,
	pub id_start: i64,
	pub id_end: i64,
	pub concurrency: usize,
	pub timeout_ms: u64,
	pub probes: usize,
	pub inconclusive: usize,
	pub violations: usize,
	pub scenarios_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
	pub run_id: Uuid,
	pub generated_at: DateTime<Utc>,
	pub config: RunSummary,
	pub results: Vec<ProbeResult>,
	pub leakage: LeakageMap,
	pub violations: Vec<Violation>,
	pub scenarios: Vec<ScenarioResult>,
}

fn group_leakage(reports: Vec<LeakageReport>) -> LeakageMap {
	let mut leakage = LeakageMap::new();
	for report in reports {
		leakage
			.entry(report.resource_type.to_string())
			.or_default()
			.entry(report.identity.clone())
			.or_default()
			.push(report);
	}
	leakage
}

impl ProbeReport {
	pub fn build(
		store_backend: impl Into<String>,
		plan: &ProbePlan,
		prober: &Prober,
		run: ProbeRun,
		truths: &Truths,
		scenarios: Vec<ScenarioResult>,
	) -> Self {
		let config = RunSummary {
			store_backend: store_backend.into(),
			strategies: plan.strategies.clone(),
			resource_types: plan.resource_types.clone(),
			id_start: *plan.ids.start(),
			id_end: *plan.ids.end(),
			concurrency: prober.concurrency(),
			timeout_ms: u64::try_from(prober.timeout().as_millis()).unwrap_or(u64::MAX),
			probes: run.results.len(),
			inconclusive: run.inconclusive(),
			violations: run.violations.len(),
			scenarios_failed: scenarios.iter().filter(|s| !s.passed).count(),
		};
		let leakage = group_leakage(analyze(&run.results, truths));

		Self {
			run_id: Uuid::new_v4(),
			generated_at: Utc::now(),
			config,
			results: run.results,
			leakage,
			violations: run.violations,
			scenarios,
		}
	}

	/// No violations and every scenario passed.
	pub fn is_clean(&self) -> bool {
		self.violations.is_empty() && self.scenarios.iter().all(|s| s.passed)
	}

	pub fn leakage_reports(&self) -> impl Iterator<Item = &LeakageReport> {
		self
			.leakage
			.values()
			.flat_map(|by_identity| by_identity.values())
			.flatten()
	}

	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Write the report as pretty JSON, creating the parent directory.
	pub fn write_json(&self, path: &Path) -> Result<()> {
		let write_err = |source| ProbeError::ReportWrite {
			path: path.to_path_buf(),
			source,
		};
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(write_err)?;
		}
		let json = self.to_json()?;
		std::fs::write(path, json).map_err(write_err)?;
		info!(path = %path.display(), run_id = %self.run_id, "wrote probe report");
		Ok(())
	}

	/// Leakage as a fixed-width table.
	pub fn render_table(&self) -> String {
		let mut out = String::new();
		let _ = writeln!(
			out,
			"{:<10} {:<12} {:<18} {:<20} {:>6}",
			"RESOURCE", "IDENTITY", "STRATEGY", "DISCOVERED", "RATE"
		);
		for report in self.leakage_reports() {
			let discovered = format!("{}/{}", report.discovered_ids.len(), report.foreign_ids);
			let _ = writeln!(
				out,
				"{:<10} {:<12} {:<18} {:<20} {:>6.2}",
				report.resource_type.as_str(),
				report.identity,
				report.strategy.as_str(),
				discovered,
				report.discovery_rate
			);
		}
		out
	}
}
