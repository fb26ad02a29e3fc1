// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use anyhow::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use warden_auth::StaticTokenAuthenticator;
use warden_config::{StoreBackend, StoreConfig, WardenConfig};
use warden_enforce::Api;
use warden_probe::{
	run_scenarios, standard_cases, GroundTruth, InProcessTarget, ProbePlan, ProbeReport, Prober,
	ScenarioResult,
};
use warden_store::{seed_demo, DemoFixture, MemoryStore, ResourceStore, SqliteStore};

type DynStore = dyn ResourceStore;

/// Open the configured backend and seed the demo fixture into it.
#[instrument(skip_all, fields(backend = %config.backend))]
async fn open_seeded_store(config: &StoreConfig) -> anyhow::Result<(Arc<DynStore>, DemoFixture)> {
	let store: Arc<DynStore> = match config.backend {
		StoreBackend::Memory => Arc::new(MemoryStore::new()),
		StoreBackend::Sqlite => Arc::new(
			SqliteStore::connect(&config.url)
				.await
				.with_context(|| format!("failed to open sqlite store at {}", config.url))?,
		),
	};
	let fixture = seed_demo(store.as_ref())
		.await
		.context("failed to seed the demo fixture (the store must start empty)")?;
	Ok((store, fixture))
}

fn api(store: Arc<DynStore>, fixture: &DemoFixture) -> Api<DynStore, StaticTokenAuthenticator> {
	Api::new(store, Arc::new(fixture.authenticator()))
}

fn print_scenarios(results: &[ScenarioResult]) {
	for result in results {
		let mark = if result.passed { "ok  " } else { "FAIL" };
		println!(
			"{mark} {:<28} {:<10} {:<16} expected {} got {}",
			result.name, result.identity, result.strategy, result.expected, result.actual
		);
	}
	let failed = results.iter().filter(|r| !r.passed).count();
	println!("{} scenarios, {} failed", results.len(), failed);
}

/// Seed, probe every planned tuple, replay the scenario suite and write the report.
pub async fn probe(config: &WardenConfig, output: PathBuf) -> anyhow::Result<ExitCode> {
	let (store, fixture) = open_seeded_store(&config.store).await?;

	let plan = ProbePlan::for_fixture(
		&fixture,
		config.probe.strategies.clone(),
		config.probe.resources.clone(),
		config.probe.ids(),
	);
	plan.validate().context("invalid probe plan")?;
	let truths = GroundTruth::capture_all(store.as_ref(), &plan.resource_types, plan.ids.clone())
		.await
		.context("failed to capture ground truth")?;

	let prober = Prober::new(config.probe.concurrency, config.probe.timeout());
	let target = Arc::new(InProcessTarget::new(api(Arc::clone(&store), &fixture)));
	let run = prober
		.run(&plan, target, &truths)
		.await
		.context("probe run failed")?;

	// Scenarios mutate the store, so they run after the read-only sweep.
	let scenarios = run_scenarios(&api(store, &fixture), &standard_cases(&fixture)).await;

	let report = ProbeReport::build(
		config.store.backend.as_str(),
		&plan,
		&prober,
		run,
		&truths,
		scenarios,
	);

	print!("{}", report.render_table());
	println!();
	print_scenarios(&report.scenarios);
	println!(
		"{} probes, {} inconclusive, {} violations",
		report.config.probes, report.config.inconclusive, report.config.violations
	);

	report
		.write_json(&output)
		.with_context(|| format!("failed to write report to {}", output.display()))?;
	println!("report written to {}", output.display());

	if report.is_clean() {
		info!(run_id = %report.run_id, "probe run clean");
		Ok(ExitCode::SUCCESS)
	} else {
		for violation in &report.violations {
			warn!(
				identity = %violation.identity,
				strategy = %violation.strategy,
				resource = %violation.resource_type,
				id = violation.id,
				expected = %violation.expected,
				observed = %violation.observed,
				"enforcement violation"
			);
		}
		Ok(ExitCode::FAILURE)
	}
}

/// Seed and replay only the scenario suite.
pub async fn scenarios(config: &WardenConfig) -> anyhow::Result<ExitCode> {
	let (store, fixture) = open_seeded_store(&config.store).await?;
	let results = run_scenarios(&api(store, &fixture), &standard_cases(&fixture)).await;
	print_scenarios(&results);

	if results.iter().all(|r| r.passed) {
		Ok(ExitCode::SUCCESS)
	} else {
		Ok(ExitCode::FAILURE)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn probe_writes_a_clean_report() {
		let dir = tempfile::tempdir().unwrap();
		let output = dir.path().join("reports").join("warden-report.json");

		let code = probe(&WardenConfig::default(), output.clone()).await.unwrap();

		assert_eq!(code, ExitCode::SUCCESS);
		assert!(output.exists());
	}

	#[tokio::test]
	async fn scenarios_pass_against_sqlite_memory() {
		let mut config = WardenConfig::default();
		config.store.backend = StoreBackend::Sqlite;

		let code = scenarios(&config).await.unwrap();
		assert_eq!(code, ExitCode::SUCCESS);
	}
}
