// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end probe runs against in-process stores.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use warden_auth::{ResourceType, StaticTokenAuthenticator};
use warden_enforce::{Api, Strategy};
use warden_probe::{
	analyze, run_scenarios, standard_cases, GroundTruth, InProcessTarget, LeakageReport, ProbePlan,
	ProbeReport, ProbeRun, Prober, StatusClass, Truths,
};
use warden_store::testing::{FailingStore, SlowStore};
use warden_store::{seed_demo, DemoFixture, MemoryStore, ResourceStore};

const RESOURCES: [ResourceType; 2] = [ResourceType::User, ResourceType::Order];

fn plan(fixture: &DemoFixture) -> ProbePlan {
	ProbePlan::for_fixture(fixture, Strategy::ALL.to_vec(), RESOURCES.to_vec(), 0..=6)
}

async fn seeded() -> (Arc<MemoryStore>, DemoFixture, Truths) {
	let store = Arc::new(MemoryStore::new());
	let fixture = seed_demo(store.as_ref())
		.await
		.expect("seeding an empty store succeeds");
	let truths = GroundTruth::capture_all(store.as_ref(), &RESOURCES, 0..=6)
		.await
		.expect("memory store lookups succeed");
	(store, fixture, truths)
}

async fn probe<S>(prober: &Prober, store: Arc<S>, fixture: &DemoFixture, truths: &Truths) -> ProbeRun
where
	S: ResourceStore + 'static,
{
	let api: Api<S, StaticTokenAuthenticator> = Api::new(store, Arc::new(fixture.authenticator()));
	prober
		.run(&plan(fixture), Arc::new(InProcessTarget::new(api)), truths)
		.await
		.expect("plan is valid")
}

fn leakage<'a>(
	reports: &'a [LeakageReport],
	resource_type: ResourceType,
	identity: &str,
	strategy: Strategy,
) -> &'a LeakageReport {
	reports
		.iter()
		.find(|r| r.resource_type == resource_type && r.identity == identity && r.strategy == strategy)
		.unwrap_or_else(|| panic!("no leakage report for {resource_type}/{identity}/{strategy}"))
}

// ============================================================================
// Healthy store
// ============================================================================

#[tokio::test]
async fn every_tuple_is_probed_and_matches_expectations() {
	let (store, fixture, truths) = seeded().await;
	let run = probe(&Prober::default(), store, &fixture, &truths).await;

	assert_eq!(run.results.len(), plan(&fixture).len());
	assert_eq!(run.inconclusive(), 0);
	assert!(run.violations.is_empty(), "violations: {:#?}", run.violations);
}

#[tokio::test]
async fn discovery_rates_per_strategy() {
	let (store, fixture, truths) = seeded().await;
	let run = probe(&Prober::default(), store, &fixture, &truths).await;
	let reports = analyze(&run.results, &truths);

	let existence = leakage(&reports, ResourceType::Order, "john", Strategy::ExistenceFirst);
	assert_eq!(existence.discovered_ids, BTreeSet::from([4, 5]));
	assert_eq!(existence.discovery_rate, 1.0);

	let bob_existence = leakage(&reports, ResourceType::Order, "bob", Strategy::ExistenceFirst);
	assert_eq!(bob_existence.discovered_ids, BTreeSet::from([1, 2, 3]));

	for resource_type in RESOURCES {
		for identity in ["john", "bob"] {
			let filtered = leakage(&reports, resource_type, identity, Strategy::FilteredQuery);
			assert!(filtered.discovered_ids.is_empty());
			assert_eq!(filtered.discovery_rate, 0.0);
		}
	}

	let ownership_users = leakage(&reports, ResourceType::User, "john", Strategy::OwnershipFirst);
	assert_eq!(ownership_users.discovery_rate, 0.0);
	assert_eq!(ownership_users.foreign_ids, 2);

	let ownership_orders = leakage(&reports, ResourceType::Order, "john", Strategy::OwnershipFirst);
	assert_eq!(ownership_orders.discovered_ids, existence.discovered_ids);
}

#[tokio::test]
async fn range_of_existing_users_only_keeps_ownership_first_opaque() {
	let store = Arc::new(MemoryStore::new());
	let fixture = seed_demo(store.as_ref()).await.expect("seeds");
	let users = [ResourceType::User];
	let truths = GroundTruth::capture_all(store.as_ref(), &users, 1..=3)
		.await
		.expect("lookups succeed");
	let plan = ProbePlan::for_fixture(
		&fixture,
		vec![Strategy::OwnershipFirst, Strategy::ExistenceFirst],
		users.to_vec(),
		1..=3,
	);
	let api: Api<MemoryStore, StaticTokenAuthenticator> =
		Api::new(store, Arc::new(fixture.authenticator()));
	let run = Prober::default()
		.run(&plan, Arc::new(InProcessTarget::new(api)), &truths)
		.await
		.expect("plan is valid");
	let reports = analyze(&run.results, &truths);

	for (identity, foreign) in [("john", BTreeSet::from([1, 3])), ("bob", BTreeSet::from([1, 2]))] {
		let ownership = leakage(&reports, ResourceType::User, identity, Strategy::OwnershipFirst);
		assert_eq!(ownership.foreign_ids, 2);
		assert!(ownership.discovered_ids.is_empty(), "{identity}: {ownership:?}");
		assert_eq!(ownership.discovery_rate, 0.0);

		let existence = leakage(&reports, ResourceType::User, identity, Strategy::ExistenceFirst);
		assert_eq!(existence.discovered_ids, foreign);
		assert_eq!(existence.discovery_rate, 1.0);
	}
}

#[tokio::test]
async fn admin_has_no_foreign_ids() {
	let (store, fixture, truths) = seeded().await;
	let run = probe(&Prober::default(), store, &fixture, &truths).await;

	for report in analyze(&run.results, &truths)
		.iter()
		.filter(|r| r.identity == "admin")
	{
		assert_eq!(report.foreign_ids, 0);
		assert_eq!(report.discovery_rate, 0.0);
	}
}

#[tokio::test]
async fn repeated_runs_observe_the_same_outcomes() {
	let (store, fixture, truths) = seeded().await;
	let prober = Prober::new(3, Duration::from_secs(2));
	let first = probe(&prober, Arc::clone(&store), &fixture, &truths).await;
	let second = probe(&prober, store, &fixture, &truths).await;

	let outcomes = |run: &ProbeRun| {
		run.results
			.iter()
			.map(|r| (r.resource_type, r.identity.clone(), r.strategy, r.id, r.status))
			.collect::<Vec<_>>()
	};
	assert_eq!(outcomes(&first), outcomes(&second));
}

// ============================================================================
// Store faults
// ============================================================================

#[tokio::test]
async fn failing_store_is_inconclusive_not_a_leak() {
	let (_store, fixture, truths) = seeded().await;
	let run = probe(&Prober::default(), Arc::new(FailingStore), &fixture, &truths).await;

	assert_eq!(run.results.len(), plan(&fixture).len());
	assert!(run.inconclusive() > 0);
	assert!(run.violations.is_empty(), "violations: {:#?}", run.violations);
	assert!(run
		.results
		.iter()
		.filter(|r| r.strategy == Strategy::ExistenceFirst)
		.all(|r| r.class == StatusClass::SystemError && r.status == 500));

	let reports = analyze(&run.results, &truths);
	let john = leakage(&reports, ResourceType::Order, "john", Strategy::ExistenceFirst);
	assert_eq!(john.inconclusive, 2);
	assert_eq!(john.foreign_ids, 0);
	assert_eq!(john.discovery_rate, 0.0);
}

#[tokio::test(start_paused = true)]
async fn slow_store_times_out_without_stalling_the_batch() {
	let inner = MemoryStore::new();
	let fixture = seed_demo(&inner).await.expect("seeding succeeds");
	let truths = GroundTruth::capture_all(&inner, &RESOURCES, 0..=6)
		.await
		.expect("memory store lookups succeed");
	let store = Arc::new(SlowStore::new(inner, Duration::from_secs(30)));

	let prober = Prober::new(4, Duration::from_millis(50));
	let run = probe(&prober, store, &fixture, &truths).await;

	assert_eq!(run.results.len(), plan(&fixture).len());
	let timed_out: Vec<_> = run
		.results
		.iter()
		.filter(|r| r.class == StatusClass::SystemError)
		.collect();
	assert!(!timed_out.is_empty());
	assert!(timed_out.iter().all(|r| r.status == 0));
	assert!(run.violations.is_empty());
	// Foreign user ids under ownership-first are refused before any lookup.
	assert!(run
		.results
		.iter()
		.filter(|r| r.strategy == Strategy::OwnershipFirst
			&& r.resource_type == ResourceType::User
			&& r.identity == "john"
			&& r.id != 2)
		.all(|r| r.class == StatusClass::Forbidden));
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn probe_then_scenarios_produce_a_clean_report() {
	let (store, fixture, truths) = seeded().await;
	let prober = Prober::default();
	let run = probe(&prober, Arc::clone(&store), &fixture, &truths).await;

	let api = Api::new(store, Arc::new(fixture.authenticator()));
	let scenarios = run_scenarios(&api, &standard_cases(&fixture)).await;

	let report = ProbeReport::build("memory", &plan(&fixture), &prober, run, &truths, scenarios);
	assert!(report.is_clean());
	assert_eq!(report.config.scenarios_failed, 0);

	let dir = tempfile::tempdir().expect("tempdir");
	let path = dir.path().join("warden-report.json");
	report.write_json(&path).expect("report is written");

	let json: serde_json::Value =
		serde_json::from_str(&std::fs::read_to_string(&path).expect("report is readable"))
			.expect("report is valid JSON");
	assert_eq!(
		json["leakage"]["order"]["john"][1]["discovery_rate"],
		serde_json::json!(1.0)
	);
}
