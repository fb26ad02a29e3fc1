// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Enumeration probing for Warden enforcement strategies.
//!
//! A [`ProbePlan`] names the identities, strategies, resource types and id
//! range to sweep. [`Prober`] issues every tuple against a [`ProbeTarget`] with
//! bounded parallelism, and [`analyze`] turns the results into per-caller
//! discovery rates by comparing them with the [`GroundTruth`] read directly
//! from the store. [`run_scenarios`] replays fixed endpoint checks, and
//! [`ProbeReport`] bundles everything into one JSON artifact.

pub mod accumulator;
pub mod analysis;
pub mod error;
pub mod ground_truth;
pub mod plan;
pub mod report;
pub mod result;
pub mod runner;
pub mod scenario;
pub mod target;

pub use accumulator::ShardedAccumulator;
pub use analysis::{analyze, expected_class, find_violations, LeakageReport, Violation};
pub use error::{ProbeError, Result};
pub use ground_truth::{GroundTruth, Partition, Presence, Truths};
pub use plan::{id_count, ProbeIdentity, ProbePlan, MAX_PLAN_IDS};
pub use report::{LeakageMap, ProbeReport, RunSummary};
pub use result::{ProbeResult, StatusClass};
pub use runner::{ProbeRun, Prober, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
pub use scenario::{run_scenarios, standard_cases, ScenarioCase, ScenarioRequest, ScenarioResult};
pub use target::{InProcessTarget, Probe, ProbeTarget, TargetError};
