// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use std::sync::Arc;
use warden_auth::StaticTokenAuthenticator;
use warden_enforce::{Api, ApiRequest, Strategy};
use warden_store::{seed_demo, DemoFixture, MemoryStore};

pub struct TestApp {
	pub api: Api<MemoryStore, StaticTokenAuthenticator>,
	pub fixtures: DemoFixture,
}

impl TestApp {
	pub async fn new() -> Self {
		let store = Arc::new(MemoryStore::new());
		let fixtures = seed_demo(store.as_ref())
			.await
			.expect("seeding an empty store succeeds");
		let api = Api::new(store, Arc::new(fixtures.authenticator()));
		Self { api, fixtures }
	}
}

pub struct AuthzCase {
	pub name: &'static str,
	pub token: Option<&'static str>,
	pub strategy: Strategy,
	pub request: ApiRequest,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = app
			.api
			.handle(case.token, case.strategy, case.request.clone())
			.await;

		if response.status != case.expected_status {
			panic!(
				"Case '{}': {} {}/{} under {} - expected {}, got {}\nResponse body: {}",
				case.name,
				case.request.operation.name(),
				case.request.resource_type,
				case.request.id,
				case.strategy,
				case.expected_status,
				response.status,
				response.body
			);
		}
	}
}

/// One case per strategy with the same request and expectation.
pub fn for_every_strategy(
	name: &'static str,
	token: Option<&'static str>,
	request: ApiRequest,
	expected_status: StatusCode,
) -> Vec<AuthzCase> {
	Strategy::ALL
		.into_iter()
		.map(|strategy| AuthzCase {
			name,
			token,
			strategy,
			request: request.clone(),
			expected_status,
		})
		.collect()
}
