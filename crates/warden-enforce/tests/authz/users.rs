// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for user resources.

use http::StatusCode;
use warden_auth::ResourceType;
use warden_enforce::{ApiRequest, Operation, Strategy};
use warden_store::{UserUpdate, ADMIN_TOKEN, BOB_TOKEN, JOHN_TOKEN};

use super::support::{for_every_strategy, run_authz_cases, AuthzCase, TestApp};

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn user_can_read_own_profile_under_every_strategy() {
	let app = TestApp::new().await;
	let cases = for_every_strategy(
		"john_reads_self",
		Some(JOHN_TOKEN),
		ApiRequest::read(ResourceType::User, 2),
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn admin_can_read_any_profile() {
	let app = TestApp::new().await;
	let mut cases = Vec::new();
	for id in [1, 2, 3] {
		cases.extend(for_every_strategy(
			"admin_reads_user",
			Some(ADMIN_TOKEN),
			ApiRequest::read(ResourceType::User, id),
			StatusCode::OK,
		));
	}
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn foreign_profile_status_depends_on_strategy() {
	let app = TestApp::new().await;
	let cases = vec![
		AuthzCase {
			name: "ownership_first_foreign_existing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::OwnershipFirst,
			request: ApiRequest::read(ResourceType::User, 3),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "ownership_first_foreign_missing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::OwnershipFirst,
			request: ApiRequest::read(ResourceType::User, 4),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "existence_first_foreign_existing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: ApiRequest::read(ResourceType::User, 3),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "existence_first_missing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: ApiRequest::read(ResourceType::User, 4),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "filtered_query_foreign_existing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::FilteredQuery,
			request: ApiRequest::read(ResourceType::User, 3),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "filtered_query_missing",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::FilteredQuery,
			request: ApiRequest::read(ResourceType::User, 4),
			expected_status: StatusCode::NOT_FOUND,
		},
	];
	run_authz_cases(&app, &cases).await;
}

// ============================================================================
// Updates
// ============================================================================

#[tokio::test]
async fn user_can_update_only_own_profile() {
	let app = TestApp::new().await;
	let rename = |id| {
		ApiRequest::new(
			ResourceType::User,
			id,
			Operation::UpdateUser(UserUpdate {
				email: Some(format!("user{id}@example.org")),
				..Default::default()
			}),
		)
	};

	let mut cases = for_every_strategy("bob_updates_self", Some(BOB_TOKEN), rename(3), StatusCode::OK);
	cases.push(AuthzCase {
		name: "bob_updates_john_existence_first",
		token: Some(BOB_TOKEN),
		strategy: Strategy::ExistenceFirst,
		request: rename(2),
		expected_status: StatusCode::FORBIDDEN,
	});
	cases.push(AuthzCase {
		name: "bob_updates_john_filtered_query",
		token: Some(BOB_TOKEN),
		strategy: Strategy::FilteredQuery,
		request: rename(2),
		expected_status: StatusCode::NOT_FOUND,
	});
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
	let app = TestApp::new().await;
	let mut cases = for_every_strategy(
		"anonymous_reads_user",
		None,
		ApiRequest::read(ResourceType::User, 2),
		StatusCode::UNAUTHORIZED,
	);
	cases.extend(for_every_strategy(
		"bad_token_reads_user",
		Some("not-a-token"),
		ApiRequest::read(ResourceType::User, 2),
		StatusCode::UNAUTHORIZED,
	));
	run_authz_cases(&app, &cases).await;
}
