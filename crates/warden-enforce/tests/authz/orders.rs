// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for order resources.

use http::StatusCode;
use warden_auth::ResourceType;
use warden_enforce::{ApiRequest, Operation, Strategy};
use warden_store::{OrderStatus, OrderUpdate, ADMIN_TOKEN, BOB_TOKEN, JOHN_TOKEN};

use super::support::{for_every_strategy, run_authz_cases, AuthzCase, TestApp};

fn ship(id: i64) -> ApiRequest {
	ApiRequest::new(
		ResourceType::Order,
		id,
		Operation::UpdateOrder(OrderUpdate::status(OrderStatus::Shipped)),
	)
}

fn delete(id: i64) -> ApiRequest {
	ApiRequest::new(ResourceType::Order, id, Operation::DeleteOrder)
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn owner_reads_own_order() {
	let app = TestApp::new().await;
	let cases = for_every_strategy(
		"john_reads_order_1",
		Some(JOHN_TOKEN),
		ApiRequest::read(ResourceType::Order, 1),
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn foreign_order_is_403_or_404_by_strategy() {
	let app = TestApp::new().await;
	let cases = vec![
		AuthzCase {
			name: "john_reads_bob_order_ownership_first",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::OwnershipFirst,
			request: ApiRequest::read(ResourceType::Order, 5),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "john_reads_bob_order_existence_first",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: ApiRequest::read(ResourceType::Order, 5),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "john_reads_bob_order_filtered_query",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::FilteredQuery,
			request: ApiRequest::read(ResourceType::Order, 5),
			expected_status: StatusCode::NOT_FOUND,
		},
	];
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn admin_reads_any_order() {
	let app = TestApp::new().await;
	let cases = for_every_strategy(
		"admin_reads_order_5",
		Some(ADMIN_TOKEN),
		ApiRequest::read(ResourceType::Order, 5),
		StatusCode::OK,
	);
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn missing_order_is_404_everywhere() {
	let app = TestApp::new().await;
	let mut cases = Vec::new();
	for token in [ADMIN_TOKEN, JOHN_TOKEN, BOB_TOKEN] {
		cases.extend(for_every_strategy(
			"read_missing_order",
			Some(token),
			ApiRequest::read(ResourceType::Order, 0),
			StatusCode::NOT_FOUND,
		));
	}
	run_authz_cases(&app, &cases).await;
}

// ============================================================================
// Mutations
// ============================================================================

#[tokio::test]
async fn john_cannot_modify_or_delete_bob_orders() {
	let app = TestApp::new().await;
	let cases = vec![
		AuthzCase {
			name: "john_ships_order_5",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: ship(5),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "john_deletes_order_4",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: delete(4),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "john_deletes_order_4_filtered",
			token: Some(JOHN_TOKEN),
			strategy: Strategy::FilteredQuery,
			request: delete(4),
			expected_status: StatusCode::NOT_FOUND,
		},
	];
	run_authz_cases(&app, &cases).await;

	let still_there = app
		.api
		.handle(
			Some(BOB_TOKEN),
			Strategy::ExistenceFirst,
			ApiRequest::read(ResourceType::Order, 4),
		)
		.await;
	assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn bob_modifies_and_deletes_his_own_orders() {
	let app = TestApp::new().await;
	let cases = vec![
		AuthzCase {
			name: "bob_ships_order_5",
			token: Some(BOB_TOKEN),
			strategy: Strategy::OwnershipFirst,
			request: ship(5),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "bob_deletes_order_4",
			token: Some(BOB_TOKEN),
			strategy: Strategy::FilteredQuery,
			request: delete(4),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "bob_reads_deleted_order_4",
			token: Some(BOB_TOKEN),
			strategy: Strategy::ExistenceFirst,
			request: ApiRequest::read(ResourceType::Order, 4),
			expected_status: StatusCode::NOT_FOUND,
		},
	];
	run_authz_cases(&app, &cases).await;
}

// ============================================================================
// Nested listing
// ============================================================================

#[tokio::test]
async fn user_orders_listing_is_guarded_by_the_user_read() {
	let app = TestApp::new().await;
	let bob = app.fixtures.bob.identity.id;
	let john = app.fixtures.john.identity.id;

	let own = app
		.api
		.list_user_orders(Some(JOHN_TOKEN), Strategy::OwnershipFirst, john)
		.await;
	assert_eq!(own.status, StatusCode::OK);
	assert_eq!(own.body.as_array().map(Vec::len), Some(3));

	for strategy in [Strategy::OwnershipFirst, Strategy::ExistenceFirst] {
		let foreign = app.api.list_user_orders(Some(JOHN_TOKEN), strategy, bob).await;
		assert_eq!(foreign.status, StatusCode::FORBIDDEN, "{strategy}");
	}

	let admin = app
		.api
		.list_user_orders(Some(ADMIN_TOKEN), Strategy::FilteredQuery, bob)
		.await;
	assert_eq!(admin.body.as_array().map(Vec::len), Some(2));
}
