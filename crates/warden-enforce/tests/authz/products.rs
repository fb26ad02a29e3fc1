// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for product resources.

use http::StatusCode;
use warden_auth::ResourceType;
use warden_enforce::{ApiRequest, Operation};
use warden_store::{NewProduct, ProductUpdate, ADMIN_TOKEN, BOB_TOKEN, JOHN_TOKEN};

use super::support::{for_every_strategy, run_authz_cases, TestApp};

fn reprice(id: i64) -> ApiRequest {
	ApiRequest::new(
		ResourceType::Product,
		id,
		Operation::UpdateProduct(ProductUpdate {
			price: Some(0.01),
			..Default::default()
		}),
	)
}

fn tablet(name: &str, price: f64) -> NewProduct {
	NewProduct {
		name: name.to_string(),
		description: "A flat computer".to_string(),
		price,
		stock: 10,
	}
}

#[tokio::test]
async fn anyone_authenticated_reads_products() {
	let app = TestApp::new().await;
	let mut cases = for_every_strategy(
		"john_reads_product_1",
		Some(JOHN_TOKEN),
		ApiRequest::read(ResourceType::Product, 1),
		StatusCode::OK,
	);
	cases.extend(for_every_strategy(
		"bob_reads_missing_product",
		Some(BOB_TOKEN),
		ApiRequest::read(ResourceType::Product, 3),
		StatusCode::NOT_FOUND,
	));
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn non_admin_product_write_is_403_regardless_of_existence() {
	let app = TestApp::new().await;
	let mut cases = for_every_strategy(
		"john_reprices_product_1",
		Some(JOHN_TOKEN),
		reprice(1),
		StatusCode::FORBIDDEN,
	);
	cases.extend(for_every_strategy(
		"john_reprices_missing_product",
		Some(JOHN_TOKEN),
		reprice(404),
		StatusCode::FORBIDDEN,
	));
	run_authz_cases(&app, &cases).await;

	let product = app
		.api
		.handle(
			Some(JOHN_TOKEN),
			warden_enforce::Strategy::ExistenceFirst,
			ApiRequest::read(ResourceType::Product, 1),
		)
		.await;
	assert_ne!(product.body["price"], serde_json::json!(0.01));
}

#[tokio::test]
async fn admin_reprices_products() {
	let app = TestApp::new().await;
	let cases = for_every_strategy("admin_reprices_product_1", Some(ADMIN_TOKEN), reprice(1), StatusCode::OK);
	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn only_admin_creates_products() {
	let app = TestApp::new().await;

	let cases = [
		("john_creates_product", Some(JOHN_TOKEN), tablet("Tablet", 299.0), StatusCode::FORBIDDEN),
		("anonymous_creates_product", None, tablet("Tablet", 299.0), StatusCode::UNAUTHORIZED),
		("admin_creates_product", Some(ADMIN_TOKEN), tablet("Tablet", 299.0), StatusCode::OK),
		("admin_duplicates_product", Some(ADMIN_TOKEN), tablet("Laptop", 10.0), StatusCode::BAD_REQUEST),
		("admin_negative_price", Some(ADMIN_TOKEN), tablet("Watch", -1.0), StatusCode::BAD_REQUEST),
		("john_duplicates_product", Some(JOHN_TOKEN), tablet("Laptop", 10.0), StatusCode::FORBIDDEN),
	];
	for (name, token, new, expected) in cases {
		let response = app.api.create_product(token, new).await;
		assert_eq!(response.status, expected, "Case '{name}': {}", response.body);
	}

	let products = app.api.list_products(Some(BOB_TOKEN)).await;
	let names: Vec<_> = products
		.body
		.as_array()
		.expect("product list")
		.iter()
		.map(|p| p["name"].as_str().unwrap_or_default().to_string())
		.collect();
	assert_eq!(names, vec!["Laptop", "Phone", "Tablet"]);
}
