// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixed endpoint checks against the demo fixture.
//!
//! Cases run in order against one store. Mutating cases are pinned to a single
//! strategy and come last so earlier reads see the seeded state.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use warden_auth::{Authenticator, ResourceType, UserId};
use warden_enforce::{Api, ApiRequest, ApiResponse, Operation, Strategy};
use warden_store::{
	DemoFixture, NewOrder, NewProduct, OrderStatus, OrderUpdate, ProductUpdate, ResourceStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioRequest {
	Resource(ApiRequest),
	UserOrders(UserId),
	CreateOrder(NewOrder),
	CreateProduct(NewProduct),
	ListOrders,
	ListProducts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioCase {
	pub name: String,
	/// Label of the caller, for reporting.
	pub identity: String,
	pub credential: Option<String>,
	/// `None` runs the case once per strategy.
	pub strategy: Option<Strategy>,
	pub request: ScenarioRequest,
	pub expected_status: StatusCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
	pub name: String,
	pub identity: String,
	pub strategy: Strategy,
	pub expected: u16,
	pub actual: u16,
	pub passed: bool,
}

struct CaseBuilder<'a> {
	fixture: &'a DemoFixture,
	cases: Vec<ScenarioCase>,
}

impl<'a> CaseBuilder<'a> {
	fn caller(&self, who: &str) -> (String, Option<String>) {
		match who {
			"admin" => ("admin".into(), Some(self.fixture.admin.token.clone())),
			"john" => ("john".into(), Some(self.fixture.john.token.clone())),
			"bob" => ("bob".into(), Some(self.fixture.bob.token.clone())),
			"forged" => ("forged".into(), Some("forged-token".into())),
			_ => ("anonymous".into(), None),
		}
	}

	fn push(
		&mut self,
		name: &str,
		who: &str,
		strategy: Option<Strategy>,
		request: ScenarioRequest,
		expected_status: StatusCode,
	) {
		let (identity, credential) = self.caller(who);
		self.cases.push(ScenarioCase {
			name: name.to_string(),
			identity,
			credential,
			strategy,
			request,
			expected_status,
		});
	}

	/// One case per strategy with a per-strategy expectation.
	fn per_strategy(
		&mut self,
		name: &str,
		who: &str,
		request: ScenarioRequest,
		[ownership, existence, filtered]: [StatusCode; 3],
	) {
		self.push(name, who, Some(Strategy::OwnershipFirst), request.clone(), ownership);
		self.push(name, who, Some(Strategy::ExistenceFirst), request.clone(), existence);
		self.push(name, who, Some(Strategy::FilteredQuery), request, filtered);
	}
}

fn read(resource_type: ResourceType, id: i64) -> ScenarioRequest {
	ScenarioRequest::Resource(ApiRequest::read(resource_type, id))
}

/// The standard endpoint checks for the seeded demo fixture.
pub fn standard_cases(fixture: &DemoFixture) -> Vec<ScenarioCase> {
	use StatusCode as S;

	let john = fixture.john.identity.id;
	let bob = fixture.bob.identity.id;
	let john_order = fixture.john_orders[0].get();
	let bob_first = fixture.bob_orders[0].get();
	let bob_last = fixture.bob_orders[fixture.bob_orders.len() - 1].get();
	let product = fixture.products[0].get();
	let other_product = fixture.products[fixture.products.len() - 1];
	let missing_user = bob.get() + 1;

	let mut b = CaseBuilder {
		fixture,
		cases: Vec::new(),
	};

	b.push("read own user", "john", None, read(ResourceType::User, john.get()), S::OK);
	b.per_strategy(
		"read foreign user",
		"john",
		read(ResourceType::User, bob.get()),
		[S::FORBIDDEN, S::FORBIDDEN, S::NOT_FOUND],
	);
	b.per_strategy(
		"read missing user",
		"john",
		read(ResourceType::User, missing_user),
		[S::FORBIDDEN, S::NOT_FOUND, S::NOT_FOUND],
	);
	b.push("admin reads user", "admin", None, read(ResourceType::User, bob.get()), S::OK);

	b.push("read own order", "john", None, read(ResourceType::Order, john_order), S::OK);
	b.per_strategy(
		"read foreign order",
		"john",
		read(ResourceType::Order, bob_last),
		[S::FORBIDDEN, S::FORBIDDEN, S::NOT_FOUND],
	);
	b.push("admin reads order", "admin", None, read(ResourceType::Order, bob_last), S::OK);

	b.push("list own orders", "john", None, ScenarioRequest::UserOrders(john), S::OK);
	b.per_strategy(
		"list foreign orders",
		"john",
		ScenarioRequest::UserOrders(bob),
		[S::FORBIDDEN, S::FORBIDDEN, S::NOT_FOUND],
	);
	b.push("admin lists user orders", "admin", None, ScenarioRequest::UserOrders(bob), S::OK);

	b.push(
		"write product as user",
		"john",
		None,
		ScenarioRequest::Resource(ApiRequest::new(
			ResourceType::Product,
			product,
			Operation::UpdateProduct(ProductUpdate {
				price: Some(0.01),
				..Default::default()
			}),
		)),
		S::FORBIDDEN,
	);
	b.push("read product", "bob", None, read(ResourceType::Product, product), S::OK);
	let tablet = || {
		ScenarioRequest::CreateProduct(NewProduct {
			name: "Tablet".to_string(),
			description: "A flat computer".to_string(),
			price: 299.0,
			stock: 10,
		})
	};
	b.push("create product as user", "john", None, tablet(), S::FORBIDDEN);

	b.push("list products", "john", None, ScenarioRequest::ListProducts, S::OK);
	b.push("list orders", "bob", None, ScenarioRequest::ListOrders, S::OK);
	b.push("unauthenticated list", "anonymous", None, ScenarioRequest::ListProducts, S::UNAUTHORIZED);
	b.push(
		"order on behalf of another user",
		"john",
		None,
		ScenarioRequest::CreateOrder(NewOrder {
			user_id: bob,
			product_id: other_product,
			amount: 1,
		}),
		S::FORBIDDEN,
	);

	b.push("unauthenticated read", "anonymous", None, read(ResourceType::Order, john_order), S::UNAUTHORIZED);
	b.push("invalid token read", "forged", None, read(ResourceType::Order, john_order), S::UNAUTHORIZED);

	let ship = |id| {
		ScenarioRequest::Resource(ApiRequest::new(
			ResourceType::Order,
			id,
			Operation::UpdateOrder(OrderUpdate::status(OrderStatus::Shipped)),
		))
	};
	let delete = |id| ScenarioRequest::Resource(ApiRequest::new(ResourceType::Order, id, Operation::DeleteOrder));

	b.push(
		"place own order",
		"john",
		Some(Strategy::OwnershipFirst),
		ScenarioRequest::CreateOrder(NewOrder {
			user_id: john,
			product_id: other_product,
			amount: 1,
		}),
		S::OK,
	);
	b.push("modify foreign order", "john", Some(Strategy::ExistenceFirst), ship(bob_last), S::FORBIDDEN);
	b.push("modify foreign order", "john", Some(Strategy::FilteredQuery), ship(bob_last), S::NOT_FOUND);
	b.push("modify own order", "bob", Some(Strategy::OwnershipFirst), ship(bob_last), S::OK);
	b.push("delete foreign order", "john", Some(Strategy::ExistenceFirst), delete(bob_first), S::FORBIDDEN);
	b.push("delete own order", "bob", Some(Strategy::FilteredQuery), delete(bob_first), S::OK);
	b.push("create product", "admin", Some(Strategy::OwnershipFirst), tablet(), S::OK);
	b.push("create duplicate product", "admin", Some(Strategy::OwnershipFirst), tablet(), S::BAD_REQUEST);
	b.push("read deleted order", "bob", Some(Strategy::ExistenceFirst), read(ResourceType::Order, bob_first), S::NOT_FOUND);

	b.cases
}

async fn send<S, A>(api: &Api<S, A>, case: &ScenarioCase, strategy: Strategy) -> ApiResponse
where
	S: ResourceStore + ?Sized,
	A: Authenticator + ?Sized,
{
	let credential = case.credential.as_deref();
	match &case.request {
		ScenarioRequest::Resource(request) => api.handle(credential, strategy, request.clone()).await,
		ScenarioRequest::UserOrders(user_id) => {
			api.list_user_orders(credential, strategy, *user_id).await
		}
		ScenarioRequest::CreateOrder(new) => api.create_order(credential, strategy, *new).await,
		ScenarioRequest::CreateProduct(new) => api.create_product(credential, new.clone()).await,
		ScenarioRequest::ListOrders => api.list_orders(credential).await,
		ScenarioRequest::ListProducts => api.list_products(credential).await,
	}
}

/// Run every case in order, expanding strategy-less cases over every strategy.
pub async fn run_scenarios<S, A>(api: &Api<S, A>, cases: &[ScenarioCase]) -> Vec<ScenarioResult>
where
	S: ResourceStore + ?Sized,
	A: Authenticator + ?Sized,
{
	let mut results = Vec::new();
	for case in cases {
		let strategies = match case.strategy {
			Some(strategy) => vec![strategy],
			None => Strategy::ALL.to_vec(),
		};
		for strategy in strategies {
			let response = send(api, case, strategy).await;
			let passed = response.status == case.expected_status;
			if passed {
				info!(case = %case.name, identity = %case.identity, %strategy, status = response.status.as_u16(), "scenario passed");
			} else {
				warn!(
					case = %case.name,
					identity = %case.identity,
					%strategy,
					expected = case.expected_status.as_u16(),
					actual = response.status.as_u16(),
					"scenario failed"
				);
			}
			results.push(ScenarioResult {
				name: case.name.clone(),
				identity: case.identity.clone(),
				strategy,
				expected: case.expected_status.as_u16(),
				actual: response.status.as_u16(),
				passed,
			});
		}
	}
	results
}
