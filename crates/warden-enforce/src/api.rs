// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transport-facing request handling.
//!
//! [`Api`] resolves the caller, runs the [`Enforcer`] and performs the
//! requested operation, mapping every result onto an HTTP status:
//!
//! | Result | Status |
//! |---|---|
//! | allowed | 200 |
//! | malformed operation, validation failure | 400 |
//! | missing or invalid credential | 401 |
//! | forbidden | 403 |
//! | not found | 404 |
//! | store fault | 500 |
//!
//! Error bodies are `{ "error": ..., "message": ... }` and carry nothing the
//! status does not already reveal.

use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use warden_auth::{
	extract_bearer_token, requires_admin, Action, AuthError, Authenticator, Identity, OrderId,
	ProductId, ResourceType, UserId,
};
use warden_store::{
	Entity, NewOrder, NewProduct, OrderUpdate, ProductUpdate, ResourceStore, StoreError, UserUpdate,
};

use crate::enforcer::{AccessRequest, Enforcer};
use crate::outcome::Outcome;
use crate::strategy::Strategy;

/// What the caller wants done to the addressed resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
	Read,
	UpdateUser(UserUpdate),
	UpdateProduct(ProductUpdate),
	UpdateOrder(OrderUpdate),
	DeleteOrder,
}

impl Operation {
	pub fn action(&self) -> Action {
		match self {
			Operation::Read => Action::Read,
			Operation::UpdateUser(_) | Operation::UpdateProduct(_) | Operation::UpdateOrder(_) => {
				Action::Write
			}
			Operation::DeleteOrder => Action::Delete,
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Operation::Read => "read",
			Operation::UpdateUser(_) => "update_user",
			Operation::UpdateProduct(_) => "update_product",
			Operation::UpdateOrder(_) => "update_order",
			Operation::DeleteOrder => "delete_order",
		}
	}

	/// Returns true if this operation can be applied to `resource_type`.
	pub fn applies_to(&self, resource_type: ResourceType) -> bool {
		match self {
			Operation::Read => true,
			Operation::UpdateUser(_) => resource_type == ResourceType::User,
			Operation::UpdateProduct(_) => resource_type == ResourceType::Product,
			Operation::UpdateOrder(_) | Operation::DeleteOrder => {
				resource_type == ResourceType::Order
			}
		}
	}
}

/// A request addressed to a single resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
	pub resource_type: ResourceType,
	pub id: i64,
	pub operation: Operation,
}

impl ApiRequest {
	pub fn new(resource_type: ResourceType, id: i64, operation: Operation) -> Self {
		Self {
			resource_type,
			id,
			operation,
		}
	}

	pub fn read(resource_type: ResourceType, id: i64) -> Self {
		Self::new(resource_type, id, Operation::Read)
	}
}

/// Body of every non-200 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

/// A status and JSON body, ready for any transport to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
	pub status: StatusCode,
	pub body: serde_json::Value,
}

impl ApiResponse {
	pub fn ok<T: Serialize>(payload: &T) -> Self {
		match serde_json::to_value(payload) {
			Ok(body) => Self {
				status: StatusCode::OK,
				body,
			},
			Err(e) => ApiError::Internal(e.to_string()).into(),
		}
	}

	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
	#[error(transparent)]
	Unauthenticated(#[from] AuthError),

	#[error("access forbidden")]
	Forbidden,

	#[error("resource not found")]
	NotFound,

	#[error("operation {operation} is not supported on {resource_type}")]
	UnsupportedOperation {
		operation: &'static str,
		resource_type: ResourceType,
	},

	#[error("bad request: {0}")]
	BadRequest(String),

	#[error("internal error: {0}")]
	Internal(String),
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
			ApiError::Forbidden => StatusCode::FORBIDDEN,
			ApiError::NotFound => StatusCode::NOT_FOUND,
			ApiError::UnsupportedOperation { .. } | ApiError::BadRequest(_) => {
				StatusCode::BAD_REQUEST
			}
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn body(&self) -> ErrorResponse {
		let (error, message) = match self {
			ApiError::Unauthenticated(e) => ("unauthorized", e.to_string()),
			ApiError::Forbidden => ("forbidden", "Access denied".to_string()),
			ApiError::NotFound => ("not_found", "Resource not found".to_string()),
			ApiError::UnsupportedOperation { .. } => ("bad_request", self.to_string()),
			ApiError::BadRequest(message) => ("bad_request", message.clone()),
			ApiError::Internal(_) => ("internal_error", "Internal server error".to_string()),
		};
		ErrorResponse {
			error: error.to_string(),
			message,
		}
	}
}

impl From<ApiError> for ApiResponse {
	fn from(err: ApiError) -> Self {
		let body = serde_json::to_value(err.body()).unwrap_or(serde_json::Value::Null);
		Self {
			status: err.status(),
			body,
		}
	}
}

fn allowed(outcome: Outcome) -> Result<Entity, ApiError> {
	match outcome {
		Outcome::Allowed(entity) => Ok(entity),
		Outcome::Forbidden => Err(ApiError::Forbidden),
		Outcome::NotFound => Err(ApiError::NotFound),
		Outcome::SystemError(message) => Err(ApiError::Internal(message)),
	}
}

fn store_failure(err: StoreError) -> ApiError {
	match err {
		StoreError::NotFound(_) => ApiError::NotFound,
		e if e.is_client_error() => ApiError::BadRequest(e.to_string()),
		e => {
			error!(error = %e, "store operation failed");
			ApiError::Internal(e.to_string())
		}
	}
}

/// Request handler over an injected store and authenticator.
pub struct Api<S: ?Sized, A: ?Sized> {
	enforcer: Enforcer<S>,
	authenticator: Arc<A>,
}

impl<S: ?Sized, A: ?Sized> Clone for Api<S, A> {
	fn clone(&self) -> Self {
		Self {
			enforcer: self.enforcer.clone(),
			authenticator: Arc::clone(&self.authenticator),
		}
	}
}

impl<S, A> Api<S, A>
where
	S: ResourceStore + ?Sized,
	A: Authenticator + ?Sized,
{
	pub fn new(store: Arc<S>, authenticator: Arc<A>) -> Self {
		Self {
			enforcer: Enforcer::new(store),
			authenticator,
		}
	}

	pub fn enforcer(&self) -> &Enforcer<S> {
		&self.enforcer
	}

	fn store(&self) -> &S {
		self.enforcer.store().as_ref()
	}

	async fn authenticate(&self, credential: Option<&str>) -> Result<Identity, ApiError> {
		let credential = credential.ok_or(AuthError::MissingCredential)?;
		let identity = self
			.authenticator
			.resolve_identity(credential)
			.await
			.inspect_err(|e| info!(error = %e, "authentication failed"))?;
		Ok(identity)
	}

	/// Handle a request carrying a raw bearer credential.
	pub async fn handle(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		request: ApiRequest,
	) -> ApiResponse {
		self
			.try_handle(credential, strategy, request)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	/// Handle a request whose credential is in the `Authorization` header.
	pub async fn handle_headers(
		&self,
		headers: &HeaderMap,
		strategy: Strategy,
		request: ApiRequest,
	) -> ApiResponse {
		self
			.handle(extract_bearer_token(headers), strategy, request)
			.await
	}

	#[instrument(
		level = "debug",
		skip_all,
		fields(
			%strategy,
			resource = %request.resource_type,
			id = request.id,
			operation = request.operation.name(),
		)
	)]
	async fn try_handle(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		request: ApiRequest,
	) -> Result<ApiResponse, ApiError> {
		let identity = self.authenticate(credential).await?;
		let ApiRequest {
			resource_type,
			id,
			operation,
		} = request;

		if !operation.applies_to(resource_type) {
			return Err(ApiError::UnsupportedOperation {
				operation: operation.name(),
				resource_type,
			});
		}

		let access = AccessRequest::new(resource_type, id, operation.action());
		let entity = allowed(self.enforcer.enforce(&identity, strategy, access).await)?;

		let store = self.store();
		match operation {
			Operation::Read => Ok(ApiResponse::ok(&entity)),
			Operation::UpdateUser(update) => store
				.update_user(UserId::new(id), update)
				.await
				.map_err(store_failure)?
				.map(|user| ApiResponse::ok(&user))
				.ok_or(ApiError::NotFound),
			Operation::UpdateProduct(update) => store
				.update_product(ProductId::new(id), update)
				.await
				.map_err(store_failure)?
				.map(|product| ApiResponse::ok(&product))
				.ok_or(ApiError::NotFound),
			Operation::UpdateOrder(update) => store
				.update_order(OrderId::new(id), update)
				.await
				.map_err(store_failure)?
				.map(|order| ApiResponse::ok(&order))
				.ok_or(ApiError::NotFound),
			Operation::DeleteOrder => {
				if !store
					.delete_order(OrderId::new(id))
					.await
					.map_err(store_failure)?
				{
					return Err(ApiError::NotFound);
				}
				info!(order_id = id, user_id = %identity.id, "order deleted");
				Ok(ApiResponse::ok(&serde_json::json!({
					"message": "Order deleted successfully"
				})))
			}
		}
	}

	/// Place an order. Non-admins may only order for themselves.
	///
	/// The product is read through the chosen strategy first, so a missing
	/// product is reported exactly as a read of it would be.
	pub async fn create_order(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		new: NewOrder,
	) -> ApiResponse {
		self
			.try_create_order(credential, strategy, new)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	#[instrument(
		level = "debug",
		skip_all,
		fields(%strategy, user_id = %new.user_id, product_id = %new.product_id)
	)]
	async fn try_create_order(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		new: NewOrder,
	) -> Result<ApiResponse, ApiError> {
		let identity = self.authenticate(credential).await?;
		if !identity.is_admin() && !identity.owns(new.user_id) {
			info!(caller = %identity.id, "order creation forbidden");
			return Err(ApiError::Forbidden);
		}

		let product = AccessRequest::read(ResourceType::Product, new.product_id.get());
		allowed(self.enforcer.enforce(&identity, strategy, product).await)?;

		let order = self.store().create_order(new).await.map_err(store_failure)?;
		info!(order_id = %order.id, "order created");
		Ok(ApiResponse::ok(&order))
	}

	/// Add a product to the catalogue. Admin only, like every product mutation.
	pub async fn create_product(&self, credential: Option<&str>, new: NewProduct) -> ApiResponse {
		self
			.try_create_product(credential, new)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	#[instrument(level = "debug", skip_all, fields(name = %new.name))]
	async fn try_create_product(
		&self,
		credential: Option<&str>,
		new: NewProduct,
	) -> Result<ApiResponse, ApiError> {
		let identity = self.authenticate(credential).await?;
		if requires_admin(ResourceType::Product, Action::Write) && !identity.is_admin() {
			info!(caller = %identity.id, "product creation forbidden");
			return Err(ApiError::Forbidden);
		}

		let product = self.store().create_product(new).await.map_err(store_failure)?;
		info!(product_id = %product.id, "product created");
		Ok(ApiResponse::ok(&product))
	}

	/// Every product; open to any authenticated caller.
	pub async fn list_products(&self, credential: Option<&str>) -> ApiResponse {
		self
			.try_list_products(credential)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	async fn try_list_products(&self, credential: Option<&str>) -> Result<ApiResponse, ApiError> {
		self.authenticate(credential).await?;
		let products = self.store().list_products().await.map_err(store_failure)?;
		Ok(ApiResponse::ok(&products))
	}

	/// Every order for an admin, the caller's own orders otherwise.
	pub async fn list_orders(&self, credential: Option<&str>) -> ApiResponse {
		self
			.try_list_orders(credential)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	async fn try_list_orders(&self, credential: Option<&str>) -> Result<ApiResponse, ApiError> {
		let identity = self.authenticate(credential).await?;
		let orders = if identity.is_admin() {
			self.store().list_orders().await
		} else {
			self.store().list_orders_for_user(identity.id).await
		}
		.map_err(store_failure)?;
		Ok(ApiResponse::ok(&orders))
	}

	/// Orders placed by `user_id`, guarded as a read of that user.
	pub async fn list_user_orders(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		user_id: UserId,
	) -> ApiResponse {
		self
			.try_list_user_orders(credential, strategy, user_id)
			.await
			.unwrap_or_else(ApiResponse::from)
	}

	#[instrument(level = "debug", skip_all, fields(%strategy, %user_id))]
	async fn try_list_user_orders(
		&self,
		credential: Option<&str>,
		strategy: Strategy,
		user_id: UserId,
	) -> Result<ApiResponse, ApiError> {
		let identity = self.authenticate(credential).await?;
		let access = AccessRequest::read(ResourceType::User, user_id.get());
		allowed(self.enforcer.enforce(&identity, strategy, access).await)?;
		let orders = self
			.store()
			.list_orders_for_user(user_id)
			.await
			.map_err(store_failure)?;
		Ok(ApiResponse::ok(&orders))
	}
}
