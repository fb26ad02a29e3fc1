// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Store unavailable: {0}")]
	Unavailable(String),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Insufficient stock: requested {requested}, available {available}")]
	InsufficientStock { requested: i64, available: i64 },

	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Internal: {0}")]
	Internal(String),
}

impl StoreError {
	/// Returns true for errors caused by the request rather than the store.
	pub fn is_client_error(&self) -> bool {
		matches!(
			self,
			StoreError::NotFound(_)
				| StoreError::Conflict(_)
				| StoreError::InsufficientStock { .. }
				| StoreError::InvalidInput(_)
		)
	}
}

pub type Result<T> = std::result::Result<T, StoreError>;
