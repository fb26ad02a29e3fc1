// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use warden_auth::{Identity, ResourceType};
use warden_enforce::Strategy;

/// Coarse classification of an observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
	Allow,
	Unauthenticated,
	Forbidden,
	NotFound,
	SystemError,
}

impl StatusClass {
	pub fn from_status(status: StatusCode) -> Self {
		match status.as_u16() {
			200..=299 => StatusClass::Allow,
			401 => StatusClass::Unauthenticated,
			403 => StatusClass::Forbidden,
			404 => StatusClass::NotFound,
			_ => StatusClass::SystemError,
		}
	}

	/// Denials that, unlike a 404, may confirm the resource exists.
	pub fn is_denial(&self) -> bool {
		matches!(self, StatusClass::Unauthenticated | StatusClass::Forbidden)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			StatusClass::Allow => "allow",
			StatusClass::Unauthenticated => "unauthenticated",
			StatusClass::Forbidden => "forbidden",
			StatusClass::NotFound => "not_found",
			StatusClass::SystemError => "system_error",
		}
	}
}

impl fmt::Display for StatusClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One probe attempt, recorded exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
	pub identity: String,
	pub principal: Identity,
	pub strategy: Strategy,
	pub resource_type: ResourceType,
	pub id: i64,
	/// Observed HTTP status; 0 when no response was received.
	pub status: u16,
	pub class: StatusClass,
	pub elapsed_ms: f64,
}

impl ProbeResult {
	/// Ordering key used for the final report.
	pub fn sort_key(&self) -> (ResourceType, &str, Strategy, i64) {
		(self.resource_type, self.identity.as_str(), self.strategy, self.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_statuses() {
		assert_eq!(StatusClass::from_status(StatusCode::OK), StatusClass::Allow);
		assert_eq!(
			StatusClass::from_status(StatusCode::UNAUTHORIZED),
			StatusClass::Unauthenticated
		);
		assert_eq!(StatusClass::from_status(StatusCode::FORBIDDEN), StatusClass::Forbidden);
		assert_eq!(StatusClass::from_status(StatusCode::NOT_FOUND), StatusClass::NotFound);
		assert_eq!(
			StatusClass::from_status(StatusCode::INTERNAL_SERVER_ERROR),
			StatusClass::SystemError
		);
		assert_eq!(
			StatusClass::from_status(StatusCode::BAD_REQUEST),
			StatusClass::SystemError
		);
	}

	#[test]
	fn only_401_and_403_are_denials() {
		assert!(StatusClass::Forbidden.is_denial());
		assert!(StatusClass::Unauthenticated.is_denial());
		assert!(!StatusClass::NotFound.is_denial());
		assert!(!StatusClass::SystemError.is_denial());
	}
}
