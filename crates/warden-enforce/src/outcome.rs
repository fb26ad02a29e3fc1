// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use http::StatusCode;
use warden_store::Entity;

/// The result of enforcing one request.
///
/// Exactly one outcome is produced per request. A store fault is reported as
/// [`Outcome::SystemError`] and is never folded into a denial.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Allowed(Entity),
	Forbidden,
	NotFound,
	SystemError(String),
}

impl Outcome {
	pub fn status(&self) -> StatusCode {
		match self {
			Outcome::Allowed(_) => StatusCode::OK,
			Outcome::Forbidden => StatusCode::FORBIDDEN,
			Outcome::NotFound => StatusCode::NOT_FOUND,
			Outcome::SystemError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn is_allowed(&self) -> bool {
		matches!(self, Outcome::Allowed(_))
	}

	pub fn label(&self) -> &'static str {
		match self {
			Outcome::Allowed(_) => "allowed",
			Outcome::Forbidden => "forbidden",
			Outcome::NotFound => "not_found",
			Outcome::SystemError(_) => "system_error",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn denials_map_to_distinct_statuses() {
		assert_eq!(Outcome::Forbidden.status(), StatusCode::FORBIDDEN);
		assert_eq!(Outcome::NotFound.status(), StatusCode::NOT_FOUND);
		assert_eq!(
			Outcome::SystemError("db down".into()).status(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn system_error_is_not_allowed() {
		assert!(!Outcome::SystemError("x".into()).is_allowed());
		assert_eq!(Outcome::SystemError("x".into()).label(), "system_error");
	}
}
