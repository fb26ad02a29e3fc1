// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The order in which an enforcer consults the store and the policy.
///
/// | Strategy | Foreign, existing | Missing |
/// |---|---|---|
/// | `ownership-first` | 403 | 403 for a foreign user id, otherwise 404 |
/// | `existence-first` | 403 | 404 |
/// | `filtered-query` | 404 | 404 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
	/// Compare ownership before any lookup when the id alone determines the owner.
	#[serde(alias = "ownership_first")]
	OwnershipFirst,
	/// Look the resource up, report absence, then decide.
	#[serde(alias = "existence_first")]
	ExistenceFirst,
	/// Fold ownership into the lookup so foreign and absent resources look alike.
	#[serde(alias = "filtered_query")]
	FilteredQuery,
}

impl Strategy {
	pub const ALL: [Strategy; 3] = [
		Strategy::OwnershipFirst,
		Strategy::ExistenceFirst,
		Strategy::FilteredQuery,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Strategy::OwnershipFirst => "ownership-first",
			Strategy::ExistenceFirst => "existence-first",
			Strategy::FilteredQuery => "filtered-query",
		}
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Strategy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
			"ownership-first" => Ok(Strategy::OwnershipFirst),
			"existence-first" => Ok(Strategy::ExistenceFirst),
			"filtered-query" => Ok(Strategy::FilteredQuery),
			other => Err(format!("unknown strategy '{other}'")),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_every_strategy_from_its_display_form() {
		for strategy in Strategy::ALL {
			assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
		}
	}

	#[test]
	fn parse_accepts_snake_case_and_mixed_case() {
		assert_eq!(
			"Filtered_Query".parse::<Strategy>().unwrap(),
			Strategy::FilteredQuery
		);
		assert!("403-first".parse::<Strategy>().is_err());
	}

	#[test]
	fn serializes_kebab_case() {
		let json = serde_json::to_string(&Strategy::OwnershipFirst).unwrap();
		assert_eq!(json, "\"ownership-first\"");
	}

	#[test]
	fn deserializes_snake_case_aliases() {
		let parsed: Vec<Strategy> =
			serde_json::from_str(r#"["ownership_first", "existence_first", "filtered-query"]"#).unwrap();
		assert_eq!(parsed, Strategy::ALL.to_vec());
	}
}
