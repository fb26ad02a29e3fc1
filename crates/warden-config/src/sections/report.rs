// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Report output configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REPORT_OUTPUT: &str = "warden-report.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
	pub output: PathBuf,
}

impl Default for ReportConfig {
	fn default() -> Self {
		Self {
			output: PathBuf::from(DEFAULT_REPORT_OUTPUT),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportConfigLayer {
	#[serde(default)]
	pub output: Option<PathBuf>,
}

impl ReportConfigLayer {
	pub fn merge(&mut self, other: ReportConfigLayer) {
		if other.output.is_some() {
			self.output = other.output;
		}
	}

	pub fn finalize(self) -> ReportConfig {
		ReportConfig {
			output: self
				.output
				.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_OUTPUT)),
		}
	}
}
