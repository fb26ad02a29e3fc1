// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;
use warden_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
	#[error("invalid probe plan: {0}")]
	InvalidPlan(String),

	#[error("failed to capture ground truth: {0}")]
	GroundTruth(#[from] StoreError),

	#[error("failed to write report {path}: {source}")]
	ReportWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to serialize report: {0}")]
	Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
