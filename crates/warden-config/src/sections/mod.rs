// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod logging;
mod probe;
mod report;
mod store;

pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use probe::{
	ProbeConfig, ProbeConfigLayer, DEFAULT_CONCURRENCY, DEFAULT_ID_END, DEFAULT_ID_START,
	DEFAULT_TIMEOUT_MS,
};
pub use report::{ReportConfig, ReportConfigLayer, DEFAULT_REPORT_OUTPUT};
pub use store::{StoreBackend, StoreConfig, StoreConfigLayer, DEFAULT_STORE_URL};
