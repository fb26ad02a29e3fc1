// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Warden probe harness.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`WARDEN_*`)
//!
//! # Usage
//!
//! ```ignore
//! use warden_config::load_config;
//!
//! let config = load_config()?;
//! println!("probing ids {:?} with {} workers", config.probe.ids(), config.probe.concurrency);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::WardenConfigLayer;
pub use sections::*;
pub use sources::{
	ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, DEFAULT_CONFIG_PATH,
};

use tracing::{debug, info};

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WardenConfig {
	pub probe: ProbeConfig,
	pub store: StoreConfig,
	pub logging: LoggingConfig,
	pub report: ReportConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_*`)
/// 2. Config file (`warden.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<WardenConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::local()),
		Box::new(EnvSource::new()),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<WardenConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource::new()),
	];
	load_from_sources(sources)
}

/// Merge `sources` in precedence order and resolve the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<WardenConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = WardenConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: WardenConfigLayer) -> Result<WardenConfig, ConfigError> {
	let config = WardenConfig {
		probe: layer.probe.unwrap_or_default().finalize(),
		store: layer.store.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize(),
		report: layer.report.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		concurrency = config.probe.concurrency,
		timeout_ms = config.probe.timeout_ms,
		id_start = config.probe.id_start,
		id_end = config.probe.id_end,
		strategies = config.probe.strategies.len(),
		resources = config.probe.resources.len(),
		store = %config.store.backend,
		report = %config.report.output.display(),
		"Warden configuration loaded"
	);

	Ok(config)
}

/// Validate cross-field configuration rules.
pub fn validate_config(config: &WardenConfig) -> Result<(), ConfigError> {
	let probe = &config.probe;
	if probe.concurrency == 0 {
		return Err(ConfigError::Validation(
			"probe.concurrency must be at least 1".to_string(),
		));
	}
	if probe.timeout_ms == 0 {
		return Err(ConfigError::Validation(
			"probe.timeout_ms must be greater than 0".to_string(),
		));
	}
	if probe.id_start > probe.id_end {
		return Err(ConfigError::Validation(format!(
			"probe.id_start ({}) must not exceed probe.id_end ({})",
			probe.id_start, probe.id_end
		)));
	}
	let ids = warden_probe::id_count(&probe.ids());
	if ids > warden_probe::MAX_PLAN_IDS {
		return Err(ConfigError::Validation(format!(
			"probe id range {}..={} spans {ids} ids, more than the limit of {}",
			probe.id_start,
			probe.id_end,
			warden_probe::MAX_PLAN_IDS
		)));
	}
	if probe.strategies.is_empty() {
		return Err(ConfigError::Validation(
			"probe.strategies must name at least one strategy".to_string(),
		));
	}
	if probe.resources.is_empty() {
		return Err(ConfigError::Validation(
			"probe.resources must name at least one resource type".to_string(),
		));
	}
	if config.store.backend == StoreBackend::Sqlite && config.store.url.trim().is_empty() {
		return Err(ConfigError::Validation(
			"store.url is required for the sqlite backend".to_string(),
		));
	}

	Ok(())
}
