// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, a TOML file and environment variables.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};
use warden_auth::ResourceType;
use warden_enforce::Strategy;

use crate::error::ConfigError;
use crate::layer::WardenConfigLayer;
use crate::sections::{
	LoggingConfigLayer, ProbeConfigLayer, ReportConfigLayer, StoreBackend, StoreConfigLayer,
};

pub const DEFAULT_CONFIG_PATH: &str = "warden.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<WardenConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(WardenConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `warden.toml` in the working directory.
	pub fn local() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(WardenConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: WardenConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: WARDEN_<SECTION>_<FIELD>
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads from a fixed set of variables instead of the process environment.
	pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			vars: Some(
				vars
					.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self
			.var(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn parse<T>(&self, name: &str) -> Result<Option<T>, ConfigError>
	where
		T: FromStr,
		T::Err: Display,
	{
		match self.var(name) {
			Some(v) => v.parse().map(Some).map_err(|e| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid value '{v}': {e}"),
			}),
			None => Ok(None),
		}
	}

	/// Comma-separated list, e.g. `WARDEN_PROBE_STRATEGIES=existence-first,filtered-query`.
	fn list<T>(&self, name: &str) -> Result<Option<Vec<T>>, ConfigError>
	where
		T: FromStr,
		T::Err: Display,
	{
		let Some(raw) = self.var(name) else {
			return Ok(None);
		};
		raw
			.split(',')
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(|item| {
				item.parse().map_err(|e| ConfigError::InvalidValue {
					key: name.to_string(),
					message: format!("invalid item '{item}': {e}"),
				})
			})
			.collect::<Result<Vec<T>, _>>()
			.map(Some)
	}

	fn load_probe(&self) -> Result<ProbeConfigLayer, ConfigError> {
		Ok(ProbeConfigLayer {
			concurrency: self.parse("WARDEN_PROBE_CONCURRENCY")?,
			timeout_ms: self.parse("WARDEN_PROBE_TIMEOUT_MS")?,
			id_start: self.parse("WARDEN_PROBE_ID_START")?,
			id_end: self.parse("WARDEN_PROBE_ID_END")?,
			strategies: self.list::<Strategy>("WARDEN_PROBE_STRATEGIES")?,
			resources: self.list::<ResourceType>("WARDEN_PROBE_RESOURCES")?,
		})
	}

	fn load_store(&self) -> Result<StoreConfigLayer, ConfigError> {
		Ok(StoreConfigLayer {
			backend: self.parse::<StoreBackend>("WARDEN_STORE_BACKEND")?,
			url: self.var("WARDEN_STORE_URL"),
		})
	}

	fn load_logging(&self) -> LoggingConfigLayer {
		LoggingConfigLayer {
			level: self.var("WARDEN_LOG_LEVEL"),
			json: self.bool("WARDEN_LOG_JSON"),
		}
	}

	fn load_report(&self) -> ReportConfigLayer {
		ReportConfigLayer {
			output: self.var("WARDEN_REPORT_OUTPUT").map(PathBuf::from),
		}
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<WardenConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(WardenConfigLayer {
			probe: Some(self.load_probe()?),
			store: Some(self.load_store()?),
			logging: Some(self.load_logging()),
			report: Some(self.load_report()),
		})
	}
}
