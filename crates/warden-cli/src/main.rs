// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `warden`: probes object-level access enforcement for enumeration leaks.

use clap::{Args, Parser, Subcommand};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::process::ExitCode;
use warden_auth::ResourceType;
use warden_config::{validate_config, WardenConfig};
use warden_enforce::Strategy;

mod commands;
mod logging;
mod version;

#[derive(Parser, Debug)]
#[command(
	name = "warden",
	about = "Object-level access control probe harness",
	version
)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Seed a demo store, probe every strategy and write the leakage report
	Probe(ProbeArgs),
	/// Seed a demo store and replay the endpoint scenario suite
	Scenarios(ConfigArgs),
	/// Show version and build information
	Version,
}

#[derive(Args, Debug, Clone, Default)]
struct ConfigArgs {
	/// Config file (defaults to ./warden.toml when present)
	#[arg(long, env = "WARDEN_CONFIG")]
	config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
struct ProbeArgs {
	#[command(flatten)]
	config: ConfigArgs,

	/// Where to write the JSON report
	#[arg(long, short)]
	output: Option<PathBuf>,

	/// Strategy to probe; repeat for several
	#[arg(long = "strategy", value_parser = parse_strategy)]
	strategies: Vec<Strategy>,

	/// Resource type to probe; repeat for several
	#[arg(long = "resource", value_parser = parse_resource)]
	resources: Vec<ResourceType>,

	/// Inclusive id range, e.g. `0..=6`
	#[arg(long, value_parser = parse_id_range)]
	ids: Option<RangeInclusive<i64>>,

	/// Maximum probes in flight
	#[arg(long)]
	concurrency: Option<usize>,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
	s.parse()
}

fn parse_resource(s: &str) -> Result<ResourceType, String> {
	s.parse()
}

fn parse_id_range(s: &str) -> Result<RangeInclusive<i64>, String> {
	let (start, end) = s
		.split_once("..=")
		.ok_or_else(|| format!("expected START..=END, got '{s}'"))?;
	let parse = |v: &str| {
		v.trim()
			.parse::<i64>()
			.map_err(|e| format!("invalid id '{v}': {e}"))
	};
	Ok(parse(start)?..=parse(end)?)
}

fn load(args: &ConfigArgs) -> anyhow::Result<WardenConfig> {
	let config = match &args.config {
		Some(path) => {
			if !path.exists() {
				anyhow::bail!("config file {} does not exist", path.display());
			}
			warden_config::load_config_with_file(path)?
		}
		None => warden_config::load_config()?,
	};
	Ok(config)
}

impl ProbeArgs {
	/// Command-line flags win over every configuration source.
	fn apply(&self, config: &mut WardenConfig) -> anyhow::Result<PathBuf> {
		if !self.strategies.is_empty() {
			config.probe.strategies = self.strategies.clone();
		}
		if !self.resources.is_empty() {
			config.probe.resources = self.resources.clone();
		}
		if let Some(ids) = &self.ids {
			config.probe.id_start = *ids.start();
			config.probe.id_end = *ids.end();
		}
		if let Some(concurrency) = self.concurrency {
			config.probe.concurrency = concurrency;
		}
		validate_config(config)?;
		Ok(self
			.output
			.clone()
			.unwrap_or_else(|| config.report.output.clone()))
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();

	match cli.command {
		Command::Version => {
			println!("{}", version::format_version_info());
			Ok(ExitCode::SUCCESS)
		}
		Command::Probe(args) => {
			let mut config = load(&args.config)?;
			let output = args.apply(&mut config)?;
			logging::init(&config.logging);
			commands::probe(&config, output).await
		}
		Command::Scenarios(args) => {
			let config = load(&args)?;
			logging::init(&config.logging);
			commands::scenarios(&config).await
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn cli_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn parses_id_ranges() {
		assert_eq!(parse_id_range("0..=6"), Ok(0..=6));
		assert_eq!(parse_id_range(" -3 ..= 12"), Ok(-3..=12));
		assert!(parse_id_range("0..6").is_err());
		assert!(parse_id_range("a..=6").is_err());
	}

	#[test]
	fn probe_flags_override_config() {
		let cli = Cli::try_parse_from([
			"warden",
			"probe",
			"--strategy",
			"filtered-query",
			"--strategy",
			"existence_first",
			"--resource",
			"orders",
			"--ids",
			"1..=3",
			"--concurrency",
			"2",
			"--output",
			"out.json",
		])
		.unwrap();
		let Command::Probe(args) = cli.command else {
			panic!("expected the probe subcommand");
		};

		let mut config = WardenConfig::default();
		let output = args.apply(&mut config).unwrap();

		assert_eq!(
			config.probe.strategies,
			vec![Strategy::FilteredQuery, Strategy::ExistenceFirst]
		);
		assert_eq!(config.probe.resources, vec![ResourceType::Order]);
		assert_eq!(config.probe.ids(), 1..=3);
		assert_eq!(config.probe.concurrency, 2);
		assert_eq!(output, PathBuf::from("out.json"));
	}

	#[test]
	fn unset_flags_keep_config() {
		let args = ProbeArgs::default();
		let mut config = WardenConfig::default();
		let output = args.apply(&mut config).unwrap();

		assert_eq!(config, WardenConfig::default());
		assert_eq!(output, PathBuf::from("warden-report.json"));
	}

	#[test]
	fn invalid_overrides_are_rejected() {
		let args = ProbeArgs {
			concurrency: Some(0),
			..Default::default()
		};
		assert!(args.apply(&mut WardenConfig::default()).is_err());
	}

	#[test]
	fn overly_wide_id_range_is_rejected() {
		let cli = Cli::try_parse_from([
			"warden",
			"probe",
			"--ids=-9223372036854775808..=9223372036854775807",
		])
		.unwrap();
		let Command::Probe(args) = cli.command else {
			panic!("expected the probe subcommand");
		};
		assert!(args.apply(&mut WardenConfig::default()).is_err());
	}

	#[test]
	fn unknown_strategy_is_a_usage_error() {
		assert!(Cli::try_parse_from(["warden", "probe", "--strategy", "yolo"]).is_err());
	}
}
