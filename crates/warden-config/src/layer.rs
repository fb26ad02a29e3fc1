// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::Deserialize;

use crate::sections::{LoggingConfigLayer, ProbeConfigLayer, ReportConfigLayer, StoreConfigLayer};

/// A partial configuration produced by one source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WardenConfigLayer {
	#[serde(default)]
	pub probe: Option<ProbeConfigLayer>,
	#[serde(default)]
	pub store: Option<StoreConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub report: Option<ReportConfigLayer>,
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(current), Some(other)) => merge(current, other),
		(None, Some(other)) => *base = Some(other),
		(_, None) => {}
	}
}

impl WardenConfigLayer {
	/// Overlay `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: WardenConfigLayer) {
		merge_section(&mut self.probe, other.probe, ProbeConfigLayer::merge);
		merge_section(&mut self.store, other.store, StoreConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_section(&mut self.report, other.report, ReportConfigLayer::merge);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn merge_fills_missing_sections() {
		let mut base = WardenConfigLayer::default();
		base.merge(WardenConfigLayer {
			logging: Some(LoggingConfigLayer {
				level: Some("warn".to_string()),
				json: None,
			}),
			..Default::default()
		});
		assert_eq!(
			base.logging.and_then(|l| l.level),
			Some("warn".to_string())
		);
	}

	#[test]
	fn merge_overlays_fields_within_a_section() {
		let mut base: WardenConfigLayer = toml::from_str(
			r#"
[probe]
concurrency = 2
id_end = 10
"#,
		)
		.unwrap();
		let overlay: WardenConfigLayer = toml::from_str(
			r#"
[probe]
concurrency = 12
"#,
		)
		.unwrap();
		base.merge(overlay);

		let probe = base.probe.unwrap();
		assert_eq!(probe.concurrency, Some(12));
		assert_eq!(probe.id_end, Some(10));
	}
}
