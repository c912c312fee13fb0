// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization configuration section.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_CACHE_TTL_SECS: u64 = 120;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;
const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 1024;

fn default_cache_ttl_secs() -> u64 {
	DEFAULT_CACHE_TTL_SECS
}

fn default_cache_max_entries() -> usize {
	DEFAULT_CACHE_MAX_ENTRIES
}

fn default_event_queue_capacity() -> usize {
	DEFAULT_EVENT_QUEUE_CAPACITY
}

/// Partial configuration as read from one source (file, env).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfigLayer {
	pub cache_ttl_secs: Option<u64>,
	pub cache_max_entries: Option<usize>,
	pub event_queue_capacity: Option<usize>,
}

impl AuthzConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.cache_ttl_secs.is_some() {
			self.cache_ttl_secs = other.cache_ttl_secs;
		}
		if other.cache_max_entries.is_some() {
			self.cache_max_entries = other.cache_max_entries;
		}
		if other.event_queue_capacity.is_some() {
			self.event_queue_capacity = other.event_queue_capacity;
		}
	}

	pub fn finalize(self) -> AuthzConfig {
		AuthzConfig {
			cache_ttl_secs: self.cache_ttl_secs.unwrap_or_else(default_cache_ttl_secs),
			cache_max_entries: self
				.cache_max_entries
				.unwrap_or_else(default_cache_max_entries),
			event_queue_capacity: self
				.event_queue_capacity
				.unwrap_or_else(default_event_queue_capacity),
		}
	}
}

/// Fully resolved authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthzConfig {
	/// TTL backstop for cached permission sets, in seconds.
	pub cache_ttl_secs: u64,
	pub cache_max_entries: usize,
	pub event_queue_capacity: usize,
}

impl AuthzConfig {
	pub fn cache_ttl(&self) -> Duration {
		Duration::from_secs(self.cache_ttl_secs)
	}
}

impl Default for AuthzConfig {
	fn default() -> Self {
		AuthzConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_applied() {
		let config = AuthzConfig::default();
		assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
		assert_eq!(config.cache_max_entries, DEFAULT_CACHE_MAX_ENTRIES);
		assert_eq!(config.event_queue_capacity, DEFAULT_EVENT_QUEUE_CAPACITY);
		assert_eq!(config.cache_ttl(), Duration::from_secs(120));
	}

	#[test]
	fn merge_prefers_the_later_layer() {
		let mut base = AuthzConfigLayer {
			cache_ttl_secs: Some(60),
			..Default::default()
		};
		base.merge(AuthzConfigLayer {
			cache_ttl_secs: Some(300),
			cache_max_entries: Some(500),
			event_queue_capacity: None,
		});

		let config = base.finalize();
		assert_eq!(config.cache_ttl_secs, 300);
		assert_eq!(config.cache_max_entries, 500);
		assert_eq!(config.event_queue_capacity, DEFAULT_EVENT_QUEUE_CAPACITY);
	}

	#[test]
	fn deserializes_from_toml() {
		let layer: AuthzConfigLayer = toml::from_str(
			r#"
			cache_ttl_secs = 30
			cache_max_entries = 256
			"#,
		)
		.unwrap();

		let config = layer.finalize();
		assert_eq!(config.cache_ttl_secs, 30);
		assert_eq!(config.cache_max_entries, 256);
	}
}
