// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! TTL cache for resolved permission sets.
//!
//! Entries are keyed by `(user, project-or-none)`. Explicit invalidation via
//! [`PermissionCache::forget_user`] is the primary consistency mechanism;
//! the TTL is a backstop that bounds staleness if an invalidation is ever
//! missed between a write and a crash. A mutation in any scope must forget
//! *all* of a user's entries, because system/custom layer changes affect
//! every project's resolution.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tessera_authz::types::{ProjectId, UserId};

pub const DEFAULT_TTL: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

type CacheKey = (UserId, Option<ProjectId>);

#[derive(Debug, Clone)]
struct CacheEntry {
	permissions: BTreeSet<String>,
	expires_at: Instant,
	last_used: Instant,
}

/// Bounded, TTL-expiring map from `(user, project)` to resolved permissions.
///
/// Interior mutability so a single instance can be shared between the query
/// service (reads/fills) and the mutation paths (invalidation).
#[derive(Debug)]
pub struct PermissionCache {
	entries: Mutex<HashMap<CacheKey, CacheEntry>>,
	ttl: Duration,
	max_entries: usize,
}

impl Default for PermissionCache {
	fn default() -> Self {
		Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
	}
}

impl PermissionCache {
	pub fn new(ttl: Duration, max_entries: usize) -> Self {
		PermissionCache {
			entries: Mutex::new(HashMap::new()),
			ttl,
			max_entries,
		}
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
		self.entries
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner)
	}

	pub fn get(&self, user_id: &UserId, project_id: Option<&ProjectId>) -> Option<BTreeSet<String>> {
		let key = (*user_id, project_id.copied());
		let now = Instant::now();
		let mut entries = self.lock();

		if let Some(entry) = entries.get_mut(&key) {
			if entry.expires_at > now {
				entry.last_used = now;
				return Some(entry.permissions.clone());
			}
			entries.remove(&key);
		}
		None
	}

	pub fn put(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
		permissions: BTreeSet<String>,
	) {
		let now = Instant::now();
		let mut entries = self.lock();

		if entries.len() >= self.max_entries {
			Self::evict_lru(&mut entries);
		}

		entries.insert(
			(*user_id, project_id.copied()),
			CacheEntry {
				permissions,
				expires_at: now + self.ttl,
				last_used: now,
			},
		);
	}

	/// Drop every entry for a user, across all project keys.
	pub fn forget_user(&self, user_id: &UserId) {
		self.lock().retain(|(user, _), _| user != user_id);
	}

	/// Drop everything. Used after a matrix sync, which can affect any user
	/// holding a synced role.
	pub fn clear(&self) {
		self.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	/// Drop expired entries. Callable from periodic maintenance.
	pub fn cleanup_expired(&self) {
		let now = Instant::now();
		self.lock().retain(|_, entry| entry.expires_at > now);
	}

	fn evict_lru(entries: &mut HashMap<CacheKey, CacheEntry>) {
		if let Some(oldest) = entries
			.iter()
			.min_by_key(|(_, entry)| entry.last_used)
			.map(|(k, _)| *k)
		{
			entries.remove(&oldest);
		}
	}
}
