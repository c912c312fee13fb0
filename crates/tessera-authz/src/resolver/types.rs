// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Type definitions for layered permission resolution.
//!
//! - [`LayerGrants`]: The aggregated grants one assignment layer contributes
//! - [`ResolvedPermissions`]: Per-layer diagnostic breakdown plus the final set
//!
//! # Design Principles
//!
//! 1. **Immutable evaluation**: All layer grants are loaded before resolution
//! 2. **No database access**: Resolution is pure; all data is pre-loaded
//! 3. **Serializable**: All types can be logged or returned for diagnostics

use crate::types::RoleScope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The grants a single layer (system, custom, or project) contributes.
///
/// `codes` is the union of permission codes across the user's active
/// assignments in that layer; `overridable` is the subset whose
/// (role, permission) pairing carries `allow_override = true`.
///
/// Invariant: `overridable ⊆ codes`, maintained by [`LayerGrants::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGrants {
	pub codes: BTreeSet<String>,
	pub overridable: BTreeSet<String>,
}

impl LayerGrants {
	/// An empty layer (no active assignments, or no project supplied).
	pub fn empty() -> Self {
		Self::default()
	}

	/// Add a grant to the layer.
	///
	/// A code already present stays overridable once any pairing marks it so:
	/// union semantics across the layer's roles.
	pub fn insert(&mut self, code: impl Into<String>, allow_override: bool) {
		let code = code.into();
		if allow_override {
			self.overridable.insert(code.clone());
		}
		self.codes.insert(code);
	}

	/// Returns true if the layer grants nothing.
	pub fn is_empty(&self) -> bool {
		self.codes.is_empty()
	}
}

impl<S: Into<String>> FromIterator<(S, bool)> for LayerGrants {
	fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
		let mut grants = LayerGrants::empty();
		for (code, allow_override) in iter {
			grants.insert(code, allow_override);
		}
		grants
	}
}

/// Full resolution output for diagnostics and admin UI.
///
/// Carries what each layer contributed, which layer was selected as the
/// base, and the final effective set. Produced by
/// [`resolve_detailed`](crate::resolver::resolve_detailed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPermissions {
	pub system: LayerGrants,
	pub custom: LayerGrants,
	pub project: LayerGrants,
	/// The highest-priority non-empty layer, if any.
	pub base_layer: Option<RoleScope>,
	/// The final effective permission set.
	pub effective: BTreeSet<String>,
}

impl ResolvedPermissions {
	/// Returns true if the user ended up with no permissions at all.
	pub fn is_denied(&self) -> bool {
		self.effective.is_empty()
	}
}
