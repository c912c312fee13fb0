// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered permission resolution engine.
//!
//! This module contains the core [`resolve`] function that computes a user's
//! effective permission set from the three assignment layers. It implements
//! priority-based base-layer selection followed by per-layer refinement:
//!
//! 1. **Base selection**: The first non-empty layer in System → Custom →
//!    Project order becomes the starting set; if all are empty the result is
//!    empty (deny-by-default)
//! 2. **Refinement**: Each lower non-empty layer first intersects the running
//!    result with its full code set (narrowing, least privilege), then unions
//!    in its `allow_override` subset (controlled escalation)
//!
//! Resolution is a pure function with no side effects, making it easy to test
//! and reason about. Layers with no grants are skipped entirely: an assigned
//! role with zero permissions behaves as if the layer were absent.

use super::types::{LayerGrants, ResolvedPermissions};
use crate::types::RoleScope;
use std::collections::BTreeSet;
use tracing::instrument;

/// Computes the effective permission set from the three layers.
///
/// Never fails: unknown users or projects simply present three empty layers
/// and resolve to the empty set.
///
/// # Tracing
///
/// Instrumented at debug level with the chosen base layer and the size of
/// the resolved set, for authorization diagnostics.
#[instrument(level = "debug", skip_all, fields(base_layer, effective_count))]
pub fn resolve(
	system: &LayerGrants,
	custom: &LayerGrants,
	project: &LayerGrants,
) -> BTreeSet<String> {
	let detailed = resolve_detailed(system, custom, project);

	let span = tracing::Span::current();
	if let Some(base) = detailed.base_layer {
		span.record("base_layer", tracing::field::display(base));
	}
	span.record("effective_count", detailed.effective.len());

	detailed.effective
}

/// Computes the effective set along with the per-layer breakdown.
///
/// Used by the diagnostics API; [`resolve`] delegates here so both paths
/// share one implementation of the layering rules.
pub fn resolve_detailed(
	system: &LayerGrants,
	custom: &LayerGrants,
	project: &LayerGrants,
) -> ResolvedPermissions {
	let layers = [
		(RoleScope::System, system),
		(RoleScope::Custom, custom),
		(RoleScope::Project, project),
	];

	let mut base_layer = None;
	let mut effective: BTreeSet<String> = BTreeSet::new();

	for (scope, grants) in layers {
		if grants.is_empty() {
			continue;
		}
		if base_layer.is_none() {
			base_layer = Some(scope);
			effective = grants.codes.clone();
		} else {
			// Narrow before escalate: the lower layer keeps only what the
			// running result already holds, then staples on its explicitly
			// overridable grants.
			effective = effective.intersection(&grants.codes).cloned().collect();
			effective.extend(grants.overridable.iter().cloned());
		}
	}

	ResolvedPermissions {
		system: system.clone(),
		custom: custom.clone(),
		project: project.clone(),
		base_layer,
		effective,
	}
}
