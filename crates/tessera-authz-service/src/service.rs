// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-side query API for effective permissions.
//!
//! [`PermissionService`] is the single entry point request handlers use to
//! authorize actions. It reads through the [`PermissionCache`] and delegates
//! the layering rules to the pure resolver; it never mutates assignments and
//! never invalidates cache entries itself.

use std::collections::BTreeSet;
use std::sync::Arc;

use tessera_authz::resolver::{self, ResolvedPermissions};
use tessera_authz::types::{ProjectId, RoleScope, UserId};
use tessera_authz_db::AssignmentStore;

use crate::cache::PermissionCache;
use crate::error::Result;

/// Cached, layered permission resolution for a user and optional project.
#[derive(Clone)]
pub struct PermissionService {
	assignments: Arc<dyn AssignmentStore>,
	cache: Arc<PermissionCache>,
}

impl PermissionService {
	pub fn new(assignments: Arc<dyn AssignmentStore>, cache: Arc<PermissionCache>) -> Self {
		Self { assignments, cache }
	}

	/// The user's effective permission set.
	///
	/// Unknown users and projects are not errors: no active assignment in
	/// any layer resolves to the empty set (deny-by-default). Only storage
	/// failures propagate.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn resolve(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
	) -> Result<BTreeSet<String>> {
		if let Some(cached) = self.cache.get(user_id, project_id) {
			return Ok(cached);
		}

		let (system, custom, project) = self.load_layers(user_id, project_id).await?;
		let effective = resolver::resolve(&system, &custom, &project);

		self.cache.put(user_id, project_id, effective.clone());
		Ok(effective)
	}

	/// True if the user holds the given permission code.
	pub async fn has_permission(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
		code: &str,
	) -> Result<bool> {
		Ok(self.resolve(user_id, project_id).await?.contains(code))
	}

	/// True if the user holds every one of the given codes.
	pub async fn has_all(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
		codes: &[&str],
	) -> Result<bool> {
		let effective = self.resolve(user_id, project_id).await?;
		Ok(codes.iter().all(|code| effective.contains(*code)))
	}

	/// True if the user holds at least one of the given codes.
	pub async fn has_any(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
		codes: &[&str],
	) -> Result<bool> {
		let effective = self.resolve(user_id, project_id).await?;
		Ok(codes.iter().any(|code| effective.contains(*code)))
	}

	/// Per-layer breakdown plus the final set, for diagnostics and admin UI.
	///
	/// Always computed fresh from storage so the breakdown reflects current
	/// assignments rather than a cached aggregate.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn detailed_permissions(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
	) -> Result<ResolvedPermissions> {
		let (system, custom, project) = self.load_layers(user_id, project_id).await?;
		Ok(resolver::resolve_detailed(&system, &custom, &project))
	}

	async fn load_layers(
		&self,
		user_id: &UserId,
		project_id: Option<&ProjectId>,
	) -> Result<(
		tessera_authz::resolver::LayerGrants,
		tessera_authz::resolver::LayerGrants,
		tessera_authz::resolver::LayerGrants,
	)> {
		let system = self
			.assignments
			.layer_grants(user_id, RoleScope::System, None)
			.await?;
		let custom = self
			.assignments
			.layer_grants(user_id, RoleScope::Custom, None)
			.await?;
		let project = self
			.assignments
			.layer_grants(user_id, RoleScope::Project, project_id)
			.await?;
		Ok((system, custom, project))
	}
}
