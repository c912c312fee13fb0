// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assignment mutations: assign and revoke roles across the three scopes.
//!
//! Every real state change invalidates all of the affected user's cache
//! entries and emits an `assignment.changed` event. No-ops (re-assigning an
//! active role, revoking something not assigned) touch neither the cache
//! nor the event stream. If storage fails, nothing is invalidated: state is
//! unchanged, so the cache is still consistent.

use std::sync::Arc;

use tessera_authz::event::{AssignmentAction, AuthzEvent};
use tessera_authz::types::{ProjectId, RoleId, RoleScope, UserId};
use tessera_authz_db::{AssignmentStore, RoleStore};

use crate::cache::PermissionCache;
use crate::error::{AuthzError, Result};
use crate::publisher::{emit, EventPublisher};

/// Mutation API over the three assignment relations.
#[derive(Clone)]
pub struct AssignmentManager {
	roles: Arc<dyn RoleStore>,
	assignments: Arc<dyn AssignmentStore>,
	cache: Arc<PermissionCache>,
	publisher: Arc<dyn EventPublisher>,
}

impl AssignmentManager {
	pub fn new(
		roles: Arc<dyn RoleStore>,
		assignments: Arc<dyn AssignmentStore>,
		cache: Arc<PermissionCache>,
		publisher: Arc<dyn EventPublisher>,
	) -> Self {
		Self {
			roles,
			assignments,
			cache,
			publisher,
		}
	}

	/// Assign a system-scoped role to a user.
	pub async fn assign_system_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool> {
		self.assign(user_id, role_id, RoleScope::System, None).await
	}

	/// Assign a custom-scoped role to a user.
	pub async fn assign_custom_role(&self, user_id: &UserId, role_id: &RoleId) -> Result<bool> {
		self.assign(user_id, role_id, RoleScope::Custom, None).await
	}

	/// Assign a project-scoped role to a user within one project.
	pub async fn assign_project_role(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		project_id: &ProjectId,
	) -> Result<bool> {
		self.assign(user_id, role_id, RoleScope::Project, Some(project_id))
			.await
	}

	/// Shared assign path: validate the role's scope, upsert, then
	/// invalidate and emit only if the row actually changed.
	///
	/// Returns true when the assignment was newly written or reactivated;
	/// false for the idempotent no-op.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id, scope = %scope))]
	async fn assign(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<bool> {
		let role = self
			.roles
			.get_role(role_id)
			.await?
			.ok_or(AuthzError::RoleNotFound(*role_id))?;

		if role.scope != scope {
			return Err(AuthzError::ScopeMismatch {
				role_id: *role_id,
				actual: role.scope,
				requested: scope,
			});
		}

		let changed = self
			.assignments
			.upsert(user_id, role_id, scope, project_id)
			.await?;

		if changed {
			self.cache.forget_user(user_id);
			emit(
				self.publisher.as_ref(),
				AuthzEvent::assignment_changed(
					*user_id,
					*role_id,
					scope,
					project_id.copied(),
					AssignmentAction::Assigned,
				),
			)
			.await;
			tracing::debug!(user_id = %user_id, role_id = %role_id, scope = %scope, "role assigned");
		}
		Ok(changed)
	}

	/// Revoke an assignment by deactivating its row.
	///
	/// Returns the number of rows affected; zero means nothing was active
	/// for that `(user, role[, project])` key and the call was a no-op.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id, scope = %scope))]
	pub async fn revoke(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<u64> {
		let rows = self
			.assignments
			.deactivate(user_id, role_id, scope, project_id)
			.await?;

		if rows > 0 {
			self.cache.forget_user(user_id);
			emit(
				self.publisher.as_ref(),
				AuthzEvent::assignment_changed(
					*user_id,
					*role_id,
					scope,
					project_id.copied(),
					AssignmentAction::Revoked,
				),
			)
			.await;
			tracing::debug!(user_id = %user_id, role_id = %role_id, scope = %scope, "role revoked");
		}
		Ok(rows)
	}
}
