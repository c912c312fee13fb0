// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assignment repository over the three user/role relations.
//!
//! Each scope has its own table (`user_system_roles`, `user_custom_roles`,
//! `user_project_roles`). Revocation flips the `active` flag instead of
//! deleting, and every read applies the `active = 1` predicate so revoked
//! assignments contribute nothing to resolution while the history stays.
//!
//! Writes are single-row upserts: last writer wins on a given
//! `(user, role[, project])` key, which is safe because assignments are
//! idempotent sets rather than counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use tessera_authz::resolver::LayerGrants;
use tessera_authz::types::{Assignment, ProjectId, RoleId, RoleScope, UserId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait AssignmentStore: Send + Sync {
	/// Write or reactivate an assignment row. Returns true if anything
	/// changed; re-assigning an already-active row is a no-op.
	async fn upsert(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<bool, DbError>;

	/// Deactivate an assignment. Returns the number of rows affected;
	/// zero means there was nothing active to revoke.
	async fn deactivate(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<u64, DbError>;

	/// The aggregated grants one layer contributes for a user: the union of
	/// permission codes across active assignments, with the overridable
	/// subset. The project layer is empty when no project is supplied.
	async fn layer_grants(
		&self,
		user_id: &UserId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<LayerGrants, DbError>;

	/// Full assignment history for a user across all three relations,
	/// including inactive rows.
	async fn assignments_for_user(&self, user_id: &UserId) -> Result<Vec<Assignment>, DbError>;
}

/// SQLite-backed assignment store.
#[derive(Clone)]
pub struct AssignmentRepository {
	pool: SqlitePool,
}

fn table_for(scope: RoleScope) -> &'static str {
	match scope {
		RoleScope::System => "user_system_roles",
		RoleScope::Custom => "user_custom_roles",
		RoleScope::Project => "user_project_roles",
	}
}

impl AssignmentRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn require_project<'a>(
		scope: RoleScope,
		project_id: Option<&'a ProjectId>,
	) -> Result<Option<&'a ProjectId>, DbError> {
		if scope.requires_project() && project_id.is_none() {
			return Err(DbError::Internal(
				"project assignment requires a project id".to_string(),
			));
		}
		Ok(project_id.filter(|_| scope.requires_project()))
	}
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id, scope = %scope))]
	async fn upsert(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<bool, DbError> {
		let project_id = Self::require_project(scope, project_id)?;
		let table = table_for(scope);
		let now = Utc::now().to_rfc3339();

		// The conditional DO UPDATE makes already-active rows report zero
		// rows affected, which is how idempotence is detected.
		let result = if let Some(project_id) = project_id {
			let sql = format!(
				r#"
				INSERT INTO {table} (user_id, role_id, project_id, active, created_at, updated_at)
				VALUES (?, ?, ?, 1, ?, ?)
				ON CONFLICT(user_id, role_id, project_id)
				DO UPDATE SET active = 1, updated_at = excluded.updated_at
				WHERE {table}.active = 0
				"#
			);
			sqlx::query(&sql)
				.bind(user_id.to_string())
				.bind(role_id.to_string())
				.bind(project_id.to_string())
				.bind(&now)
				.bind(&now)
				.execute(&self.pool)
				.await?
		} else {
			let sql = format!(
				r#"
				INSERT INTO {table} (user_id, role_id, active, created_at, updated_at)
				VALUES (?, ?, 1, ?, ?)
				ON CONFLICT(user_id, role_id)
				DO UPDATE SET active = 1, updated_at = excluded.updated_at
				WHERE {table}.active = 0
				"#
			);
			sqlx::query(&sql)
				.bind(user_id.to_string())
				.bind(role_id.to_string())
				.bind(&now)
				.bind(&now)
				.execute(&self.pool)
				.await?
		};

		let changed = result.rows_affected() > 0;
		if changed {
			tracing::debug!(user_id = %user_id, role_id = %role_id, scope = %scope, "assignment written");
		}
		Ok(changed)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, role_id = %role_id, scope = %scope))]
	async fn deactivate(
		&self,
		user_id: &UserId,
		role_id: &RoleId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<u64, DbError> {
		let project_id = Self::require_project(scope, project_id)?;
		let table = table_for(scope);
		let now = Utc::now().to_rfc3339();

		let result = if let Some(project_id) = project_id {
			let sql = format!(
				r#"
				UPDATE {table} SET active = 0, updated_at = ?
				WHERE user_id = ? AND role_id = ? AND project_id = ? AND active = 1
				"#
			);
			sqlx::query(&sql)
				.bind(&now)
				.bind(user_id.to_string())
				.bind(role_id.to_string())
				.bind(project_id.to_string())
				.execute(&self.pool)
				.await?
		} else {
			let sql = format!(
				r#"
				UPDATE {table} SET active = 0, updated_at = ?
				WHERE user_id = ? AND role_id = ? AND active = 1
				"#
			);
			sqlx::query(&sql)
				.bind(&now)
				.bind(user_id.to_string())
				.bind(role_id.to_string())
				.execute(&self.pool)
				.await?
		};

		let rows = result.rows_affected();
		if rows > 0 {
			tracing::debug!(user_id = %user_id, role_id = %role_id, scope = %scope, "assignment deactivated");
		}
		Ok(rows)
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id, scope = %scope))]
	async fn layer_grants(
		&self,
		user_id: &UserId,
		scope: RoleScope,
		project_id: Option<&ProjectId>,
	) -> Result<LayerGrants, DbError> {
		// No project supplied means the project layer does not apply at all.
		if scope.requires_project() && project_id.is_none() {
			return Ok(LayerGrants::empty());
		}

		let table = table_for(scope);
		let rows = if scope.requires_project() {
			let sql = format!(
				r#"
				SELECT rp.code AS code, MAX(rp.allow_override) AS allow_override
				FROM {table} a
				JOIN role_permissions rp ON rp.role_id = a.role_id
				WHERE a.user_id = ? AND a.project_id = ? AND a.active = 1
				GROUP BY rp.code
				"#
			);
			sqlx::query(&sql)
				.bind(user_id.to_string())
				.bind(project_id.map(ToString::to_string))
				.fetch_all(&self.pool)
				.await?
		} else {
			let sql = format!(
				r#"
				SELECT rp.code AS code, MAX(rp.allow_override) AS allow_override
				FROM {table} a
				JOIN role_permissions rp ON rp.role_id = a.role_id
				WHERE a.user_id = ? AND a.active = 1
				GROUP BY rp.code
				"#
			);
			sqlx::query(&sql)
				.bind(user_id.to_string())
				.fetch_all(&self.pool)
				.await?
		};

		Ok(rows
			.iter()
			.map(|row| {
				(
					row.get::<String, _>("code"),
					row.get::<i64, _>("allow_override") != 0,
				)
			})
			.collect())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	async fn assignments_for_user(&self, user_id: &UserId) -> Result<Vec<Assignment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT user_id, role_id, 'system' AS scope, NULL AS project_id,
			       active, created_at, updated_at
			FROM user_system_roles WHERE user_id = ?
			UNION ALL
			SELECT user_id, role_id, 'custom' AS scope, NULL AS project_id,
			       active, created_at, updated_at
			FROM user_custom_roles WHERE user_id = ?
			UNION ALL
			SELECT user_id, role_id, 'project' AS scope, project_id,
			       active, created_at, updated_at
			FROM user_project_roles WHERE user_id = ?
			ORDER BY created_at
			"#,
		)
		.bind(user_id.to_string())
		.bind(user_id.to_string())
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| {
				let role_id: String = row.get("role_id");
				let scope: String = row.get("scope");
				let project_id: Option<String> = row.get("project_id");
				let created_at: String = row.get("created_at");
				let updated_at: String = row.get("updated_at");

				let parse_ts = |ts: &str| {
					DateTime::parse_from_rfc3339(ts)
						.map(|t| t.with_timezone(&Utc))
						.map_err(|e| DbError::Internal(format!("bad timestamp: {e}")))
				};

				Ok(Assignment {
					user_id: *user_id,
					role_id: RoleId::new(
						Uuid::parse_str(&role_id)
							.map_err(|e| DbError::Internal(format!("bad role id: {e}")))?,
					),
					scope: scope
						.parse::<RoleScope>()
						.map_err(|e| DbError::Internal(e.to_string()))?,
					project_id: project_id
						.map(|p| {
							Uuid::parse_str(&p)
								.map(ProjectId::new)
								.map_err(|e| DbError::Internal(format!("bad project id: {e}")))
						})
						.transpose()?,
					active: row.get::<i64, _>("active") != 0,
					created_at: parse_ts(&created_at)?,
					updated_at: parse_ts(&updated_at)?,
				})
			})
			.collect()
	}
}
