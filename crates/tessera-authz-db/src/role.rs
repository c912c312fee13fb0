// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role repository.
//!
//! Roles are scoped at creation and own a set of permission grants, each
//! pairing carrying its own `allow_override` flag. The matrix adapter uses
//! [`RoleStore::replace_grants`] for destructive per-role sync and
//! [`RoleStore::all_grants`] for export.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use std::str::FromStr;
use tessera_authz::types::{Role, RoleGrant, RoleId, RoleScope};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn create_role(&self, role: &Role) -> Result<(), DbError>;
	async fn get_role(&self, id: &RoleId) -> Result<Option<Role>, DbError>;
	async fn list_roles(&self) -> Result<Vec<Role>, DbError>;
	/// All roles sharing a name, across scopes.
	async fn find_by_name(&self, name: &str) -> Result<Vec<Role>, DbError>;
	async fn grants_for_role(&self, id: &RoleId) -> Result<Vec<RoleGrant>, DbError>;
	/// Insert or update a single (role, permission) pairing.
	async fn add_grant(&self, id: &RoleId, grant: &RoleGrant) -> Result<(), DbError>;
	/// Replace the role's entire grant set atomically (matrix sync).
	async fn replace_grants(&self, id: &RoleId, grants: &[RoleGrant]) -> Result<(), DbError>;
	/// Every (role, grant) pairing in the store, ordered for export.
	async fn all_grants(&self) -> Result<Vec<(Role, RoleGrant)>, DbError>;
}

/// SQLite-backed role store.
#[derive(Clone)]
pub struct RoleRepository {
	pool: SqlitePool,
}

impl RoleRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_role(row: &sqlx::sqlite::SqliteRow) -> Result<Role, DbError> {
		let id: String = row.get("id");
		let scope: String = row.get("scope");
		let created_at: String = row.get("created_at");

		Ok(Role {
			id: RoleId::new(
				Uuid::parse_str(&id).map_err(|e| DbError::Internal(format!("bad role id: {e}")))?,
			),
			name: row.get("name"),
			scope: RoleScope::from_str(&scope).map_err(|e| DbError::Internal(e.to_string()))?,
			created_at: DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("bad timestamp: {e}")))?
				.with_timezone(&Utc),
		})
	}

	fn row_to_grant(row: &sqlx::sqlite::SqliteRow) -> RoleGrant {
		RoleGrant {
			code: row.get("code"),
			allow_override: row.get::<i64, _>("allow_override") != 0,
		}
	}

	/// Register the grant's code in the permission catalog if absent, so the
	/// `role_permissions` foreign key holds. The catalog grows lazily on any
	/// grant write, not just matrix imports.
	async fn ensure_permission<'e, E>(executor: E, code: &str) -> Result<(), DbError>
	where
		E: sqlx::SqliteExecutor<'e>,
	{
		let (module, action) = match code.split_once('.') {
			Some((module, action)) => (module, action),
			None => (code, ""),
		};
		sqlx::query(
			r#"
			INSERT INTO permissions (code, module, action, created_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(code) DO NOTHING
			"#,
		)
		.bind(code)
		.bind(module)
		.bind(action)
		.bind(Utc::now().to_rfc3339())
		.execute(executor)
		.await?;
		Ok(())
	}
}

#[async_trait]
impl RoleStore for RoleRepository {
	#[tracing::instrument(skip(self, role), fields(role_id = %role.id, name = %role.name, scope = %role.scope))]
	async fn create_role(&self, role: &Role) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO roles (id, name, scope, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(role.id.to_string())
		.bind(&role.name)
		.bind(role.scope.to_string())
		.bind(role.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(role_id = %role.id, "role created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	async fn get_role(&self, id: &RoleId) -> Result<Option<Role>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, scope, created_at FROM roles WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| Self::row_to_role(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, scope, created_at FROM roles ORDER BY name, scope
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(Self::row_to_role).collect()
	}

	#[tracing::instrument(skip(self))]
	async fn find_by_name(&self, name: &str) -> Result<Vec<Role>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, scope, created_at FROM roles WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(Self::row_to_role).collect()
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	async fn grants_for_role(&self, id: &RoleId) -> Result<Vec<RoleGrant>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT code, allow_override FROM role_permissions
			WHERE role_id = ?
			ORDER BY code
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(Self::row_to_grant).collect())
	}

	#[tracing::instrument(skip(self, grant), fields(role_id = %id, code = %grant.code))]
	async fn add_grant(&self, id: &RoleId, grant: &RoleGrant) -> Result<(), DbError> {
		Self::ensure_permission(&self.pool, &grant.code).await?;
		sqlx::query(
			r#"
			INSERT INTO role_permissions (role_id, code, allow_override)
			VALUES (?, ?, ?)
			ON CONFLICT(role_id, code) DO UPDATE SET allow_override = excluded.allow_override
			"#,
		)
		.bind(id.to_string())
		.bind(&grant.code)
		.bind(grant.allow_override as i32)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self, grants), fields(role_id = %id, grant_count = grants.len()))]
	async fn replace_grants(&self, id: &RoleId, grants: &[RoleGrant]) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM role_permissions WHERE role_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		for grant in grants {
			Self::ensure_permission(&mut *tx, &grant.code).await?;
			sqlx::query(
				r#"
				INSERT INTO role_permissions (role_id, code, allow_override)
				VALUES (?, ?, ?)
				"#,
			)
			.bind(id.to_string())
			.bind(&grant.code)
			.bind(grant.allow_override as i32)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		tracing::debug!(role_id = %id, grant_count = grants.len(), "role grants replaced");
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	async fn all_grants(&self) -> Result<Vec<(Role, RoleGrant)>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT r.id, r.name, r.scope, r.created_at, rp.code, rp.allow_override
			FROM roles r
			JOIN role_permissions rp ON rp.role_id = r.id
			ORDER BY r.name, r.scope, rp.code
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter()
			.map(|row| Ok((Self::row_to_role(row)?, Self::row_to_grant(row))))
			.collect()
	}
}
