// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission catalog repository.
//!
//! Permissions are long-lived administrative rows keyed by their code. The
//! catalog grows lazily: the matrix import path calls [`PermissionStore::ensure`]
//! for every referenced `(module, action)` pair, and role grant writes seed
//! missing codes the same way, only inserting when absent.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use tessera_authz::types::Permission;

use crate::error::DbError;

#[async_trait]
pub trait PermissionStore: Send + Sync {
	/// Get the permission for a `(module, action)` pair, creating it if absent.
	async fn ensure(&self, module: &str, action: &str) -> Result<Permission, DbError>;
	async fn get_by_code(&self, code: &str) -> Result<Option<Permission>, DbError>;
	async fn list_all(&self) -> Result<Vec<Permission>, DbError>;
}

/// SQLite-backed permission catalog.
#[derive(Clone)]
pub struct PermissionRepository {
	pool: SqlitePool,
}

impl PermissionRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	fn row_to_permission(row: &sqlx::sqlite::SqliteRow) -> Permission {
		Permission {
			code: row.get("code"),
			module: row.get("module"),
			action: row.get("action"),
		}
	}
}

#[async_trait]
impl PermissionStore for PermissionRepository {
	#[tracing::instrument(skip(self), fields(module, action))]
	async fn ensure(&self, module: &str, action: &str) -> Result<Permission, DbError> {
		let permission = Permission::new(module, action);
		let result = sqlx::query(
			r#"
			INSERT INTO permissions (code, module, action, created_at)
			VALUES (?, ?, ?, ?)
			ON CONFLICT(code) DO NOTHING
			"#,
		)
		.bind(&permission.code)
		.bind(&permission.module)
		.bind(&permission.action)
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() > 0 {
			tracing::debug!(code = %permission.code, "permission created");
		}
		Ok(permission)
	}

	#[tracing::instrument(skip(self))]
	async fn get_by_code(&self, code: &str) -> Result<Option<Permission>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT code, module, action FROM permissions WHERE code = ?
			"#,
		)
		.bind(code)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| Self::row_to_permission(&r)))
	}

	#[tracing::instrument(skip(self))]
	async fn list_all(&self) -> Result<Vec<Permission>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT code, module, action FROM permissions ORDER BY code
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(rows.iter().map(Self::row_to_permission).collect())
	}
}
