// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS permissions (
			code TEXT PRIMARY KEY,
			module TEXT NOT NULL,
			action TEXT NOT NULL,
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_roles_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS roles (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL,
			scope TEXT NOT NULL CHECK (scope IN ('system', 'custom', 'project')),
			created_at TEXT NOT NULL
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_roles_name ON roles(name)")
		.execute(pool)
		.await
		.unwrap();
}

pub async fn create_role_permissions_table(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS role_permissions (
			role_id TEXT NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
			code TEXT NOT NULL REFERENCES permissions(code),
			allow_override INTEGER NOT NULL DEFAULT 0,
			PRIMARY KEY (role_id, code)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();
}

pub async fn create_assignment_tables(pool: &SqlitePool) {
	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_system_roles (
			user_id TEXT NOT NULL,
			role_id TEXT NOT NULL REFERENCES roles(id),
			active INTEGER NOT NULL DEFAULT 1,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			PRIMARY KEY (user_id, role_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_custom_roles (
			user_id TEXT NOT NULL,
			role_id TEXT NOT NULL REFERENCES roles(id),
			active INTEGER NOT NULL DEFAULT 1,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			PRIMARY KEY (user_id, role_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query(
		r#"
		CREATE TABLE IF NOT EXISTS user_project_roles (
			user_id TEXT NOT NULL,
			role_id TEXT NOT NULL REFERENCES roles(id),
			project_id TEXT NOT NULL,
			active INTEGER NOT NULL DEFAULT 1,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL,
			PRIMARY KEY (user_id, role_id, project_id)
		)
		"#,
	)
	.execute(pool)
	.await
	.unwrap();

	sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_project_roles_user ON user_project_roles(user_id, project_id)")
		.execute(pool)
		.await
		.unwrap();
}

/// Pool with the full authorization schema, for repository and service tests.
pub async fn create_authz_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	create_permissions_table(&pool).await;
	create_roles_table(&pool).await;
	create_role_permissions_table(&pool).await;
	create_assignment_tables(&pool).await;
	pool
}
