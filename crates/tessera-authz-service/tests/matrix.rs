// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Matrix import/export through the storage-backed adapter.

mod support;

use support::{codes, setup};
use tessera_authz::event::AuthzEvent;
use tessera_authz::matrix::MATRIX_HEADER;
use tessera_authz::types::{RoleScope, UserId};
use tessera_authz_db::RoleStore;
use tessera_authz_service::AuthzError;

fn matrix_file(rows: &[&str]) -> Vec<u8> {
	let mut text = String::from(MATRIX_HEADER);
	text.push('\n');
	for row in rows {
		text.push_str(row);
		text.push('\n');
	}
	text.into_bytes()
}

#[tokio::test]
async fn export_then_import_is_a_fixed_point() {
	let mut harness = setup().await;
	let actor = UserId::generate();
	harness
		.role(
			"editor",
			RoleScope::Custom,
			&[("tasks.edit", false), ("tasks.view", false)],
		)
		.await;
	harness
		.role("viewer", RoleScope::Custom, &[("tasks.view", false)])
		.await;

	let exported = harness.core.matrix.export_to_flat_file().await.unwrap();
	let report = harness
		.core
		.matrix
		.import_from_flat_file(&exported, &actor)
		.await
		.unwrap();

	assert!(report.errors.is_empty());
	assert_eq!(report.rows_processed, 3);
	assert_eq!(report.roles_updated, 2);

	let again = harness.core.matrix.export_to_flat_file().await.unwrap();
	assert_eq!(exported, again);
	// One sync event per role.
	assert_eq!(harness.drain_events().len(), 2);
}

#[tokio::test]
async fn header_mismatch_aborts_with_no_side_effects() {
	let mut harness = setup().await;
	let actor = UserId::generate();
	let role = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let bytes = b"role,module,action,code,allow\neditor,tasks,view,tasks.view,true\n";
	let err = harness
		.core
		.matrix
		.import_from_flat_file(bytes, &actor)
		.await
		.unwrap_err();
	assert!(matches!(err, AuthzError::Matrix(_)));

	let grants = harness.roles.grants_for_role(&role.id).await.unwrap();
	let kept: Vec<&str> = grants.iter().map(|g| g.code.as_str()).collect();
	assert_eq!(kept, vec!["tasks.edit"]);
	assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn import_replaces_the_whole_grant_set() {
	let harness = setup().await;
	let actor = UserId::generate();
	let user = UserId::generate();
	let role = harness
		.role(
			"editor",
			RoleScope::Custom,
			&[("tasks.edit", false), ("tasks.delete", false)],
		)
		.await;
	harness
		.core
		.assignments
		.assign_custom_role(&user, &role.id)
		.await
		.unwrap();

	// Prime the cache so the import has something to invalidate.
	let before = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(before, codes(&["tasks.edit", "tasks.delete"]));

	let bytes = matrix_file(&["editor,tasks,view,tasks.view,true"]);
	let report = harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();
	assert_eq!(report.roles_updated, 1);

	// The sync is destructive: rows absent from the file are gone.
	let after = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(after, codes(&["tasks.view"]));
}

#[tokio::test]
async fn import_registers_new_permissions_in_the_catalog() {
	let harness = setup().await;
	let actor = UserId::generate();
	harness.role("editor", RoleScope::Custom, &[]).await;

	let bytes = matrix_file(&["editor,reports,export,reports.export,true"]);
	harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();

	// Export reads module/action back out of the catalog.
	let exported = harness.core.matrix.export_to_flat_file().await.unwrap();
	let text = String::from_utf8(exported).unwrap();
	assert!(text.contains("editor,reports,export,reports.export,true"));
}

#[tokio::test]
async fn allow_false_rows_are_skipped_not_errors() {
	let harness = setup().await;
	let actor = UserId::generate();
	harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let bytes = matrix_file(&[
		"editor,tasks,view,tasks.view,true",
		"editor,tasks,delete,tasks.delete,false",
	]);
	let report = harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();

	assert!(report.errors.is_empty());
	assert_eq!(report.rows_processed, 1);
	assert_eq!(report.rows_skipped, 1);
}

#[tokio::test]
async fn bad_rows_are_reported_and_good_groups_still_apply() {
	let harness = setup().await;
	let actor = UserId::generate();
	let editor = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let bytes = matrix_file(&[
		"editor,tasks,view,tasks.view,true",
		"editor,tasks,edit,wrong.code,true",
		"ghost,tasks,view,tasks.view,true",
		"too,few,columns",
	]);
	let report = harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();

	assert_eq!(report.roles_updated, 1);
	assert_eq!(report.rows_processed, 1);
	assert_eq!(report.errors.len(), 3);

	let grants = harness.roles.grants_for_role(&editor.id).await.unwrap();
	let kept: Vec<&str> = grants.iter().map(|g| g.code.as_str()).collect();
	assert_eq!(kept, vec!["tasks.view"]);
}

#[tokio::test]
async fn role_names_resolve_to_the_most_global_scope() {
	let harness = setup().await;
	let actor = UserId::generate();
	let system = harness
		.role("manager", RoleScope::System, &[("tasks.view", false)])
		.await;
	let project = harness
		.role("manager", RoleScope::Project, &[("tasks.view", false)])
		.await;

	let bytes = matrix_file(&["manager,users,manage,users.manage,true"]);
	harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();

	let system_grants = harness.roles.grants_for_role(&system.id).await.unwrap();
	let project_grants = harness.roles.grants_for_role(&project.id).await.unwrap();
	assert_eq!(system_grants.len(), 1);
	assert_eq!(system_grants[0].code, "users.manage");
	assert_eq!(project_grants.len(), 1);
	assert_eq!(project_grants[0].code, "tasks.view");
}

#[tokio::test]
async fn import_events_name_the_role_and_actor() {
	let mut harness = setup().await;
	let actor = UserId::generate();
	let role = harness.role("editor", RoleScope::Custom, &[]).await;

	let bytes = matrix_file(&[
		"editor,tasks,view,tasks.view,true",
		"editor,tasks,edit,tasks.edit,true",
	]);
	harness
		.core
		.matrix
		.import_from_flat_file(&bytes, &actor)
		.await
		.unwrap();

	let events = harness.drain_events();
	assert_eq!(events.len(), 1);
	match &events[0] {
		AuthzEvent::RolePermissionsImported {
			role_id,
			role_name,
			permission_codes,
			actor_id,
			..
		} => {
			assert_eq!(*role_id, role.id);
			assert_eq!(role_name, "editor");
			assert_eq!(permission_codes, &["tasks.edit", "tasks.view"]);
			assert_eq!(*actor_id, actor);
		}
		other => panic!("unexpected event: {other:?}"),
	}
	assert_eq!(events[0].name(), "role.permissions.imported");
}

#[tokio::test]
async fn validate_reports_structure_without_touching_storage() {
	let harness = setup().await;
	let role = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let bytes = matrix_file(&[
		"editor,tasks,view,tasks.view,true",
		"editor,tasks,view,tasks.view,true",
		"too,few,columns",
	]);
	let validation = harness.core.matrix.validate(&bytes);
	assert!(!validation.valid);
	assert_eq!(validation.duplicate_count, 1);
	assert!(!validation.errors.is_empty());

	let grants = harness.roles.grants_for_role(&role.id).await.unwrap();
	let kept: Vec<&str> = grants.iter().map(|g| g.code.as_str()).collect();
	assert_eq!(kept, vec!["tasks.edit"]);
}

#[tokio::test]
async fn validate_rejects_non_utf8_input() {
	let harness = setup().await;
	let validation = harness.core.matrix.validate(&[0xff, 0xfe, 0x00]);
	assert!(!validation.valid);
	assert_eq!(validation.total_rows, 0);
}
