// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Assignment lifecycle: idempotence, revocation, cache invalidation,
//! events.

mod support;

use support::{codes, setup};
use tessera_authz::event::{AssignmentAction, AuthzEvent};
use tessera_authz::types::{ProjectId, RoleId, RoleScope, UserId};
use tessera_authz_service::AuthzError;

#[tokio::test]
async fn assigning_twice_is_idempotent() {
	let mut harness = setup().await;
	let user = UserId::generate();
	let role = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let first = harness
		.core
		.assignments
		.assign_custom_role(&user, &role.id)
		.await
		.unwrap();
	let second = harness
		.core
		.assignments
		.assign_custom_role(&user, &role.id)
		.await
		.unwrap();
	assert!(first);
	assert!(!second);

	// Only the first call changed state, so only one event.
	let events = harness.drain_events();
	assert_eq!(events.len(), 1);

	let effective = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(effective, codes(&["tasks.edit"]));
}

#[tokio::test]
async fn assigning_an_unknown_role_fails() {
	let harness = setup().await;
	let user = UserId::generate();
	let missing = RoleId::generate();

	let err = harness
		.core
		.assignments
		.assign_system_role(&user, &missing)
		.await
		.unwrap_err();
	assert!(matches!(err, AuthzError::RoleNotFound(id) if id == missing));
}

#[tokio::test]
async fn assigning_through_the_wrong_scope_fails() {
	let mut harness = setup().await;
	let user = UserId::generate();
	let role = harness
		.role("contributor", RoleScope::Project, &[("tasks.view", false)])
		.await;

	let err = harness
		.core
		.assignments
		.assign_system_role(&user, &role.id)
		.await
		.unwrap_err();
	assert!(matches!(
		err,
		AuthzError::ScopeMismatch {
			actual: RoleScope::Project,
			requested: RoleScope::System,
			..
		}
	));
	assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn revocation_takes_effect_on_the_next_query() {
	let harness = setup().await;
	let user = UserId::generate();
	let editor = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;
	let viewer = harness
		.role("viewer", RoleScope::Custom, &[("tasks.view", false)])
		.await;
	harness
		.core
		.assignments
		.assign_custom_role(&user, &editor.id)
		.await
		.unwrap();
	harness
		.core
		.assignments
		.assign_custom_role(&user, &viewer.id)
		.await
		.unwrap();

	// Prime the cache, then revoke; the revoke must invalidate it.
	let before = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(before, codes(&["tasks.edit", "tasks.view"]));

	let rows = harness
		.core
		.assignments
		.revoke(&user, &editor.id, RoleScope::Custom, None)
		.await
		.unwrap();
	assert_eq!(rows, 1);

	let after = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(after, codes(&["tasks.view"]));
}

#[tokio::test]
async fn revoking_an_unassigned_role_is_a_silent_no_op() {
	let mut harness = setup().await;
	let user = UserId::generate();
	let role = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	let rows = harness
		.core
		.assignments
		.revoke(&user, &role.id, RoleScope::Custom, None)
		.await
		.unwrap();
	assert_eq!(rows, 0);
	assert!(harness.drain_events().is_empty());
}

#[tokio::test]
async fn project_revocation_only_touches_that_project() {
	let harness = setup().await;
	let user = UserId::generate();
	let alpha = ProjectId::generate();
	let beta = ProjectId::generate();
	let role = harness
		.role("contributor", RoleScope::Project, &[("tasks.view", false)])
		.await;
	harness
		.core
		.assignments
		.assign_project_role(&user, &role.id, &alpha)
		.await
		.unwrap();
	harness
		.core
		.assignments
		.assign_project_role(&user, &role.id, &beta)
		.await
		.unwrap();

	harness
		.core
		.assignments
		.revoke(&user, &role.id, RoleScope::Project, Some(&alpha))
		.await
		.unwrap();

	let in_alpha = harness
		.core
		.permissions
		.resolve(&user, Some(&alpha))
		.await
		.unwrap();
	let in_beta = harness
		.core
		.permissions
		.resolve(&user, Some(&beta))
		.await
		.unwrap();
	assert!(in_alpha.is_empty());
	assert_eq!(in_beta, codes(&["tasks.view"]));
}

#[tokio::test]
async fn reassignment_after_revoke_reactivates() {
	let mut harness = setup().await;
	let user = UserId::generate();
	let role = harness
		.role("editor", RoleScope::Custom, &[("tasks.edit", false)])
		.await;

	harness
		.core
		.assignments
		.assign_custom_role(&user, &role.id)
		.await
		.unwrap();
	harness
		.core
		.assignments
		.revoke(&user, &role.id, RoleScope::Custom, None)
		.await
		.unwrap();
	let reassigned = harness
		.core
		.assignments
		.assign_custom_role(&user, &role.id)
		.await
		.unwrap();
	assert!(reassigned);

	let effective = harness.core.permissions.resolve(&user, None).await.unwrap();
	assert_eq!(effective, codes(&["tasks.edit"]));

	// assign, revoke, assign: three state changes, three events.
	let actions: Vec<AssignmentAction> = harness
		.drain_events()
		.into_iter()
		.map(|event| match event {
			AuthzEvent::AssignmentChanged { action, .. } => action,
			other => panic!("unexpected event: {other:?}"),
		})
		.collect();
	assert_eq!(
		actions,
		vec![
			AssignmentAction::Assigned,
			AssignmentAction::Revoked,
			AssignmentAction::Assigned,
		]
	);
}

#[tokio::test]
async fn assignment_events_carry_the_full_context() {
	let mut harness = setup().await;
	let user = UserId::generate();
	let project = ProjectId::generate();
	let role = harness
		.role("contributor", RoleScope::Project, &[("tasks.view", false)])
		.await;

	harness
		.core
		.assignments
		.assign_project_role(&user, &role.id, &project)
		.await
		.unwrap();

	let events = harness.drain_events();
	assert_eq!(events.len(), 1);
	match &events[0] {
		AuthzEvent::AssignmentChanged {
			user_id,
			role_id,
			scope,
			project_id,
			action,
			..
		} => {
			assert_eq!(*user_id, user);
			assert_eq!(*role_id, role.id);
			assert_eq!(*scope, RoleScope::Project);
			assert_eq!(*project_id, Some(project));
			assert_eq!(*action, AssignmentAction::Assigned);
		}
		other => panic!("unexpected event: {other:?}"),
	}
	assert_eq!(events[0].name(), "assignment.changed");
}
