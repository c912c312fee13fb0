// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Domain events emitted by authorization mutations.
//!
//! Events are a tagged enum rather than string-keyed payloads so consumers
//! dispatch with `match` instead of comparing event-name strings. The wire
//! name (for the event bus) is exposed via [`AuthzEvent::name`].
//!
//! Delivery is best-effort: publishers may drop events, and a publish
//! failure never fails the mutation that produced the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, RoleId, RoleScope, UserId};

/// Whether an assignment mutation granted or revoked a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentAction {
	Assigned,
	Revoked,
}

impl std::fmt::Display for AssignmentAction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			AssignmentAction::Assigned => write!(f, "assigned"),
			AssignmentAction::Revoked => write!(f, "revoked"),
		}
	}
}

/// A domain event produced by the assignment manager or matrix adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum AuthzEvent {
	/// A role was assigned to or revoked from a user.
	#[serde(rename = "assignment.changed")]
	AssignmentChanged {
		user_id: UserId,
		role_id: RoleId,
		scope: RoleScope,
		project_id: Option<ProjectId>,
		action: AssignmentAction,
		timestamp: DateTime<Utc>,
	},
	/// A role's permission set was replaced by a matrix import.
	#[serde(rename = "role.permissions.imported")]
	RolePermissionsImported {
		role_id: RoleId,
		role_name: String,
		permission_codes: Vec<String>,
		actor_id: UserId,
		timestamp: DateTime<Utc>,
	},
}

impl AuthzEvent {
	/// The event-bus name for this event kind.
	pub fn name(&self) -> &'static str {
		match self {
			AuthzEvent::AssignmentChanged { .. } => "assignment.changed",
			AuthzEvent::RolePermissionsImported { .. } => "role.permissions.imported",
		}
	}

	/// Convenience constructor for assignment changes, stamped with now.
	pub fn assignment_changed(
		user_id: UserId,
		role_id: RoleId,
		scope: RoleScope,
		project_id: Option<ProjectId>,
		action: AssignmentAction,
	) -> Self {
		AuthzEvent::AssignmentChanged {
			user_id,
			role_id,
			scope,
			project_id,
			action,
			timestamp: Utc::now(),
		}
	}

	/// Convenience constructor for matrix import events, stamped with now.
	pub fn permissions_imported(
		role_id: RoleId,
		role_name: impl Into<String>,
		permission_codes: Vec<String>,
		actor_id: UserId,
	) -> Self {
		AuthzEvent::RolePermissionsImported {
			role_id,
			role_name: role_name.into(),
			permission_codes,
			actor_id,
			timestamp: Utc::now(),
		}
	}
}
