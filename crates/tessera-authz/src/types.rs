// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for the authorization system.
//!
//! This module defines the foundational types used throughout the RBAC core:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs for different entity
//!   types ([`UserId`], [`RoleId`], [`ProjectId`]) preventing accidental mixing
//! - **[`RoleScope`]**: The three fixed scopes a role can belong to
//! - **[`Permission`]**: A catalog entry identified by a `"{module}.{action}"` code
//! - **[`Role`] / [`RoleGrant`]**: Roles and their per-permission grants, each
//!   grant carrying its own `allow_override` flag
//! - **[`Assignment`]**: A soft-revocable user/role binding in one of the
//!   three assignment relations
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(RoleId, "Unique identifier for a role.");
define_id_type!(ProjectId, "Unique identifier for a project.");

// =============================================================================
// Role Scope
// =============================================================================

/// The scope a role belongs to, fixed at creation.
///
/// The scope determines which assignment relation the role may participate
/// in, and doubles as the layer identity during permission resolution:
/// System is the highest-priority layer, Project the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
	/// Platform-wide roles assigned directly to users.
	System,
	/// Tenant-defined roles assigned directly to users.
	Custom,
	/// Roles assigned to a user within a single project.
	Project,
}

impl RoleScope {
	/// Returns all scopes in resolution priority order (highest first).
	pub fn all() -> &'static [RoleScope] {
		&[RoleScope::System, RoleScope::Custom, RoleScope::Project]
	}

	/// Resolution priority of this scope; lower numbers win tie-breaks.
	pub fn priority(&self) -> u8 {
		match self {
			RoleScope::System => 0,
			RoleScope::Custom => 1,
			RoleScope::Project => 2,
		}
	}

	/// Returns true if assignments in this scope carry a project ID.
	pub fn requires_project(&self) -> bool {
		matches!(self, RoleScope::Project)
	}
}

impl fmt::Display for RoleScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoleScope::System => write!(f, "system"),
			RoleScope::Custom => write!(f, "custom"),
			RoleScope::Project => write!(f, "project"),
		}
	}
}

impl FromStr for RoleScope {
	type Err = UnknownScope;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"system" => Ok(RoleScope::System),
			"custom" => Ok(RoleScope::Custom),
			"project" => Ok(RoleScope::Project),
			other => Err(UnknownScope(other.to_string())),
		}
	}
}

/// Error returned when parsing an unrecognized scope string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role scope: {0}")]
pub struct UnknownScope(pub String);

// =============================================================================
// Permissions
// =============================================================================

/// A permission catalog entry.
///
/// Permissions are long-lived administrative objects. The `code` is the
/// stable identity, mechanically derived from the `(module, action)` pair;
/// the parts are kept denormalized for display and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
	pub code: String,
	pub module: String,
	pub action: String,
}

impl Permission {
	/// Create a permission from its module and action parts.
	pub fn new(module: impl Into<String>, action: impl Into<String>) -> Self {
		let module = module.into();
		let action = action.into();
		let code = Self::derive_code(&module, &action);
		Self {
			code,
			module,
			action,
		}
	}

	/// The canonical permission code for a `(module, action)` pair.
	pub fn derive_code(module: &str, action: &str) -> String {
		format!("{module}.{action}")
	}
}

// =============================================================================
// Roles
// =============================================================================

/// A role: a named set of permission grants within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
	pub id: RoleId,
	pub name: String,
	pub scope: RoleScope,
	pub created_at: DateTime<Utc>,
}

impl Role {
	/// Create a new role with a generated ID.
	pub fn new(name: impl Into<String>, scope: RoleScope) -> Self {
		Self {
			id: RoleId::generate(),
			name: name.into(),
			scope,
			created_at: Utc::now(),
		}
	}
}

/// A single (role, permission) pairing.
///
/// `allow_override` is a property of the pairing, not of the permission:
/// the same code can be escalating under one role and not under another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
	pub code: String,
	pub allow_override: bool,
}

impl RoleGrant {
	/// Create a non-overridable grant for a permission code.
	pub fn new(code: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			allow_override: false,
		}
	}

	/// Create a grant with the override flag set.
	pub fn overridable(code: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			allow_override: true,
		}
	}
}

// =============================================================================
// Assignments
// =============================================================================

/// A user/role binding in one of the three assignment relations.
///
/// Revocation flips `active` to false; rows are never deleted, so the
/// full assignment history stays queryable. `project_id` is present only
/// for assignments in the project relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
	pub user_id: UserId,
	pub role_id: RoleId,
	pub scope: RoleScope,
	pub project_id: Option<ProjectId>,
	pub active: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}
