// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tessera_authz::matrix::MatrixError;
use tessera_authz::types::{RoleId, RoleScope};
use tessera_authz_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
	/// A role was used in an assignment relation that does not match its scope.
	#[error("role {role_id} has scope '{actual}', cannot be used in a '{requested}' assignment")]
	ScopeMismatch {
		role_id: RoleId,
		actual: RoleScope,
		requested: RoleScope,
	},

	#[error("role not found: {0}")]
	RoleNotFound(RoleId),

	/// Storage failed; the mutation is assumed not applied and caches are
	/// left untouched.
	#[error(transparent)]
	Storage(#[from] DbError),

	#[error(transparent)]
	Matrix(#[from] MatrixError),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
