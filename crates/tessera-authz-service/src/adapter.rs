// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage-backed matrix import/export.
//!
//! Export walks every (role, permission) grant into the flat-file format.
//! Import is the destructive direction: each role named in the file has its
//! entire grant set *replaced* with the file's rows. Import is deliberately
//! not transactional across roles: a failing group leaves the roles synced
//! before it updated, and the report says which groups failed.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tessera_authz::event::AuthzEvent;
use tessera_authz::matrix::{self, MatrixError, MatrixRow, MatrixValidation, RowKind};
use tessera_authz::types::{Permission, Role, RoleGrant, UserId};
use tessera_authz_db::{PermissionStore, RoleStore};

use crate::cache::PermissionCache;
use crate::error::Result;
use crate::publisher::{emit, EventPublisher};

/// Aggregate outcome of a matrix import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
	/// Data rows applied as part of a successful role sync.
	pub rows_processed: usize,
	/// Rows skipped for a falsy `allow` value (not errors).
	pub rows_skipped: usize,
	pub roles_updated: usize,
	/// Row-level error messages, 1-indexed counting the header row.
	pub errors: Vec<String>,
}

/// Bulk role-permission administration via the flat-file matrix format.
#[derive(Clone)]
pub struct MatrixAdapter {
	roles: Arc<dyn RoleStore>,
	permissions: Arc<dyn PermissionStore>,
	cache: Arc<PermissionCache>,
	publisher: Arc<dyn EventPublisher>,
}

struct GroupRow {
	line: usize,
	module: String,
	action: String,
	code: String,
}

impl MatrixAdapter {
	pub fn new(
		roles: Arc<dyn RoleStore>,
		permissions: Arc<dyn PermissionStore>,
		cache: Arc<PermissionCache>,
		publisher: Arc<dyn EventPublisher>,
	) -> Self {
		Self {
			roles,
			permissions,
			cache,
			publisher,
		}
	}

	/// Render every grant in the role store to the flat-file format.
	///
	/// `allow` is always `true`: the catalog model has no negative grants,
	/// so only positive rows exist.
	#[tracing::instrument(skip(self))]
	pub async fn export_to_flat_file(&self) -> Result<Vec<u8>> {
		let catalog: HashMap<String, Permission> = self
			.permissions
			.list_all()
			.await?
			.into_iter()
			.map(|p| (p.code.clone(), p))
			.collect();

		let rows: Vec<MatrixRow> = self
			.roles
			.all_grants()
			.await?
			.into_iter()
			.map(|(role, grant)| {
				let (module, action) = match catalog.get(&grant.code) {
					Some(p) => (p.module.clone(), p.action.clone()),
					// Grants always reference catalog rows; splitting the
					// code covers a catalog row deleted out from under us.
					None => split_code(&grant.code),
				};
				MatrixRow::grant(role.name, module, action)
			})
			.collect();

		Ok(matrix::render(&rows)?.into_bytes())
	}

	/// Structural validation of a matrix file without touching storage.
	pub fn validate(&self, bytes: &[u8]) -> MatrixValidation {
		match std::str::from_utf8(bytes) {
			Ok(text) => matrix::validate(text),
			Err(_) => MatrixValidation {
				valid: false,
				errors: vec![MatrixError::InvalidEncoding.to_string()],
				total_rows: 0,
				duplicate_count: 0,
			},
		}
	}

	/// Apply a matrix file: per named role, replace its grant set with the
	/// file's rows.
	///
	/// A header mismatch aborts with zero side effects. Row-level problems
	/// (malformed rows, code mismatches, unresolvable role names) are
	/// recorded in the report and skipped; valid groups still apply.
	#[tracing::instrument(skip(self, bytes), fields(actor_id = %actor_id, byte_len = bytes.len()))]
	pub async fn import_from_flat_file(
		&self,
		bytes: &[u8],
		actor_id: &UserId,
	) -> Result<ImportReport> {
		let text = std::str::from_utf8(bytes).map_err(|_| MatrixError::InvalidEncoding)?;
		let parsed = matrix::parse(text)?;

		let mut report = ImportReport::default();
		let mut groups: BTreeMap<String, Vec<GroupRow>> = BTreeMap::new();

		for row in parsed {
			match row.kind {
				RowKind::Malformed(message) => report.errors.push(message),
				RowKind::Row(data) => {
					if !data.allow {
						report.rows_skipped += 1;
						continue;
					}
					let derived = Permission::derive_code(&data.module, &data.action);
					if derived != data.permission_code {
						report.errors.push(format!(
							"row {}: permission code '{}' does not match '{derived}'",
							row.line, data.permission_code
						));
						continue;
					}
					groups.entry(data.role_name).or_default().push(GroupRow {
						line: row.line,
						module: data.module,
						action: data.action,
						code: data.permission_code,
					});
				}
			}
		}

		let mut failure = None;
		for (role_name, rows) in groups {
			let resolved = match self.resolve_role(&role_name).await {
				Ok(resolved) => resolved,
				Err(err) => {
					failure = Some(err);
					break;
				}
			};
			match resolved {
				Some(role) => match self.sync_role(&role, &rows, actor_id).await {
					Ok(()) => {
						report.rows_processed += rows.len();
						report.roles_updated += 1;
					}
					Err(err) => {
						failure = Some(err);
						break;
					}
				},
				None => {
					report
						.errors
						.push(format!("row {}: role '{role_name}' not found", rows[0].line));
				}
			}
		}

		if report.roles_updated > 0 {
			// A synced role can affect any user holding it, so the whole
			// cache goes, not just one user's entries. Roles synced before a
			// storage failure are already visible, so this runs on the error
			// path too.
			self.cache.clear();
		}
		if let Some(err) = failure {
			return Err(err);
		}

		tracing::debug!(
			rows_processed = report.rows_processed,
			rows_skipped = report.rows_skipped,
			roles_updated = report.roles_updated,
			error_count = report.errors.len(),
			"matrix import finished"
		);
		Ok(report)
	}

	/// Resolve a role by name; when the name exists in several scopes, the
	/// more global scope wins (system > custom > project).
	async fn resolve_role(&self, name: &str) -> Result<Option<Role>> {
		let candidates = self.roles.find_by_name(name).await?;
		Ok(candidates
			.into_iter()
			.min_by_key(|role| role.scope.priority()))
	}

	async fn sync_role(&self, role: &Role, rows: &[GroupRow], actor_id: &UserId) -> Result<()> {
		let mut codes = BTreeSet::new();
		for row in rows {
			if codes.insert(row.code.clone()) {
				self.permissions.ensure(&row.module, &row.action).await?;
			}
		}

		// The file format cannot express overrides, so a sync resets every
		// pairing to non-overridable.
		let grants: Vec<RoleGrant> = codes.iter().map(RoleGrant::new).collect();
		self.roles.replace_grants(&role.id, &grants).await?;

		emit(
			self.publisher.as_ref(),
			AuthzEvent::permissions_imported(
				role.id,
				role.name.clone(),
				codes.into_iter().collect(),
				*actor_id,
			),
		)
		.await;
		Ok(())
	}
}

fn split_code(code: &str) -> (String, String) {
	match code.split_once('.') {
		Some((module, action)) => (module.to_string(), action.to_string()),
		None => (code.to_string(), String::new()),
	}
}
