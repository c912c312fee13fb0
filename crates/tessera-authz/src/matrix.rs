// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flat-file codec for the role-to-permission matrix.
//!
//! The matrix format is a comma-separated table with the exact header
//! `role_name,module,action,permission_code,allow`. Only positive grants are
//! ever listed; the format has no way to express a revocation, so `allow`
//! must be the literal string `true` for a row to apply.
//!
//! This module is pure: it parses, validates, and renders the tabular shape.
//! Resolving role names and syncing storage is the adapter's job
//! (`tessera-authz-service`).

use serde::{Deserialize, Serialize};

/// The exact header line every matrix file must start with.
pub const MATRIX_HEADER: &str = "role_name,module,action,permission_code,allow";

const COLUMN_COUNT: usize = 5;

/// Errors that abort matrix processing before any row is looked at.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
	/// The header row does not match [`MATRIX_HEADER`] exactly.
	#[error("header mismatch: expected '{MATRIX_HEADER}', found '{found}'")]
	HeaderMismatch { found: String },

	/// The file is not valid UTF-8.
	#[error("matrix file is not valid UTF-8")]
	InvalidEncoding,

	/// A field value contains a comma; the format has no quoting, so the
	/// row would re-parse with the wrong column count.
	#[error("field '{0}' contains a comma and cannot be rendered")]
	UnrepresentableField(String),
}

/// One well-formed data row of the matrix file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
	pub role_name: String,
	pub module: String,
	pub action: String,
	pub permission_code: String,
	pub allow: bool,
}

impl MatrixRow {
	/// Build an export row for a grant; `allow` is always true on export.
	pub fn grant(
		role_name: impl Into<String>,
		module: impl Into<String>,
		action: impl Into<String>,
	) -> Self {
		let module = module.into();
		let action = action.into();
		let permission_code = crate::types::Permission::derive_code(&module, &action);
		Self {
			role_name: role_name.into(),
			module,
			action,
			permission_code,
			allow: true,
		}
	}
}

/// A parsed data row tagged with its 1-indexed line number (header = line 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
	pub line: usize,
	pub kind: RowKind,
}

/// Outcome of parsing a single data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
	/// All five columns present, required fields non-empty.
	Row(MatrixRow),
	/// Wrong column count or an empty required field; skipped with an error.
	Malformed(String),
}

/// Result of [`validate`]: a storage-free structural check of a matrix file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixValidation {
	pub valid: bool,
	pub errors: Vec<String>,
	pub total_rows: usize,
	pub duplicate_count: usize,
}

/// Parse a matrix file into per-row outcomes.
///
/// A header mismatch aborts the whole parse; individual bad rows are
/// returned as [`RowKind::Malformed`] so the caller can record them and keep
/// going. Blank lines are ignored but still advance the line numbering.
pub fn parse(text: &str) -> Result<Vec<ParsedRow>, MatrixError> {
	let mut lines = text.lines();
	let header = lines.next().unwrap_or("").trim_end();
	if header != MATRIX_HEADER {
		return Err(MatrixError::HeaderMismatch {
			found: header.to_string(),
		});
	}

	let mut rows = Vec::new();
	for (idx, raw) in lines.enumerate() {
		let line = idx + 2;
		let raw = raw.trim_end();
		if raw.is_empty() {
			continue;
		}
		rows.push(ParsedRow {
			line,
			kind: parse_row(line, raw),
		});
	}
	Ok(rows)
}

fn parse_row(line: usize, raw: &str) -> RowKind {
	let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
	if fields.len() != COLUMN_COUNT {
		return RowKind::Malformed(format!(
			"row {line}: expected {COLUMN_COUNT} columns, found {}",
			fields.len()
		));
	}

	let (role_name, module, action, permission_code, allow) =
		(fields[0], fields[1], fields[2], fields[3], fields[4]);

	for (name, value) in [
		("role_name", role_name),
		("module", module),
		("action", action),
		("permission_code", permission_code),
	] {
		if value.is_empty() {
			return RowKind::Malformed(format!("row {line}: empty required field '{name}'"));
		}
	}

	RowKind::Row(MatrixRow {
		role_name: role_name.to_string(),
		module: module.to_string(),
		action: action.to_string(),
		permission_code: permission_code.to_string(),
		// Anything other than the literal "true" is a no-op row.
		allow: allow == "true",
	})
}

/// Render rows into the flat-file format, header first.
///
/// Fails with [`MatrixError::UnrepresentableField`] if any field contains a
/// comma, since such a row would not survive a round-trip through [`parse`].
pub fn render(rows: &[MatrixRow]) -> Result<String, MatrixError> {
	let mut out = String::from(MATRIX_HEADER);
	out.push('\n');
	for row in rows {
		for field in [
			&row.role_name,
			&row.module,
			&row.action,
			&row.permission_code,
		] {
			if field.contains(',') {
				return Err(MatrixError::UnrepresentableField(field.clone()));
			}
		}
		out.push_str(&format!(
			"{},{},{},{},{}\n",
			row.role_name, row.module, row.action, row.permission_code, row.allow
		));
	}
	Ok(out)
}

/// Structural validation without storage access.
///
/// Checks the header shape, column counts, and duplicate
/// `(role_name, permission_code)` pairs. It deliberately does not re-check
/// the code-derivation rule; that stays an import-time concern.
pub fn validate(text: &str) -> MatrixValidation {
	let rows = match parse(text) {
		Ok(rows) => rows,
		Err(err) => {
			return MatrixValidation {
				valid: false,
				errors: vec![err.to_string()],
				total_rows: 0,
				duplicate_count: 0,
			}
		}
	};

	let mut errors = Vec::new();
	let mut seen = std::collections::HashSet::new();
	let mut duplicate_count = 0;
	let total_rows = rows.len();

	for parsed in &rows {
		match &parsed.kind {
			RowKind::Malformed(message) => errors.push(message.clone()),
			RowKind::Row(row) => {
				let key = (row.role_name.clone(), row.permission_code.clone());
				if !seen.insert(key) {
					duplicate_count += 1;
					errors.push(format!(
						"row {}: duplicate permission '{}' for role '{}'",
						parsed.line, row.permission_code, row.role_name
					));
				}
			}
		}
	}

	MatrixValidation {
		valid: errors.is_empty(),
		errors,
		total_rows,
		duplicate_count,
	}
}
