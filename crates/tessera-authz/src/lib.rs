// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and resolution engine for Tessera's layered RBAC system.
//!
//! Tessera authorizes every request against an *effective permission set*
//! computed from three independent assignment layers:
//!
//! - **System**: platform-wide roles assigned directly to a user
//! - **Custom**: tenant-defined roles assigned directly to a user
//! - **Project**: roles a user holds within a single project
//!
//! The highest-priority non-empty layer becomes the base set; each lower
//! non-empty layer narrows it by intersection and may escalate individual
//! permissions whose (role, permission) pairing is marked `allow_override`.
//!
//! This crate is storage-free. It provides the domain types, the pure
//! [`resolver`] engine, the [`event`] types emitted by mutations, and the
//! [`matrix`] flat-file codec used for bulk role administration. Storage
//! lives in `tessera-authz-db`; caching, assignment management, and the
//! matrix adapter live in `tessera-authz-service`.
//!
//! # Example
//!
//! ```
//! use tessera_authz::resolver::{self, LayerGrants};
//!
//! let system: LayerGrants = [("projects.view", false), ("projects.edit", false)]
//!     .into_iter()
//!     .collect();
//! let custom: LayerGrants = [("projects.view", false), ("quotes.send", true)]
//!     .into_iter()
//!     .collect();
//!
//! let effective = resolver::resolve(&system, &custom, &LayerGrants::empty());
//! assert!(effective.contains("projects.view")); // survives narrowing
//! assert!(effective.contains("quotes.send"));   // escalated via override
//! assert!(!effective.contains("projects.edit")); // narrowed away
//! ```

pub mod event;
pub mod matrix;
pub mod resolver;
pub mod types;

pub use event::{AssignmentAction, AuthzEvent};
pub use matrix::{MatrixError, MatrixRow, MatrixValidation, MATRIX_HEADER};
pub use resolver::{LayerGrants, ResolvedPermissions};
pub use types::{
	Assignment, Permission, ProjectId, Role, RoleGrant, RoleId, RoleScope, UnknownScope, UserId,
};
