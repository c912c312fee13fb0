// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage layer for the Tessera authorization core.
//!
//! This crate provides SQLite-backed repositories behind store traits:
//!
//! - [`PermissionStore`] / [`PermissionRepository`]: the permission catalog
//! - [`RoleStore`] / [`RoleRepository`]: roles and their permission grants
//! - [`AssignmentStore`] / [`AssignmentRepository`]: the three user/role
//!   assignment relations with soft revocation
//!
//! All IDs are UUIDs stored as strings; timestamps are RFC 3339 text. The
//! `testing` module builds in-memory schemas for repository and service
//! tests.

pub mod assignment;
pub mod catalog;
pub mod error;
pub mod pool;
pub mod role;
pub mod testing;

pub use assignment::{AssignmentRepository, AssignmentStore};
pub use catalog::{PermissionRepository, PermissionStore};
pub use error::{DbError, Result};
pub use pool::create_pool;
pub use role::{RoleRepository, RoleStore};
