// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization service layer for Tessera.
//!
//! Wires the pure resolution engine (`tessera-authz`) to storage
//! (`tessera-authz-db`) and adds the operational pieces around it:
//!
//! - [`PermissionService`]: cached effective-permission queries
//! - [`AssignmentManager`]: assign/revoke mutations with cache invalidation
//!   and domain events
//! - [`MatrixAdapter`]: bulk import/export of the role-permission matrix
//! - [`PermissionCache`]: TTL cache with explicit per-user invalidation
//! - [`EventPublisher`]: best-effort event delivery
//!
//! # Wiring
//!
//! [`AuthzCore::new`] assembles the whole stack over one pool:
//!
//! ```ignore
//! let pool = tessera_authz_db::create_pool("sqlite:./tessera.db").await?;
//! let (publisher, events) = ChannelPublisher::new(config.event_queue_capacity);
//! let core = AuthzCore::new(pool, &config, Arc::new(publisher));
//!
//! let allowed = core
//!     .permissions
//!     .has_permission(&user_id, Some(&project_id), "tasks.edit")
//!     .await?;
//! ```

pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod publisher;
pub mod service;

pub use adapter::{ImportReport, MatrixAdapter};
pub use cache::PermissionCache;
pub use config::{AuthzConfig, AuthzConfigLayer};
pub use error::{AuthzError, Result};
pub use manager::AssignmentManager;
pub use publisher::{ChannelPublisher, EventPublisher, NoopPublisher, PublishError};
pub use service::PermissionService;

use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tessera_authz_db::{AssignmentRepository, PermissionRepository, RoleRepository};

/// The fully wired authorization core over a single database pool.
#[derive(Clone)]
pub struct AuthzCore {
	pub permissions: PermissionService,
	pub assignments: AssignmentManager,
	pub matrix: MatrixAdapter,
	pub cache: Arc<PermissionCache>,
}

impl AuthzCore {
	pub fn new(pool: SqlitePool, config: &AuthzConfig, publisher: Arc<dyn EventPublisher>) -> Self {
		let roles = Arc::new(RoleRepository::new(pool.clone()));
		let permission_repo = Arc::new(PermissionRepository::new(pool.clone()));
		let assignment_repo = Arc::new(AssignmentRepository::new(pool));
		let cache = Arc::new(PermissionCache::new(
			config.cache_ttl(),
			config.cache_max_entries,
		));

		Self {
			permissions: PermissionService::new(assignment_repo.clone(), cache.clone()),
			assignments: AssignmentManager::new(
				roles.clone(),
				assignment_repo,
				cache.clone(),
				publisher.clone(),
			),
			matrix: MatrixAdapter::new(roles, permission_repo, cache.clone(), publisher),
			cache,
		}
	}
}
