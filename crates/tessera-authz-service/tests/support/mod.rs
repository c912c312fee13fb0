// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for authorization service integration tests.

use std::sync::Arc;

use tessera_authz::event::AuthzEvent;
use tessera_authz::types::{Role, RoleGrant, RoleScope};
use tessera_authz_db::testing::create_authz_test_pool;
use tessera_authz_db::{RoleRepository, RoleStore};
use tessera_authz_service::{AuthzConfig, AuthzCore, ChannelPublisher};
use tokio::sync::mpsc::Receiver;

pub struct TestCore {
	pub core: AuthzCore,
	pub roles: RoleRepository,
	pub events: Receiver<AuthzEvent>,
}

pub async fn setup() -> TestCore {
	let pool = create_authz_test_pool().await;
	let (publisher, events) = ChannelPublisher::new(64);
	let core = AuthzCore::new(pool.clone(), &AuthzConfig::default(), Arc::new(publisher));

	TestCore {
		core,
		roles: RoleRepository::new(pool),
		events,
	}
}

impl TestCore {
	/// Create a role with the given grants; `(code, allow_override)` pairs.
	pub async fn role(&self, name: &str, scope: RoleScope, grants: &[(&str, bool)]) -> Role {
		let role = Role::new(name, scope);
		self.roles.create_role(&role).await.unwrap();
		for (code, allow_override) in grants {
			let grant = if *allow_override {
				RoleGrant::overridable(*code)
			} else {
				RoleGrant::new(*code)
			};
			self.roles.add_grant(&role.id, &grant).await.unwrap();
		}
		role
	}

	/// Drain whatever events have been published so far.
	pub fn drain_events(&mut self) -> Vec<AuthzEvent> {
		let mut drained = Vec::new();
		while let Ok(event) = self.events.try_recv() {
			drained.push(event);
		}
		drained
	}
}

/// Build the expected permission set from string literals.
pub fn codes(values: &[&str]) -> std::collections::BTreeSet<String> {
	values.iter().map(|v| v.to_string()).collect()
}
