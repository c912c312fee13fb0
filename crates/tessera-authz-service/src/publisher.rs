// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event publishing for authorization mutations.
//!
//! Delivery is best-effort and at-least-once: the storage write is the
//! source of truth, so a publish failure is logged and swallowed rather
//! than surfaced to the caller of a mutation. Mutation code goes through
//! [`emit`] to get that behavior uniformly.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use tessera_authz::event::AuthzEvent;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
	#[error("event channel closed")]
	ChannelClosed,
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
	async fn publish(&self, event: AuthzEvent) -> Result<(), PublishError>;
}

/// Publish an event, logging and swallowing any failure.
pub async fn emit(publisher: &dyn EventPublisher, event: AuthzEvent) {
	let name = event.name();
	if let Err(e) = publisher.publish(event).await {
		warn!(event = name, error = %e, "event publish failed");
	}
}

/// Publisher backed by a bounded tokio channel.
///
/// The receiving half is handed to whatever bridges events onto the bus;
/// a full or closed channel drops the event.
pub struct ChannelPublisher {
	tx: mpsc::Sender<AuthzEvent>,
}

impl ChannelPublisher {
	pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AuthzEvent>) {
		let (tx, rx) = mpsc::channel(capacity);
		(Self { tx }, rx)
	}
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
	async fn publish(&self, event: AuthzEvent) -> Result<(), PublishError> {
		self.tx
			.try_send(event)
			.map_err(|_| PublishError::ChannelClosed)
	}
}

/// Publisher that discards everything. Useful in tests and tools that do
/// not care about events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
	async fn publish(&self, _event: AuthzEvent) -> Result<(), PublishError> {
		Ok(())
	}
}
