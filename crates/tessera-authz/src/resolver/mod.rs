// Copyright (c) 2026 Tessera Systems Pty Ltd. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure permission resolution over pre-loaded layer grants.

mod engine;
mod types;

pub use engine::{resolve, resolve_detailed};
pub use types::{LayerGrants, ResolvedPermissions};
