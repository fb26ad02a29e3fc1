// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Object-level authorization policy.
//!
//! The policy answers one question: given who is asking, what they want to do,
//! and what the store said about the resource, which [`AccessDecision`] applies?
//! It never performs lookups itself; enforcement strategies decide *when* the
//! store is consulted and *when* a denial is revealed.

mod engine;
mod types;

pub use engine::{decide, decide_descriptor, is_ownerless, requires_admin};
pub use types::{AccessDecision, Action, ResourceDescriptor, ResourceType};
