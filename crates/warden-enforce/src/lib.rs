// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Object-level access enforcement for Warden.
//!
//! Three interchangeable [`Strategy`] orderings combine the store lookup with
//! the shared policy:
//!
//! - `ownership-first` compares ownership before looking anything up when the
//!   id alone names the owner
//! - `existence-first` reports absence before ownership, and so leaks which ids
//!   exist
//! - `filtered-query` scopes the lookup to the caller, so a foreign resource is
//!   indistinguishable from a missing one
//!
//! [`Api`] wraps an [`Enforcer`] with authentication and the HTTP status mapping.

pub mod api;
pub mod enforcer;
pub mod outcome;
pub mod strategy;

pub use api::{Api, ApiError, ApiRequest, ApiResponse, ErrorResponse, Operation};
pub use enforcer::{AccessRequest, Enforcer};
pub use outcome::Outcome;
pub use strategy::Strategy;
