// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource store for Warden.
//!
//! Holds users, products and orders behind the [`ResourceStore`] trait.
//! Two backends are provided: [`MemoryStore`] for probes and tests, and
//! [`SqliteStore`] backed by sqlx.

pub mod error;
pub mod memory;
pub mod seed;
pub mod sqlite;
pub mod store;
pub mod testing;
pub mod types;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use seed::{seed_demo, DemoFixture, SeededUser, ADMIN_TOKEN, BOB_TOKEN, JOHN_TOKEN};
pub use sqlite::SqliteStore;
pub use store::{find_by_id, find_by_id_scoped_to_owner, ResourceStore};
pub use types::{
	Entity, NewOrder, NewProduct, NewUser, Order, OrderStatus, OrderUpdate, Product, ProductUpdate,
	User, UserUpdate,
};
