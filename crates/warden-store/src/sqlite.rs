// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite-backed resource store.
//!
//! Timestamps are stored as RFC 3339 strings. Order placement runs in a single
//! transaction so stock accounting and the insert commit together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use warden_auth::{OrderId, ProductId, UserId};

use crate::error::{Result, StoreError};
use crate::store::ResourceStore;
use crate::types::{
	NewOrder, NewProduct, NewUser, Order, OrderStatus, OrderUpdate, Product, ProductUpdate, User,
	UserUpdate,
};

const USER_COLUMNS: &str = "id, username, email, is_admin, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, created_at, updated_at";
const ORDER_COLUMNS: &str =
	"id, user_id, product_id, amount, price, total_price, status, created_at, updated_at";

/// Resource store backed by a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
	pool: SqlitePool,
}

impl SqliteStore {
	/// Create a store over an existing pool. Call [`SqliteStore::migrate`] before use.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Connect to `url` and create the schema.
	///
	/// In-memory databases are limited to a single connection so every query
	/// sees the same database.
	#[tracing::instrument]
	pub async fn connect(url: &str) -> Result<Self> {
		let options = SqliteConnectOptions::from_str(url)?
			.create_if_missing(true)
			.foreign_keys(true);
		let pool_options = if url.contains(":memory:") {
			SqlitePoolOptions::new()
				.max_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			SqlitePoolOptions::new().max_connections(4)
		};
		let pool = pool_options.connect_with(options).await?;

		let store = Self::new(pool);
		store.migrate().await?;
		Ok(store)
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	/// Create the tables if they do not exist.
	pub async fn migrate(&self) -> Result<()> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS users (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				username TEXT NOT NULL UNIQUE,
				email TEXT NOT NULL UNIQUE,
				is_admin INTEGER NOT NULL DEFAULT 0,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS products (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				name TEXT NOT NULL UNIQUE,
				description TEXT NOT NULL,
				price REAL NOT NULL,
				stock INTEGER NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS orders (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				user_id INTEGER NOT NULL REFERENCES users(id),
				product_id INTEGER NOT NULL REFERENCES products(id),
				amount INTEGER NOT NULL,
				price REAL NOT NULL,
				total_price REAL NOT NULL,
				status TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders(user_id)")
			.execute(&self.pool)
			.await?;

		Ok(())
	}
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| StoreError::Internal(format!("invalid timestamp '{value}': {e}")))
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
	Ok(User {
		id: UserId::new(row.try_get("id")?),
		username: row.try_get("username")?,
		email: row.try_get("email")?,
		is_admin: row.try_get("is_admin")?,
		created_at: parse_timestamp(row.try_get("created_at")?)?,
		updated_at: parse_timestamp(row.try_get("updated_at")?)?,
	})
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
	Ok(Product {
		id: ProductId::new(row.try_get("id")?),
		name: row.try_get("name")?,
		description: row.try_get("description")?,
		price: row.try_get("price")?,
		stock: row.try_get("stock")?,
		created_at: parse_timestamp(row.try_get("created_at")?)?,
		updated_at: parse_timestamp(row.try_get("updated_at")?)?,
	})
}

fn order_from_row(row: &SqliteRow) -> Result<Order> {
	let status: String = row.try_get("status")?;
	Ok(Order {
		id: OrderId::new(row.try_get("id")?),
		user_id: UserId::new(row.try_get("user_id")?),
		product_id: ProductId::new(row.try_get("product_id")?),
		amount: row.try_get("amount")?,
		price: row.try_get("price")?,
		total_price: row.try_get("total_price")?,
		status: OrderStatus::from_str(&status)?,
		created_at: parse_timestamp(row.try_get("created_at")?)?,
		updated_at: parse_timestamp(row.try_get("updated_at")?)?,
	})
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
	if let sqlx::Error::Database(db) = &err {
		if db.is_unique_violation() {
			return StoreError::Conflict(format!("{what} already exists"));
		}
	}
	StoreError::Database(err)
}

#[async_trait]
impl ResourceStore for SqliteStore {
	async fn find_user(&self, id: UserId) -> Result<Option<User>> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(user_from_row).transpose()
	}

	async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
		let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(product_from_row).transpose()
	}

	async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
		let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(order_from_row).transpose()
	}

	async fn find_order_scoped_to_owner(
		&self,
		id: OrderId,
		owner: UserId,
	) -> Result<Option<Order>> {
		let row = sqlx::query(&format!(
			"SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ?"
		))
		.bind(id.get())
		.bind(owner.get())
		.fetch_optional(&self.pool)
		.await?;
		row.as_ref().map(order_from_row).transpose()
	}

	async fn list_products(&self) -> Result<Vec<Product>> {
		let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(product_from_row).collect()
	}

	async fn list_orders(&self) -> Result<Vec<Order>> {
		let rows = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"))
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(order_from_row).collect()
	}

	async fn list_orders_for_user(&self, owner: UserId) -> Result<Vec<Order>> {
		let rows = sqlx::query(&format!(
			"SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY id"
		))
		.bind(owner.get())
		.fetch_all(&self.pool)
		.await?;
		rows.iter().map(order_from_row).collect()
	}

	#[tracing::instrument(skip(self, new), fields(username = %new.username))]
	async fn create_user(&self, new: NewUser) -> Result<User> {
		let now = Utc::now();
		let result = sqlx::query(
			"INSERT INTO users (username, email, is_admin, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
		)
		.bind(&new.username)
		.bind(&new.email)
		.bind(new.is_admin)
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, &format!("user '{}'", new.username)))?;

		Ok(User {
			id: UserId::new(result.last_insert_rowid()),
			username: new.username,
			email: new.email,
			is_admin: new.is_admin,
			created_at: now,
			updated_at: now,
		})
	}

	#[tracing::instrument(skip(self, new), fields(name = %new.name))]
	async fn create_product(&self, new: NewProduct) -> Result<Product> {
		new.validate()?;
		let now = Utc::now();
		let result = sqlx::query(
			"INSERT INTO products (name, description, price, stock, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
		)
		.bind(&new.name)
		.bind(&new.description)
		.bind(new.price)
		.bind(new.stock)
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, &format!("product '{}'", new.name)))?;

		Ok(Product {
			id: ProductId::new(result.last_insert_rowid()),
			name: new.name,
			description: new.description,
			price: new.price,
			stock: new.stock,
			created_at: now,
			updated_at: now,
		})
	}

	#[tracing::instrument(skip(self), fields(user_id = %new.user_id, product_id = %new.product_id))]
	async fn create_order(&self, new: NewOrder) -> Result<Order> {
		if new.amount <= 0 {
			return Err(StoreError::InvalidInput(format!(
				"order amount must be positive, got {}",
				new.amount
			)));
		}

		let mut tx = self.pool.begin().await?;

		let user: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
			.bind(new.user_id.get())
			.fetch_optional(&mut *tx)
			.await?;
		if user.is_none() {
			return Err(StoreError::NotFound(format!("user {}", new.user_id)));
		}

		let row = sqlx::query("SELECT price, stock FROM products WHERE id = ?")
			.bind(new.product_id.get())
			.fetch_optional(&mut *tx)
			.await?
			.ok_or_else(|| StoreError::NotFound(format!("product {}", new.product_id)))?;
		let price: f64 = row.try_get("price")?;
		let stock: i64 = row.try_get("stock")?;
		if stock < new.amount {
			return Err(StoreError::InsufficientStock {
				requested: new.amount,
				available: stock,
			});
		}

		let now = Utc::now();
		sqlx::query("UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ?")
			.bind(new.amount)
			.bind(now.to_rfc3339())
			.bind(new.product_id.get())
			.execute(&mut *tx)
			.await?;

		let total_price = price * new.amount as f64;
		let result = sqlx::query(
			r#"
			INSERT INTO orders (user_id, product_id, amount, price, total_price, status, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(new.user_id.get())
		.bind(new.product_id.get())
		.bind(new.amount)
		.bind(price)
		.bind(total_price)
		.bind(OrderStatus::Pending.as_str())
		.bind(now.to_rfc3339())
		.bind(now.to_rfc3339())
		.execute(&mut *tx)
		.await?;

		tx.commit().await?;

		Ok(Order {
			id: OrderId::new(result.last_insert_rowid()),
			user_id: new.user_id,
			product_id: new.product_id,
			amount: new.amount,
			price,
			total_price,
			status: OrderStatus::Pending,
			created_at: now,
			updated_at: now,
		})
	}

	#[tracing::instrument(skip(self, update))]
	async fn update_user(&self, id: UserId, update: UserUpdate) -> Result<Option<User>> {
		let mut tx = self.pool.begin().await?;
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&mut *tx)
			.await?;
		let Some(mut user) = row.as_ref().map(user_from_row).transpose()? else {
			return Ok(None);
		};

		if update.apply(&mut user) {
			user.updated_at = Utc::now();
			sqlx::query("UPDATE users SET username = ?, email = ?, updated_at = ? WHERE id = ?")
				.bind(&user.username)
				.bind(&user.email)
				.bind(user.updated_at.to_rfc3339())
				.bind(id.get())
				.execute(&mut *tx)
				.await
				.map_err(|e| map_unique_violation(e, &format!("user '{}'", user.username)))?;
		}

		tx.commit().await?;
		Ok(Some(user))
	}

	#[tracing::instrument(skip(self, update))]
	async fn update_product(
		&self,
		id: ProductId,
		update: ProductUpdate,
	) -> Result<Option<Product>> {
		update.validate()?;
		let mut tx = self.pool.begin().await?;
		let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&mut *tx)
			.await?;
		let Some(mut product) = row.as_ref().map(product_from_row).transpose()? else {
			return Ok(None);
		};

		if update.apply(&mut product) {
			product.updated_at = Utc::now();
			sqlx::query(
				"UPDATE products SET name = ?, description = ?, price = ?, stock = ?, updated_at = ? WHERE id = ?",
			)
			.bind(&product.name)
			.bind(&product.description)
			.bind(product.price)
			.bind(product.stock)
			.bind(product.updated_at.to_rfc3339())
			.bind(id.get())
			.execute(&mut *tx)
			.await
			.map_err(|e| map_unique_violation(e, &format!("product '{}'", product.name)))?;
		}

		tx.commit().await?;
		Ok(Some(product))
	}

	#[tracing::instrument(skip(self))]
	async fn update_order(&self, id: OrderId, update: OrderUpdate) -> Result<Option<Order>> {
		let mut tx = self.pool.begin().await?;
		let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
			.bind(id.get())
			.fetch_optional(&mut *tx)
			.await?;
		let Some(mut order) = row.as_ref().map(order_from_row).transpose()? else {
			return Ok(None);
		};

		if update.apply(&mut order) {
			order.updated_at = Utc::now();
			sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
				.bind(order.status.as_str())
				.bind(order.updated_at.to_rfc3339())
				.bind(id.get())
				.execute(&mut *tx)
				.await?;
		}

		tx.commit().await?;
		Ok(Some(order))
	}

	#[tracing::instrument(skip(self))]
	async fn delete_order(&self, id: OrderId) -> Result<bool> {
		let result = sqlx::query("DELETE FROM orders WHERE id = ?")
			.bind(id.get())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}
