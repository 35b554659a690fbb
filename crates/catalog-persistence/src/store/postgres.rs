//! PostgreSQL record store implementation.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Connection, Row};

use super::{StoreConnection, StoreConnector};
use crate::error::Result;
use catalog_domain::{NewProduct, Product, ProductId};

const SELECT_PRODUCTS: &str =
    "SELECT id::int8 AS id, name, category, price::float8 AS price FROM products";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// PostgreSQL connection configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "postgres".to_string(),
            port: 5432,
            database: "ecommerce".to_string(),
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

// =============================================================================
// CONNECTOR
// =============================================================================

/// Opens one unpooled `PgConnection` per call.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.username)
            .password(&config.password);

        Self { options }
    }
}

#[async_trait]
impl StoreConnector for PgConnector {
    async fn open(&self) -> Result<Box<dyn StoreConnection>> {
        let conn = PgConnection::connect_with(&self.options).await?;
        Ok(Box::new(PgStoreConnection {
            conn,
            in_transaction: false,
        }))
    }
}

// =============================================================================
// CONNECTION
// =============================================================================

struct PgStoreConnection {
    conn: PgConnection,
    in_transaction: bool,
}

fn product_from_row(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
    })
}

#[async_trait]
impl StoreConnection for PgStoreConnection {
    async fn fetch_products(&mut self) -> Result<Vec<Product>> {
        let rows = sqlx::query(SELECT_PRODUCTS).fetch_all(&mut self.conn).await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn fetch_product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let query = format!("{SELECT_PRODUCTS} WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&mut self.conn)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn fetch_by_category(&mut self, category: &str) -> Result<Vec<Product>> {
        let query = format!("{SELECT_PRODUCTS} WHERE category = $1");
        let rows = sqlx::query(&query)
            .bind(category)
            .fetch_all(&mut self.conn)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn insert_product(&mut self, product: &NewProduct) -> Result<ProductId> {
        if !self.in_transaction {
            sqlx::query("BEGIN").execute(&mut self.conn).await?;
            self.in_transaction = true;
        }

        let row = sqlx::query(
            "INSERT INTO products (name, category, price) VALUES ($1, $2, $3) RETURNING id::int8 AS id",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .fetch_one(&mut self.conn)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn commit(&mut self) -> Result<()> {
        if self.in_transaction {
            sqlx::query("COMMIT").execute(&mut self.conn).await?;
            self.in_transaction = false;
        }
        Ok(())
    }

    async fn ping(&mut self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&mut self.conn).await?;
        Ok(())
    }

    async fn close(self: Box<Self>) {
        let this = *self;
        if this.in_transaction {
            tracing::debug!("Closing connection with uncommitted transaction");
        }
        if let Err(e) = this.conn.close().await {
            tracing::warn!(error = %e, "Failed to close record store connection cleanly");
        }
    }
}
