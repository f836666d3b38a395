//! Product catalog contracts and SQLite implementation.
//!
//! # Responsibility
//! - Supply the active catalog (`id`, `name`) consumed by sales reconciliation.
//! - Provide the small create/list/deactivate surface the operator needs.
//!
//! # Invariants
//! - `list_active` never returns inactive products or duplicate ids.
//! - `list_inactive_ids` is the complement of `list_active` within the catalog.
//! - Products are deactivated, never deleted, because sales rows reference them.

use crate::model::product::{BusinessImportance, NewProduct, Product, ProductId, ProductRecord};
use crate::repo::schema_check::ensure_table;
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    category,
    business_importance,
    active
FROM products";

/// Read-only access to the active product catalog.
pub trait ProductCatalog {
    /// Returns active products ordered by name, then id.
    fn list_active(&self) -> RepoResult<Vec<Product>>;

    /// Ids of deactivated products, ascending.
    ///
    /// Catalogs without deactivation report none.
    fn list_inactive_ids(&self) -> RepoResult<Vec<ProductId>> {
        Ok(Vec::new())
    }
}

impl<T: ProductCatalog + ?Sized> ProductCatalog for &T {
    fn list_active(&self) -> RepoResult<Vec<Product>> {
        (**self).list_active()
    }

    fn list_inactive_ids(&self) -> RepoResult<Vec<ProductId>> {
        (**self).list_inactive_ids()
    }
}

/// Catalog management operations.
pub trait ProductRepository: ProductCatalog {
    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductRecord>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<ProductRecord>>;
    fn list_products(&self, include_inactive: bool) -> RepoResult<Vec<ProductRecord>>;
    fn deactivate_product(&self, id: ProductId) -> RepoResult<()>;
    fn count_active(&self) -> RepoResult<u32>;
}

/// SQLite-backed product catalog.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table(
            conn,
            "products",
            &["id", "name", "category", "business_importance", "active"],
        )?;
        Ok(Self { conn })
    }
}

impl ProductCatalog for SqliteProductRepository<'_> {
    fn list_active(&self) -> RepoResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name
             FROM products
             WHERE active = 1
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(Product {
                id: row.get("id")?,
                name: row.get("name")?,
            });
        }
        Ok(products)
    }

    fn list_inactive_ids(&self) -> RepoResult<Vec<ProductId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM products WHERE active = 0 ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get("id")?);
        }
        Ok(ids)
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductRecord> {
        let product = product.normalized()?;

        self.conn.execute(
            "INSERT INTO products (name, category, business_importance, active)
             VALUES (?1, ?2, ?3, 1);",
            params![
                product.name.as_str(),
                product.category.as_deref(),
                product.importance.as_str(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("event=product_create module=repo status=ok product_id={id}");

        Ok(ProductRecord {
            id,
            name: product.name,
            category: product.category,
            importance: product.importance,
            active: true,
        })
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<ProductRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self, include_inactive: bool) -> RepoResult<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PRODUCT_SELECT_SQL}
             WHERE (?1 = 1 OR active = 1)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([i64::from(include_inactive)])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn deactivate_product(&self, id: ProductId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("UPDATE products SET active = 0 WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=product_deactivate module=repo status=ok product_id={id}");
        Ok(())
    }

    fn count_active(&self) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE active = 1;",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<ProductRecord> {
    let importance_text: String = row.get("business_importance")?;
    let importance = BusinessImportance::parse(&importance_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid importance `{importance_text}` in products.business_importance"
        ))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in products.active"
            )));
        }
    };

    Ok(ProductRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        importance,
        active,
    })
}
