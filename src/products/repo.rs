use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::products::dto::{CreateProductRequest, UpdateProductRequest, DEFAULT_CATEGORY};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub category: String,
    pub sku: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Product {
    /// Every product, newest first. No pagination.
    pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, quantity, description, category, sku,
                   created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn create(db: &PgPool, fields: &CreateProductRequest) -> anyhow::Result<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, quantity, description, category, sku)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, price, quantity, description, category, sku,
                      created_at, updated_at
            "#,
        )
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.quantity)
        .bind(&fields.description)
        .bind(fields.category.as_deref().unwrap_or(DEFAULT_CATEGORY))
        .bind(&fields.sku)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    /// Merge the provided fields into an existing row and refresh
    /// `updated_at`. Returns None when no product has that id.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &UpdateProductRequest,
    ) -> anyhow::Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name        = COALESCE($2, name),
                price       = COALESCE($3, price),
                quantity    = COALESCE($4, quantity),
                description = COALESCE($5, description),
                category    = COALESCE($6, category),
                sku         = COALESCE($7, sku),
                updated_at  = now()
            WHERE id = $1
            RETURNING id, name, price, quantity, description, category, sku,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(changes.price)
        .bind(changes.quantity)
        .bind(&changes.description)
        .bind(&changes.category)
        .bind(&changes.sku)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    /// Returns false when no product had that id.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query_scalar::<_, Uuid>(
            r#"
            DELETE FROM products
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(deleted.is_some())
    }
}
