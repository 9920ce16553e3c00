use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::products::repo::Product;

/// Quantity below which a product counts as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 10;

/// Category applied when the client omits one.
pub const DEFAULT_CATEGORY: &str = "electronics";

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
}

/// Partial update; absent fields keep their stored values.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub sku: Option<String>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.sku.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Active,
    Low,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Active => "active",
            StockStatus::Low => "low",
        }
    }

    pub fn for_quantity(quantity: i32) -> Self {
        if quantity < LOW_STOCK_THRESHOLD {
            StockStatus::Low
        } else {
            StockStatus::Active
        }
    }
}

/// Product as it goes over the wire, with the derived fields attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub category: String,
    pub sku: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub status: StockStatus,
    pub total_value: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let status = StockStatus::for_quantity(p.quantity);
        let total_value = round_cents(p.price * p.quantity as f64);
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
            quantity: p.quantity,
            description: p.description,
            category: p.category,
            sku: p.sku,
            created_at: p.created_at,
            updated_at: p.updated_at,
            status,
            total_value,
        }
    }
}
