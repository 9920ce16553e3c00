use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    products::{
        dto::{CreateProductRequest, DeleteResponse, ProductResponse, UpdateProductRequest},
        repo::Product,
    },
    state::AppState,
};

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = Product::list(&state.db).await?;
    tracing::debug!(user_id = %user_id, count = products.len(), "products listed");
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    // Field validation stays client-side; the store's column constraints
    // are the only server-side gate.
    let product = Product::create(&state.db, &payload).await?;
    info!(product_id = %product.id, user_id = %user_id, "product created");
    Ok((StatusCode::CREATED, Json(product.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = Product::update(&state.db, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;
    info!(product_id = %product.id, user_id = %user_id, "product updated");
    Ok(Json(product.into()))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product"));
    }
    info!(product_id = %id, user_id = %user_id, "product deleted");
    Ok(Json(DeleteResponse {
        message: "Product deleted".into(),
    }))
}
