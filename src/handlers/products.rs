// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        extract::{AppJson, AppQuery},
    },
    config::AppState,
    models::product::{
        AdjustStockPayload, CreateProductPayload, LowStockQuery, Product, UpdateProductPayload,
    },
};

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses(
        (status = 200, description = "Produtos, mais recentes primeiro", body = Vec<Product>)
    )
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

// GET /api/products/low-stock
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    tag = "Products",
    params(
        ("threshold" = Option<i64>, Query, description = "Limite; padrão vem da configuração")
    ),
    responses(
        (status = 200, description = "Produtos com estoque abaixo do limite", body = Vec<Product>)
    )
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<LowStockQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.low_stock(query.threshold).await?;
    Ok((StatusCode::OK, Json(products)))
}

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get_product(&id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/products/{id}
#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = UpdateProductPayload,
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.update_product(&id, payload).await?;
    Ok((StatusCode::OK, Json(product)))
}

// POST /api/products/{id}/stock
#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    tag = "Products",
    request_body = AdjustStockPayload,
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Estoque ajustado (nunca abaixo de zero)", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.adjust_stock(&id, payload.quantity).await?;
    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.delete_product(&id).await?;
    Ok((StatusCode::OK, Json(product)))
}
