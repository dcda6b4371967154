// src/handlers/sales.rs

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
    models::sale::{
        CreateSalePayload, ListSalesQuery, SaleView, SoftDeletePayload, SoftDeleteResult,
        UpdateSalePayload,
    },
};

// GET /api/sales
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    params(
        ("includeDeleted" = Option<bool>, Query, description = "Inclui vendas marcadas como excluídas")
    ),
    responses(
        (status = 200, description = "Vendas enriquecidas, mais recentes primeiro", body = Vec<SaleView>)
    )
)]
pub async fn list_sales(
    State(app_state): State<AppState>,
    AppQuery(query): AppQuery<ListSalesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let sales = app_state.sale_service.list_sales(query.include_deleted).await?;
    Ok((StatusCode::OK, Json(sales)))
}

// POST /api/sales
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = CreateSalePayload,
    responses(
        (status = 201, description = "Venda criada e estoque baixado", body = SaleView),
        (status = 400, description = "Cliente não informado")
    )
)]
pub async fn create_sale(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<CreateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    // Nada é gravado antes da validação
    payload.validate()?;

    let sale = app_state.sale_service.create_sale(payload).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

// GET /api/sales/{id}
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda enriquecida", body = SaleView),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn get_sale(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sale_service.get_sale(&id).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// PATCH /api/sales/{id}
#[utoipa::path(
    patch,
    path = "/api/sales/{id}",
    tag = "Sales",
    request_body = UpdateSalePayload,
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Venda atualizada", body = SaleView),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn update_sale(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateSalePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sale = app_state.sale_service.update_sale(&id, payload).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales/{id}/toggle-status
#[utoipa::path(
    post,
    path = "/api/sales/{id}/toggle-status",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Status alternado entre pending e completed", body = SaleView),
        (status = 400, description = "Venda cancelada"),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn toggle_status(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sale_service.toggle_status(&id).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// DELETE /api/sales/{id}
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 204, description = "Venda removida"),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn delete_sale(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sale_service.delete_sale(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/sales
#[utoipa::path(
    delete,
    path = "/api/sales",
    tag = "Sales",
    request_body = SoftDeletePayload,
    responses(
        (status = 200, description = "Vendas marcadas como excluídas", body = SoftDeleteResult)
    )
)]
pub async fn soft_delete_sales(
    State(app_state): State<AppState>,
    AppJson(payload): AppJson<SoftDeletePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let deleted = app_state.sale_service.soft_delete(&payload.ids).await?;
    Ok((StatusCode::OK, Json(SoftDeleteResult { deleted })))
}
