// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::AppError,
    config::AppState,
    services::{
        document_service::receipt_file_name,
        enrichment::UnresolvedProducts,
    },
};

// GET /api/sales/{id}/receipt
#[utoipa::path(
    get,
    path = "/api/sales/{id}/receipt",
    tag = "Sales",
    params(("id" = String, Path, description = "ID da venda")),
    responses(
        (status = 200, description = "Recibo (venda concluída) ou remito em PDF (application/pdf)"),
        (status = 404, description = "Venda não encontrada")
    )
)]
pub async fn sale_receipt(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    // Produtos apagados aparecem no recibo com o marcador
    let sale = app_state
        .sale_service
        .get_sale_with(&id, UnresolvedProducts::Placeholder)
        .await?;
    let business_name = app_state.settings_service.business_name().await?;

    let pdf_bytes = app_state
        .document_service
        .render_receipt(&sale, business_name.as_deref())?;

    // Configura os Headers para o navegador baixar ou mostrar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", receipt_file_name(&sale)),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
