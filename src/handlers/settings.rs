// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;

use crate::{
    common::{error::AppError, extract::AppJson},
    config::AppState,
    models::settings::SettingsSaved,
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Documento de configurações ({} se nunca gravado)", body = Object)
    )
)]
pub async fn get_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.get().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings (POST é aceito como sinônimo)
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = Object,
    responses(
        (status = 200, description = "Configurações substituídas", body = SettingsSaved),
        (status = 400, description = "O corpo não é um objeto JSON")
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    AppJson(document): AppJson<Value>,
) -> Result<impl IntoResponse, AppError> {
    app_state.settings_service.set(document).await?;
    Ok((StatusCode::OK, Json(SettingsSaved { success: true })))
}
