// src/models/settings.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Nome do documento de configurações no RecordStore.
pub const SETTINGS_DOCUMENT: &str = "settings";

// As configurações são um documento livre (ex: { "businessName": "..." }),
// lido e gravado por inteiro. Só a chave usada no recibo tem nome aqui.
pub const BUSINESS_NAME_KEY: &str = "businessName";

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsSaved {
    #[schema(example = true)]
    pub success: bool,
}
