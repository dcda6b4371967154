// src/services/settings_service.rs

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::settings::{BUSINESS_NAME_KEY, SETTINGS_DOCUMENT},
};

/// Documento livre de configurações, lido e gravado por inteiro.
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn RecordStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Nunca gravado: objeto vazio.
    pub async fn get(&self) -> Result<Value, AppError> {
        Ok(self
            .store
            .read_document(SETTINGS_DOCUMENT)
            .await?
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    pub async fn set(&self, document: Value) -> Result<(), AppError> {
        if !document.is_object() {
            return Err(AppError::BadRequest("Settings must be a JSON object.".to_string()));
        }
        self.store.write_document(SETTINGS_DOCUMENT, document).await
    }

    pub async fn business_name(&self) -> Result<Option<String>, AppError> {
        let settings = self.get().await?;
        Ok(settings
            .get(BUSINESS_NAME_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonFileStore;
    use serde_json::json;

    #[tokio::test]
    async fn settings_are_replaced_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        let service = SettingsService::new(store);

        assert_eq!(service.get().await.unwrap(), json!({}));
        assert_eq!(service.business_name().await.unwrap(), None);

        service.set(json!({"businessName": "Corralón", "phone": "123"})).await.unwrap();
        service.set(json!({"businessName": "Corralón Norte"})).await.unwrap();

        assert_eq!(service.get().await.unwrap(), json!({"businessName": "Corralón Norte"}));
        assert_eq!(service.business_name().await.unwrap().as_deref(), Some("Corralón Norte"));
        assert!(matches!(service.set(json!([1, 2])).await, Err(AppError::BadRequest(_))));
    }
}
