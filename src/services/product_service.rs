// src/services/product_service.rs

use std::cmp::Reverse;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{error::AppError, timestamps},
    db::{from_record, to_record, Collection, Record, RecordStore, WriteOp},
    models::product::{CreateProductPayload, Product, UpdateProductPayload},
    services::stock::STOCK_FIELD,
};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn RecordStore>,
    low_stock_threshold: i64,
}

impl ProductService {
    pub fn new(store: Arc<dyn RecordStore>, low_stock_threshold: i64) -> Self {
        Self { store, low_stock_threshold }
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let mut products = self.load_all().await?;
        products.sort_by_key(|p| {
            Reverse(p.created_at.as_deref().and_then(timestamps::parse_str))
        });
        Ok(products)
    }

    pub async fn low_stock(&self, threshold: Option<i64>) -> Result<Vec<Product>, AppError> {
        let threshold = threshold.unwrap_or(self.low_stock_threshold);
        let mut products: Vec<Product> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|p| p.is_low_stock(threshold))
            .collect();
        products.sort_by_key(|p| p.stock);
        Ok(products)
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, AppError> {
        let record = self
            .store
            .read_one(Collection::Products, id)
            .await?
            .ok_or_else(|| AppError::not_found("Product"))?;
        Ok(from_record(record)?)
    }

    async fn load_all(&self) -> Result<Vec<Product>, AppError> {
        let records = self.store.read_all(Collection::Products).await?;
        Ok(records
            .into_iter()
            .filter_map(|record| match from_record::<Product>(record) {
                Ok(product) => Some(product),
                Err(e) => {
                    tracing::warn!("Produto ilegível ignorado: {}", e);
                    None
                }
            })
            .collect())
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    pub async fn create_product(&self, payload: CreateProductPayload) -> Result<Product, AppError> {
        if payload.image_url.is_some() && payload.image.is_some() {
            return Err(AppError::BadRequest(
                "Send either imageUrl or image, not both.".to_string(),
            ));
        }

        let now = timestamps::now_iso();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: payload.name.trim().to_string(),
            description: payload.description,
            price: payload.price,
            stock: payload.stock,
            image_url: payload.image_url,
            image_base64: payload.image.map(as_data_url),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };

        self.store
            .apply(vec![WriteOp::Put { collection: Collection::Products, record: to_record(&product)? }])
            .await?;
        Ok(product)
    }

    /// `stockDelta` presente: só o estoque muda (soma atômica com limite em
    /// zero). Senão, mescla os campos enviados.
    pub async fn update_product(
        &self,
        id: &str,
        payload: UpdateProductPayload,
    ) -> Result<Product, AppError> {
        if let Some(delta) = payload.stock_delta {
            return self.adjust_stock(id, delta).await;
        }

        if payload.price.is_some_and(|p| p.is_sign_negative() && !p.is_zero()) {
            return Err(AppError::BadRequest("The price cannot be negative.".to_string()));
        }
        if payload.image_url.is_some() && payload.image.is_some() {
            return Err(AppError::BadRequest(
                "Send either imageUrl or image, not both.".to_string(),
            ));
        }

        // 404 antes de qualquer escrita
        self.get_product(id).await?;

        let mut patch = Record::new();
        if let Some(name) = payload.name {
            patch.insert("name".into(), name.trim().into());
        }
        if let Some(description) = payload.description {
            patch.insert("description".into(), description.into());
        }
        if let Some(price) = payload.price {
            patch.insert("price".into(), serde_json::to_value(price)?);
        }
        if let Some(stock) = payload.stock {
            patch.insert(STOCK_FIELD.into(), stock.into());
        }
        // Uma imagem nova substitui a outra forma de armazenamento
        if let Some(url) = payload.image_url {
            patch.insert("imageUrl".into(), url.into());
            patch.insert("imageBase64".into(), Value::Null);
        }
        if let Some(image) = payload.image {
            patch.insert("imageBase64".into(), as_data_url(image).into());
            patch.insert("imageUrl".into(), Value::Null);
        }
        patch.insert("updatedAt".into(), timestamps::now_iso().into());

        self.store
            .apply(vec![WriteOp::Merge { collection: Collection::Products, id: id.to_string(), patch }])
            .await?;
        self.get_product(id).await
    }

    pub async fn adjust_stock(&self, id: &str, delta: i64) -> Result<Product, AppError> {
        self.get_product(id).await?;
        self.store
            .apply(vec![WriteOp::AdjustCounter {
                collection: Collection::Products,
                id: id.to_string(),
                field: STOCK_FIELD,
                delta,
                updated_at: timestamps::now_iso(),
            }])
            .await?;
        self.get_product(id).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<Product, AppError> {
        let product = self.get_product(id).await?;
        self.store
            .apply(vec![WriteOp::Delete { collection: Collection::Products, id: id.to_string() }])
            .await?;
        Ok(product)
    }
}

/// Base64 puro vira data URL; uma data URL passa como está.
fn as_data_url(image: String) -> String {
    if image.starts_with("data:") {
        image
    } else {
        format!("data:image/png;base64,{}", image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonFileStore;
    use rust_decimal::Decimal;
    use serde_json::json;

    async fn service() -> (tempfile::TempDir, ProductService) {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        (dir, ProductService::new(store, 10))
    }

    fn create(name: &str, stock: i64) -> CreateProductPayload {
        serde_json::from_value(json!({"name": name, "price": "12.5", "stock": stock})).unwrap()
    }

    #[tokio::test]
    async fn create_stamps_and_stores_data_url() {
        let (_dir, service) = service().await;
        let mut payload = create("Cemento", 4);
        payload.image = Some("AAAA".to_string());

        let product = service.create_product(payload).await.unwrap();

        assert_eq!(product.price, Decimal::new(125, 1));
        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.image_base64.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(service.get_product(&product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn both_image_forms_are_rejected() {
        let (_dir, service) = service().await;
        let mut payload = create("Cemento", 4);
        payload.image = Some("data:image/png;base64,AAAA".to_string());
        payload.image_url = Some("/uploads/x.png".to_string());

        assert!(matches!(service.create_product(payload).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn stock_delta_is_clamped_at_zero() {
        let (_dir, service) = service().await;
        let product = service.create_product(create("Arena", 3)).await.unwrap();

        let patch = UpdateProductPayload { stock_delta: Some(-7), ..Default::default() };
        let updated = service.update_product(&product.id, patch).await.unwrap();
        assert_eq!(updated.stock, 0);

        let updated = service.adjust_stock(&product.id, 5).await.unwrap();
        assert_eq!(updated.stock, 5);
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_created_at() {
        let (_dir, service) = service().await;
        let product = service.create_product(create("Arena", 3)).await.unwrap();

        let patch = UpdateProductPayload {
            name: Some("Arena fina".into()),
            price: Some(Decimal::from(20)),
            ..Default::default()
        };
        let updated = service.update_product(&product.id, patch).await.unwrap();

        assert_eq!(updated.name, "Arena fina");
        assert_eq!(updated.price, Decimal::from(20));
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.created_at, product.created_at);
    }

    #[tokio::test]
    async fn negative_price_update_is_rejected() {
        let (_dir, service) = service().await;
        let product = service.create_product(create("Arena", 3)).await.unwrap();
        let patch = UpdateProductPayload { price: Some(Decimal::from(-1)), ..Default::default() };
        assert!(matches!(
            service.update_product(&product.id, patch).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn low_stock_uses_configured_threshold() {
        let (_dir, service) = service().await;
        service.create_product(create("Pouco", 2)).await.unwrap();
        service.create_product(create("Muito", 50)).await.unwrap();

        let low = service.low_stock(None).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Pouco");
        assert_eq!(service.low_stock(Some(100)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_returns_the_removed_product() {
        let (_dir, service) = service().await;
        let product = service.create_product(create("Arena", 3)).await.unwrap();

        let removed = service.delete_product(&product.id).await.unwrap();

        assert_eq!(removed.id, product.id);
        assert!(matches!(service.get_product(&product.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete_product(&product.id).await, Err(AppError::NotFound(_))));
    }
}
