// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::common::coerce;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "coerce::de_id")]
    pub id: String,

    #[serde(default, deserialize_with = "coerce::de_string")]
    #[schema(example = "Cemento 50kg")]
    pub name: String,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_decimal")]
    #[schema(example = 10.5)]
    pub price: Decimal,

    // Sempre >= 0: toda baixa é limitada em zero.
    #[serde(default, deserialize_with = "coerce::de_quantity")]
    #[schema(example = 25)]
    pub stock: i64,

    // Backend de arquivo guarda URL; o remoto embute a imagem em base64.
    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, deserialize_with = "coerce::de_opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Product {
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("The value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "The product name is required."))]
    #[schema(example = "Cemento 50kg")]
    pub name: String,

    pub description: Option<String>,

    // Aceita número ou texto numérico, como o formulário antigo mandava
    #[serde(default, deserialize_with = "coerce::de_decimal")]
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = f64, example = 10.5)]
    pub price: Decimal,

    #[serde(default)]
    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    #[schema(example = 25)]
    pub stock: i64,

    pub image_url: Option<String>,

    /// Imagem embutida como data URL (`data:image/png;base64,...`).
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "The product name cannot be empty."))]
    pub name: Option<String>,

    pub description: Option<String>,

    // Conferido no serviço (validate_not_negative não roda em Option)
    #[serde(default, deserialize_with = "coerce::de_opt_decimal")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock cannot be negative."))]
    pub stock: Option<i64>,

    pub image_url: Option<String>,

    pub image: Option<String>,

    /// Quando presente, só o estoque é ajustado (soma com limite em zero).
    pub stock_delta: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    /// Variação com sinal: positivo entra, negativo sai.
    #[schema(example = -3)]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_product_fields_are_coerced() {
        let product: Product = serde_json::from_value(json!({
            "id": "p1",
            "name": "Arena",
            "price": "12.5",
            "stock": "7",
            "imageBase64": "data:image/png;base64,AAAA"
        }))
        .unwrap();

        assert_eq!(product.price, Decimal::new(125, 1));
        assert_eq!(product.stock, 7);
        assert!(product.image_url.is_none());
        assert!(product.is_low_stock(10));
        assert!(!product.is_low_stock(7));
    }

    #[test]
    fn negative_price_is_rejected() {
        let payload: CreateProductPayload =
            serde_json::from_value(json!({"name": "x", "price": -1, "stock": 1})).unwrap();
        assert!(payload.validate().is_err());

        let payload: CreateProductPayload =
            serde_json::from_value(json!({"name": "x", "price": "0", "stock": 0})).unwrap();
        assert!(payload.validate().is_ok());
    }
}
