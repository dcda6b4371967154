// src/models/sale.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::{customer::Customer, product::Product},
};

// --- Enums ---

/// Só existe o "vai e volta" pending <-> completed. `Cancelled` está no
/// modelo mas nenhuma operação leva uma venda até ele.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl SaleStatus {
    /// Lê o status persistido. Vendas antigas não têm o campo: pendentes.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("completed") => SaleStatus::Completed,
            Some("cancelled") => SaleStatus::Cancelled,
            _ => SaleStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    pub fn toggled(self) -> Result<Self, AppError> {
        match self {
            SaleStatus::Pending => Ok(SaleStatus::Completed),
            SaleStatus::Completed => Ok(SaleStatus::Pending),
            SaleStatus::Cancelled => Err(AppError::BadRequest(
                "A cancelled sale cannot change status.".to_string(),
            )),
        }
    }
}

// --- Item de venda (forma canônica, a que é persistida) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[schema(example = "7f1c2a9e-1b7c-4a39-9d0e-3f7d2b8c5a11")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,

    #[schema(example = 3)]
    pub quantity: i64,

    /// Preço unitário no momento da venda.
    #[schema(value_type = f64, example = 10.0)]
    pub price: Decimal,
}

impl LineItem {
    /// `None` quando preço x quantidade estoura o `Decimal`.
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    /// Para exibição: no estouro fica no limite do tipo.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

// --- Visões enriquecidas (só leitura, nunca persistidas) ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DeletedProduct {
    #[schema(example = "[Deleted product]")]
    pub name: String,
    pub description: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProductView {
    Known(Product),
    Deleted(DeletedProduct),
}

impl ProductView {
    pub fn is_deleted(&self) -> bool {
        matches!(self, ProductView::Deleted(_))
    }

    pub fn name(&self) -> &str {
        match self {
            ProductView::Known(product) => &product.name,
            ProductView::Deleted(placeholder) => &placeholder.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UnknownCustomer {
    #[schema(example = "Unknown customer")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum CustomerView {
    Known(Customer),
    Unknown(UnknownCustomer),
}

impl CustomerView {
    pub fn name(&self) -> &str {
        match self {
            CustomerView::Known(customer) => &customer.name,
            CustomerView::Unknown(placeholder) => &placeholder.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedLineItem {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub quantity: i64,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = f64)]
    pub subtotal: Decimal,
    pub product: ProductView,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub customer: CustomerView,
    pub items: Vec<EnrichedLineItem>,
    /// Sempre recalculado a partir dos itens exibidos.
    #[schema(value_type = f64, example = 30.0)]
    pub total: Decimal,
    pub status: SaleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    #[validate(
        required(message = "A customer must be selected for the sale."),
        length(min = 1, message = "A customer must be selected for the sale.")
    )]
    #[schema(example = "c0a8012e-0000-4000-8000-000000000001")]
    pub client_id: Option<String>,

    // O formulário antigo manda `products`; o novo, `items`.
    #[serde(default, alias = "products")]
    pub items: Vec<Value>,

    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub status: Option<SaleStatus>,

    pub notes: Option<String>,

    #[validate(length(min = 1, message = "The customer id cannot be empty."))]
    pub client_id: Option<String>,

    #[serde(default, alias = "products")]
    pub items: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SoftDeletePayload {
    #[validate(length(min = 1, message = "At least one sale id is required."))]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoftDeleteResult {
    #[schema(example = 2)]
    pub deleted: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSalesQuery {
    #[serde(default)]
    pub include_deleted: bool,
}
