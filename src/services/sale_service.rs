// src/services/sale_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{error::AppError, timestamps},
    db::{record_id, to_record, Collection, Record, RecordStore, WriteOp},
    models::sale::{CreateSalePayload, LineItem, SaleStatus, SaleView, UpdateSalePayload},
    services::{
        enrichment::{enrich_sale, sale_total, sort_newest_first, Catalog, UnresolvedProducts},
        normalizer::{normalize_items, normalize_sale, ItemsField},
        stock::StockPlan,
    },
};

/// Forma persistida de uma venda recém-criada.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewSale<'a> {
    id: String,
    client_id: &'a str,
    items: Value,
    total: Decimal,
    status: SaleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    date: &'a str,
    created_at: &'a str,
    updated_at: &'a str,
}

#[derive(Clone)]
pub struct SaleService {
    store: Arc<dyn RecordStore>,
}

impl SaleService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn load_catalog(&self) -> Result<Catalog, AppError> {
        let (customers, products) = tokio::try_join!(
            self.store.read_all(Collection::Customers),
            self.store.read_all(Collection::Products),
        )?;
        Ok(Catalog::from_records(customers, products))
    }

    // =========================================================================
    //  LEITURA
    // =========================================================================

    pub async fn list_sales(&self, include_deleted: bool) -> Result<Vec<SaleView>, AppError> {
        let (sales, catalog) =
            tokio::try_join!(self.store.read_all(Collection::Sales), self.load_catalog())?;

        let mut repairs = Vec::new();
        let mut views = Vec::with_capacity(sales.len());

        for sale in &sales {
            let Some(id) = record_id(sale) else {
                tracing::warn!("Venda sem id ignorada na listagem");
                continue;
            };

            let normalized = normalize_sale(sale);
            repairs.extend(normalized.repair_op(&id));

            if !include_deleted && is_soft_deleted(sale) {
                continue;
            }

            let view = enrich_sale(sale, &normalized, &catalog, UnresolvedProducts::Placeholder);
            // Venda que tinha itens mas nenhum aproveitável não aparece na lista
            if !normalized.items.is_empty() && view.items.is_empty() {
                continue;
            }
            views.push(view);
        }

        // Todas as correções de id numa única escrita. Cada uma só vale se os
        // itens não mudaram desde a leitura; se mudaram, a próxima leitura corrige.
        if !repairs.is_empty() {
            tracing::info!("Gravando ids gerados para itens de {} venda(s)", repairs.len());
            self.store.apply(repairs).await?;
        }

        sort_newest_first(&mut views);
        Ok(views)
    }

    pub async fn get_sale(&self, id: &str) -> Result<SaleView, AppError> {
        self.get_sale_with(id, UnresolvedProducts::Drop).await
    }

    pub async fn get_sale_with(
        &self,
        id: &str,
        policy: UnresolvedProducts,
    ) -> Result<SaleView, AppError> {
        let sale = self
            .store
            .read_one(Collection::Sales, id)
            .await?
            .ok_or_else(|| AppError::not_found("Sale"))?;

        let normalized = normalize_sale(&sale);
        if let Some(repair) = normalized.repair_op(id) {
            tracing::info!("Gravando ids gerados para itens da venda {}", id);
            self.store.apply(vec![repair]).await?;
        }

        let catalog = self.load_catalog().await?;
        Ok(enrich_sale(&sale, &normalized, &catalog, policy))
    }

    // =========================================================================
    //  ESCRITA
    // =========================================================================

    /// Grava a venda e a baixa de estoque no mesmo lote: ou as duas
    /// acontecem, ou nenhuma.
    pub async fn create_sale(&self, payload: CreateSalePayload) -> Result<SaleView, AppError> {
        let client_id = payload
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::BadRequest("A customer must be selected for the sale.".to_string())
            })?;

        let normalized = normalize_items(&payload.items);
        let items = &normalized.items;
        let total = checked_total(items)?;
        let catalog = self.load_catalog().await?;
        let now = timestamps::now_iso();

        let sale = NewSale {
            id: Uuid::new_v4().to_string(),
            client_id,
            items: normalized.stored_items(),
            total,
            status: SaleStatus::Pending,
            notes: payload.notes.as_deref(),
            date: &now,
            created_at: &now,
            updated_at: &now,
        };
        let record = to_record(&sale)?;
        let id = sale.id;

        let mut batch = vec![WriteOp::Put { collection: Collection::Sales, record }];
        batch.extend(StockPlan::for_items(items, &catalog).into_ops(&now));
        self.store.apply(batch).await?;

        tracing::info!("Venda {} criada com {} item(ns)", id, items.len());
        self.get_sale_with(&id, UnresolvedProducts::Placeholder).await
    }

    pub async fn update_sale(
        &self,
        id: &str,
        payload: UpdateSalePayload,
    ) -> Result<SaleView, AppError> {
        let existing = self
            .store
            .read_one(Collection::Sales, id)
            .await?
            .ok_or_else(|| AppError::not_found("Sale"))?;

        let mut patch = Record::new();
        if let Some(status) = payload.status {
            patch.insert("status".into(), status.as_str().into());
        }
        if let Some(notes) = payload.notes {
            patch.insert("notes".into(), notes.into());
        }
        if let Some(client_id) = payload.client_id {
            patch.insert("clientId".into(), client_id.into());
        }
        if let Some(raw_items) = payload.items {
            let normalized = normalize_items(&raw_items);
            let total = checked_total(&normalized.items)?;
            // Mantém o campo que a venda já usava
            let field = ItemsField::detect(&existing);
            patch.insert(field.key().into(), normalized.stored_items());
            patch.insert("total".into(), serde_json::to_value(total)?);
        }
        patch.insert("updatedAt".into(), timestamps::now_iso().into());

        self.store
            .apply(vec![WriteOp::Merge { collection: Collection::Sales, id: id.to_string(), patch }])
            .await?;

        self.get_sale(id).await
    }

    pub async fn toggle_status(&self, id: &str) -> Result<SaleView, AppError> {
        let existing = self
            .store
            .read_one(Collection::Sales, id)
            .await?
            .ok_or_else(|| AppError::not_found("Sale"))?;

        let next = SaleStatus::from_value(existing.get("status")).toggled()?;

        let mut patch = Record::new();
        patch.insert("status".into(), next.as_str().into());
        patch.insert("updatedAt".into(), timestamps::now_iso().into());
        self.store
            .apply(vec![WriteOp::Merge { collection: Collection::Sales, id: id.to_string(), patch }])
            .await?;

        self.get_sale(id).await
    }

    pub async fn delete_sale(&self, id: &str) -> Result<(), AppError> {
        if self.store.read_one(Collection::Sales, id).await?.is_none() {
            return Err(AppError::not_found("Sale"));
        }
        self.store
            .apply(vec![WriteOp::Delete { collection: Collection::Sales, id: id.to_string() }])
            .await
    }

    /// Marca `deletedAt` nas vendas existentes; ids desconhecidos são ignorados.
    pub async fn soft_delete(&self, ids: &[String]) -> Result<usize, AppError> {
        let sales = self.store.read_all(Collection::Sales).await?;
        let existing: HashSet<String> = sales.iter().filter_map(record_id).collect();

        let now = timestamps::now_iso();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut batch = Vec::new();
        for id in ids {
            if !existing.contains(id) || !seen.insert(id) {
                continue;
            }
            let mut patch = Record::new();
            patch.insert("deletedAt".into(), now.clone().into());
            patch.insert("updatedAt".into(), now.clone().into());
            batch.push(WriteOp::Merge { collection: Collection::Sales, id: id.clone(), patch });
        }

        let deleted = batch.len();
        self.store.apply(batch).await?;
        tracing::info!("{} venda(s) marcadas como excluídas", deleted);
        Ok(deleted)
    }
}

fn checked_total(items: &[LineItem]) -> Result<Decimal, AppError> {
    sale_total(items)
        .ok_or_else(|| AppError::BadRequest("The sale total is too large.".to_string()))
}

fn is_soft_deleted(sale: &Record) -> bool {
    sale.get("deletedAt").is_some_and(|v| !v.is_null())
}
