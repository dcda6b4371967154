// src/services/stock.rs

//! Baixa de estoque na criação de uma venda.

use std::collections::BTreeMap;

use crate::{
    db::{Collection, WriteOp},
    models::sale::LineItem,
    services::enrichment::Catalog,
};

pub const STOCK_FIELD: &str = "stock";

/// Quantidade a baixar por produto, já somada quando o mesmo produto
/// aparece em mais de um item.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StockPlan {
    decrements: BTreeMap<String, i64>,
}

impl StockPlan {
    pub fn for_items(items: &[LineItem], catalog: &Catalog) -> Self {
        let mut decrements: BTreeMap<String, i64> = BTreeMap::new();

        for item in items {
            let Some(product_id) = item.product_id.as_deref() else {
                continue;
            };
            if item.quantity == 0 {
                continue;
            }
            if catalog.product(product_id).is_none() {
                // Produto apagado depois que o formulário foi montado
                tracing::debug!("Baixa de estoque ignorada: produto {} não existe", product_id);
                continue;
            }
            let entry = decrements.entry(product_id.to_string()).or_default();
            *entry = entry.saturating_add(item.quantity);
        }

        Self { decrements }
    }

    pub fn is_empty(&self) -> bool {
        self.decrements.is_empty()
    }

    pub fn quantity_for(&self, product_id: &str) -> Option<i64> {
        self.decrements.get(product_id).copied()
    }

    /// Uma operação por produto; o limite em zero fica com o store.
    pub fn into_ops(self, updated_at: &str) -> Vec<WriteOp> {
        self.decrements
            .into_iter()
            .map(|(id, quantity)| WriteOp::AdjustCounter {
                collection: Collection::Products,
                id,
                field: STOCK_FIELD,
                delta: -quantity,
                updated_at: updated_at.to_string(),
            })
            .collect()
    }
}
