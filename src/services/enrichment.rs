// src/services/enrichment.rs

//! Junta cliente e produtos a uma venda e recalcula o total.
//!
//! Referências quebradas (cliente ou produto apagado depois da venda) nunca
//! são erro: viram um marcador no lugar do registro.

use std::cmp::Reverse;
use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    common::{coerce, timestamps},
    db::{from_record, Record},
    models::{
        customer::Customer,
        product::Product,
        sale::{
            CustomerView, DeletedProduct, EnrichedLineItem, LineItem, ProductView, SaleStatus,
            SaleView, UnknownCustomer,
        },
    },
    services::normalizer::NormalizedItems,
};

pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";
pub const DELETED_PRODUCT: &str = "[Deleted product]";

/// O que fazer com um item cujo produto não existe mais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedProducts {
    /// Mantém o item com o produto marcado como apagado (listagens, criação).
    Placeholder,
    /// Remove o item da visão (venda individual).
    Drop,
}

/// Clientes e produtos indexados por id, lidos uma vez por requisição.
#[derive(Debug, Default)]
pub struct Catalog {
    customers: HashMap<String, Customer>,
    products: HashMap<String, Product>,
}

impl Catalog {
    pub fn from_records(customers: Vec<Record>, products: Vec<Record>) -> Self {
        Self {
            customers: index(customers, |c: &Customer| c.id.clone()),
            products: index(products, |p: &Product| p.id.clone()),
        }
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }
}

fn index<T, F>(records: Vec<Record>, key: F) -> HashMap<String, T>
where
    T: serde::de::DeserializeOwned,
    F: Fn(&T) -> String,
{
    records
        .into_iter()
        .filter_map(|record| match from_record::<T>(record) {
            Ok(entity) => Some((key(&entity), entity)),
            Err(e) => {
                tracing::warn!("Registro ignorado na junção: {}", e);
                None
            }
        })
        .collect()
}

/// Total exato da venda; `None` se a soma (ou algum subtotal) estourar.
pub fn sale_total(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.checked_subtotal()?))
}

pub fn enrich_sale(
    sale: &Record,
    normalized: &NormalizedItems,
    catalog: &Catalog,
    policy: UnresolvedProducts,
) -> SaleView {
    let client_id = coerce::to_id(sale.get("clientId"));
    let customer = client_id
        .as_deref()
        .and_then(|id| catalog.customer(id))
        .map(|c| CustomerView::Known(c.clone()))
        .unwrap_or_else(|| {
            CustomerView::Unknown(UnknownCustomer { name: UNKNOWN_CUSTOMER.to_string() })
        });

    let items: Vec<EnrichedLineItem> = normalized
        .items
        .iter()
        .filter_map(|item| enrich_item(item, catalog, policy))
        .collect();

    // O total persistido pode estar defasado; vale o dos itens exibidos.
    let total = items
        .iter()
        .try_fold(Decimal::ZERO, |acc, i| acc.checked_add(i.subtotal))
        .unwrap_or_else(|| {
            tracing::warn!("Total da venda {:?} estoura o limite numérico", sale.get("id"));
            items.iter().fold(Decimal::ZERO, |acc, i| acc.saturating_add(i.subtotal))
        });

    SaleView {
        id: coerce::to_id(sale.get("id")).unwrap_or_default(),
        client_id,
        customer,
        items,
        total,
        status: SaleStatus::from_value(sale.get("status")),
        notes: text(sale, "notes"),
        date: text(sale, "date"),
        created_at: text(sale, "createdAt"),
        updated_at: text(sale, "updatedAt"),
        deleted_at: text(sale, "deletedAt"),
    }
}

fn enrich_item(
    item: &LineItem,
    catalog: &Catalog,
    policy: UnresolvedProducts,
) -> Option<EnrichedLineItem> {
    // Sem productId não há o que juntar: fica fora da visão (mas não do registro)
    let product_id = item.product_id.as_deref()?;

    let product = match (catalog.product(product_id), policy) {
        (Some(product), _) => ProductView::Known(product.clone()),
        (None, UnresolvedProducts::Placeholder) => ProductView::Deleted(DeletedProduct {
            name: DELETED_PRODUCT.to_string(),
            description: String::new(),
            deleted: true,
        }),
        (None, UnresolvedProducts::Drop) => return None,
    };

    Some(EnrichedLineItem {
        id: item.id.clone(),
        product_id: item.product_id.clone(),
        quantity: item.quantity,
        price: item.price,
        subtotal: item.subtotal(),
        product,
    })
}

fn text(record: &Record, key: &str) -> Option<String> {
    record.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// Mais recentes primeiro. Usa `createdAt`, ou `date` nos registros antigos;
/// sem data válida vai para o fim.
pub fn sort_newest_first(sales: &mut [SaleView]) {
    sales.sort_by_key(|sale| {
        let stamp = sale
            .created_at
            .as_deref()
            .or(sale.date.as_deref())
            .and_then(timestamps::parse_str);
        Reverse(stamp)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalizer::normalize_sale;
    use serde_json::{json, Value};

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_records(
            vec![rec(json!({"id": "c1", "name": "Ana"}))],
            vec![
                rec(json!({"id": "P1", "name": "Cemento", "price": 10, "stock": 5})),
                rec(json!({"id": "P2", "name": "Arena", "price": "3.5", "stock": 1})),
            ],
        )
    }

    fn enrich(sale: Value, policy: UnresolvedProducts) -> SaleView {
        let sale = rec(sale);
        let normalized = normalize_sale(&sale);
        enrich_sale(&sale, &normalized, &catalog(), policy)
    }

    #[test]
    fn total_is_recomputed_from_items() {
        let view = enrich(
            json!({
                "id": "s1",
                "clientId": "c1",
                "total": 999,
                "items": [
                    {"id": "a", "productId": "P1", "quantity": 3, "price": 10},
                    {"id": "b", "productId": "P2", "quantity": 2, "unitPrice": "1.25"}
                ]
            }),
            UnresolvedProducts::Placeholder,
        );

        assert_eq!(view.total, Decimal::new(325, 1));
        assert_eq!(view.items[1].subtotal, Decimal::new(25, 1));
        assert_eq!(view.customer.name(), "Ana");
    }

    #[test]
    fn dangling_customer_gets_placeholder() {
        let view = enrich(json!({"id": "s1", "clientId": "gone", "items": []}), UnresolvedProducts::Drop);
        assert_eq!(view.customer.name(), UNKNOWN_CUSTOMER);
        assert_eq!(view.client_id.as_deref(), Some("gone"));
    }

    #[test]
    fn deleted_product_is_marked_in_list_views() {
        let view = enrich(
            json!({"id": "s1", "items": [{"id": "a", "productId": "X", "quantity": 1, "price": 4}]}),
            UnresolvedProducts::Placeholder,
        );
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].product.is_deleted());
        assert_eq!(view.items[0].product.name(), DELETED_PRODUCT);
        assert_eq!(view.total, Decimal::from(4));
    }

    #[test]
    fn deleted_product_is_dropped_in_single_views() {
        let view = enrich(
            json!({"id": "s1", "items": [
                {"id": "a", "productId": "X", "quantity": 1, "price": 4},
                {"id": "b", "productId": "P1", "quantity": 1, "price": 10}
            ]}),
            UnresolvedProducts::Drop,
        );
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].id, "b");
        assert_eq!(view.total, Decimal::from(10));
    }

    #[test]
    fn items_without_product_id_are_left_out() {
        let view = enrich(
            json!({"id": "s1", "items": [{"id": "a", "quantity": 2, "price": 4}]}),
            UnresolvedProducts::Placeholder,
        );
        assert!(view.items.is_empty());
        assert_eq!(view.total, Decimal::ZERO);
    }

    #[test]
    fn newest_first_with_undated_last() {
        let mut views = vec![
            enrich(json!({"id": "old", "createdAt": "2024-01-01T00:00:00.000Z"}), UnresolvedProducts::Drop),
            enrich(json!({"id": "undated"}), UnresolvedProducts::Drop),
            enrich(json!({"id": "legacy", "date": "2024-03-01T00:00:00.000Z"}), UnresolvedProducts::Drop),
            enrich(json!({"id": "new", "createdAt": "2024-06-01T00:00:00.000Z"}), UnresolvedProducts::Drop),
        ];

        sort_newest_first(&mut views);

        let ids: Vec<_> = views.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["new", "legacy", "old", "undated"]);
    }

    #[test]
    fn oversized_amounts_saturate_in_views() {
        let view = enrich(
            json!({"id": "s1", "items": [
                {"id": "a", "productId": "P1", "quantity": 10_000_000_000_i64, "price": "100000000000000000000"},
                {"id": "b", "productId": "P1", "quantity": 1, "price": 10}
            ]}),
            UnresolvedProducts::Placeholder,
        );
        assert_eq!(view.items[0].subtotal, Decimal::MAX);
        assert_eq!(view.total, Decimal::MAX);
    }

    #[test]
    fn exact_total_reports_overflow() {
        let sale = rec(json!({"items": [
            {"id": "a", "quantity": 10_000_000_000_i64, "price": "100000000000000000000"}
        ]}));
        assert_eq!(sale_total(&normalize_sale(&sale).items), None);

        let sale = rec(json!({"items": [{"id": "a", "quantity": 2, "price": "1.5"}]}));
        assert_eq!(sale_total(&normalize_sale(&sale).items), Some(Decimal::from(3)));
    }

    #[test]
    fn unparseable_catalog_entries_are_skipped() {
        let catalog = Catalog::from_records(vec![rec(json!({"name": "sem id"}))], vec![]);
        assert!(catalog.customer("").is_none());
    }
}
