// src/services/normalizer.rs

//! Normalização dos itens de uma venda.
//!
//! Vendas antigas guardam os itens em `products`, as novas em `items`; o
//! preço pode estar em `price` ou `unitPrice`; quantidade e id podem
//! faltar. O resultado é sempre a lista canônica `{id, productId,
//! quantity, price}`, com a indicação de que ids foram gerados agora e
//! precisam ser gravados de volta. A gravação preserva os demais campos
//! de cada item.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::coerce,
    db::{Collection, Record, WriteOp},
    models::sale::LineItem,
};

/// Campo onde a venda guarda os itens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemsField {
    Items,
    Products,
}

impl ItemsField {
    pub fn key(&self) -> &'static str {
        match self {
            ItemsField::Items => "items",
            ItemsField::Products => "products",
        }
    }

    /// `items` tem prioridade; `products` só vale se `items` não existir.
    pub fn detect(sale: &Record) -> Self {
        let present = |key: &str| sale.get(key).is_some_and(|v| !v.is_null());
        if !present("items") && present("products") {
            ItemsField::Products
        } else {
            ItemsField::Items
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItems {
    pub field: ItemsField,
    pub items: Vec<LineItem>,
    /// Algum item ganhou id agora: a venda precisa ser regravada.
    pub dirty: bool,
    /// O campo exatamente como foi lido; base da gravação condicional.
    original: Value,
    /// O que vai para o disco: cada entrada original com `id` garantido.
    entries: Vec<Value>,
}

impl NormalizedItems {
    /// Lista a persistir. Campos extras dos itens são preservados; só o
    /// produto embutido sai. Entradas que não são objeto seguem como estão.
    pub fn stored_items(&self) -> Value {
        Value::Array(self.entries.clone())
    }

    /// Gravação dos ids gerados, condicionada ao campo não ter mudado desde
    /// a leitura. `None` quando não há nada a corrigir.
    pub fn repair_op(&self, sale_id: &str) -> Option<WriteOp> {
        self.dirty.then(|| WriteOp::CompareAndSet {
            collection: Collection::Sales,
            id: sale_id.to_string(),
            field: self.field.key(),
            expected: self.original.clone(),
            value: self.stored_items(),
        })
    }
}

pub fn normalize_sale(sale: &Record) -> NormalizedItems {
    let field = ItemsField::detect(sale);
    let original = sale.get(field.key()).cloned().unwrap_or(Value::Null);
    normalize(field, original)
}

/// Itens vindos de uma requisição (criação ou edição).
pub fn normalize_items(raw: &[Value]) -> NormalizedItems {
    normalize(ItemsField::Items, Value::Array(raw.to_vec()))
}

fn normalize(field: ItemsField, original: Value) -> NormalizedItems {
    let raw: Vec<&Value> = match &original {
        Value::Array(entries) => entries.iter().collect(),
        // Exportações do banco remoto às vezes trazem arrays como mapas
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    };

    let mut dirty = false;
    let mut items = Vec::with_capacity(raw.len());
    let mut entries = Vec::with_capacity(raw.len());

    for entry in raw {
        let Some(fields) = entry.as_object() else {
            entries.push(entry.clone());
            continue;
        };
        let (item, generated) = normalize_item(fields);
        dirty |= generated;
        entries.push(Value::Object(stored_entry(fields, &item)));
        items.push(item);
    }

    NormalizedItems { field, items, dirty, original, entries }
}

fn normalize_item(raw: &Record) -> (LineItem, bool) {
    let (id, generated) = match coerce::to_id(raw.get("id")) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    let item = LineItem {
        id,
        product_id: coerce::to_id(raw.get("productId")),
        quantity: coerce::to_quantity(raw.get("quantity")),
        price: resolve_price(raw),
    };
    (item, generated)
}

// Números já gravados ficam intactos (inclusive quantidades fracionárias);
// o resto é substituído pelo valor coagido.
fn stored_entry(raw: &Record, item: &LineItem) -> Record {
    let mut entry = raw.clone();
    entry.remove("product");
    entry.insert("id".into(), Value::from(item.id.clone()));
    if !raw.get("price").is_some_and(Value::is_number) {
        if let Some(price) = item.price.to_f64() {
            entry.insert("price".into(), Value::from(price));
        }
    }
    if !raw.get("quantity").is_some_and(Value::is_number) {
        entry.insert("quantity".into(), Value::from(item.quantity));
    }
    entry
}

// `price` primeiro; `unitPrice` só quando `price` não veio.
fn resolve_price(raw: &Record) -> Decimal {
    let source = match raw.get("price") {
        None | Some(Value::Null) => raw.get("unitPrice"),
        price => price,
    };
    coerce::to_decimal(source)
}
