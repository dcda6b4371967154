// src/db/store.rs

//! Contrato único de persistência, independente do backend.
//!
//! Uma coleção é uma lista de registros JSON identificados por `id`. O
//! backend de arquivo guarda um array por coleção; o Postgres guarda um
//! mapa chaveado (collection, id) -> JSONB. Os serviços só enxergam este
//! trait.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::common::{coerce, error::AppError};

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Customers,
    Products,
    Sales,
}

impl Collection {
    /// Nome físico (arquivo `<nome>.json` ou chave no banco). Clientes
    /// continuam em `clients` por compatibilidade com os dados existentes.
    pub fn storage_name(&self) -> &'static str {
        match self {
            Collection::Customers => "clients",
            Collection::Products => "products",
            Collection::Sales => "sales",
        }
    }
}

/// Escrita chaveada por registro. Um lote de `WriteOp` é aplicado de forma
/// atômica em relação aos outros escritores.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insere ou substitui o registro inteiro (o id vem de `record["id"]`).
    Put { collection: Collection, record: Record },
    /// Mescla campos no registro existente. Registro ausente: nada acontece.
    Merge { collection: Collection, id: String, patch: Record },
    Delete { collection: Collection, id: String },
    /// Troca `field` por `value` só se o valor atual ainda for `expected`.
    /// Se outro escritor mexeu no campo, nada acontece.
    CompareAndSet {
        collection: Collection,
        id: String,
        field: &'static str,
        expected: Value,
        value: Value,
    },
    /// Soma `delta` a um campo inteiro, limitando em zero, e carimba
    /// `updatedAt`. Registro ausente: nada acontece.
    AdjustCounter {
        collection: Collection,
        id: String,
        field: &'static str,
        delta: i64,
        updated_at: String,
    },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Put { collection, .. }
            | WriteOp::Merge { collection, .. }
            | WriteOp::Delete { collection, .. }
            | WriteOp::CompareAndSet { collection, .. }
            | WriteOp::AdjustCounter { collection, .. } => *collection,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Coleção nunca inicializada devolve lista vazia (e é criada vazia).
    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>, AppError>;

    async fn read_one(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError>;

    /// Sobrescreve a coleção inteira.
    async fn write_all(&self, collection: Collection, records: Vec<Record>) -> Result<(), AppError>;

    async fn apply(&self, batch: Vec<WriteOp>) -> Result<(), AppError>;

    /// Documentos avulsos, sem esquema (ex: configurações).
    async fn read_document(&self, name: &str) -> Result<Option<Value>, AppError>;

    async fn write_document(&self, name: &str, document: Value) -> Result<(), AppError>;
}

pub fn record_id(record: &Record) -> Option<String> {
    coerce::to_id(record.get("id"))
}

/// Serializa um modelo tipado para o formato de registro.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(AppError::Storage(format!("expected a JSON object, got {}", other))),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(record))
}

/// Novo valor de um contador: nunca abaixo de zero.
pub fn clamp_counter(current: i64, delta: i64) -> i64 {
    current.saturating_add(delta).max(0)
}

/// Semântica de referência de `WriteOp` sobre uma coleção em memória.
/// O backend de arquivo usa direto; o Postgres reproduz em SQL.
pub fn apply_in_memory(records: &mut Vec<Record>, op: &WriteOp) -> Result<(), AppError> {
    match op {
        WriteOp::Put { record, .. } => {
            let id = record_id(record)
                .ok_or_else(|| AppError::Storage("record without id".to_string()))?;
            match position(records, &id) {
                Some(idx) => records[idx] = record.clone(),
                None => records.push(record.clone()),
            }
        }
        WriteOp::Merge { id, patch, .. } => {
            if let Some(idx) = position(records, id) {
                for (key, value) in patch {
                    records[idx].insert(key.clone(), value.clone());
                }
            }
        }
        WriteOp::Delete { id, .. } => {
            records.retain(|r| record_id(r).as_deref() != Some(id.as_str()));
        }
        WriteOp::CompareAndSet { id, field, expected, value, .. } => {
            if let Some(idx) = position(records, id) {
                let record = &mut records[idx];
                if record.get(*field) == Some(expected) {
                    record.insert(field.to_string(), value.clone());
                }
            }
        }
        WriteOp::AdjustCounter { id, field, delta, updated_at, .. } => {
            if let Some(idx) = position(records, id) {
                let record = &mut records[idx];
                let current = coerce::to_quantity(record.get(*field));
                record.insert(field.to_string(), Value::from(clamp_counter(current, *delta)));
                record.insert("updatedAt".to_string(), Value::from(updated_at.clone()));
            }
        }
    }
    Ok(())
}

fn position(records: &[Record], id: &str) -> Option<usize> {
    records.iter().position(|r| record_id(r).as_deref() == Some(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn put_replaces_by_id_or_appends() {
        let mut records = vec![rec(json!({"id": "a", "v": 1}))];
        let put = |v| WriteOp::Put { collection: Collection::Products, record: rec(v) };

        apply_in_memory(&mut records, &put(json!({"id": "a", "v": 2}))).unwrap();
        apply_in_memory(&mut records, &put(json!({"id": "b", "v": 3}))).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["v"], json!(2));
        assert_eq!(records[1]["id"], json!("b"));
    }

    #[test]
    fn put_without_id_is_rejected() {
        let mut records = Vec::new();
        let op = WriteOp::Put { collection: Collection::Sales, record: rec(json!({"x": 1})) };
        assert!(apply_in_memory(&mut records, &op).is_err());
    }

    #[test]
    fn merge_and_adjust_skip_missing_records() {
        let mut records = vec![rec(json!({"id": "a", "stock": 1}))];
        let merge = WriteOp::Merge {
            collection: Collection::Products,
            id: "zzz".into(),
            patch: rec(json!({"name": "x"})),
        };
        let adjust = WriteOp::AdjustCounter {
            collection: Collection::Products,
            id: "zzz".into(),
            field: "stock",
            delta: -1,
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        apply_in_memory(&mut records, &merge).unwrap();
        apply_in_memory(&mut records, &adjust).unwrap();
        assert_eq!(records, vec![rec(json!({"id": "a", "stock": 1}))]);
    }

    #[test]
    fn adjust_counter_clamps_at_zero_and_touches_updated_at() {
        let mut records = vec![rec(json!({"id": "p1", "stock": "5"}))];
        let op = WriteOp::AdjustCounter {
            collection: Collection::Products,
            id: "p1".into(),
            field: "stock",
            delta: -10,
            updated_at: "2024-01-01T00:00:00.000Z".into(),
        };
        apply_in_memory(&mut records, &op).unwrap();
        assert_eq!(records[0]["stock"], json!(0));
        assert_eq!(records[0]["updatedAt"], json!("2024-01-01T00:00:00.000Z"));
    }

    #[test]
    fn adjust_counter_treats_non_numeric_counters_as_zero() {
        let mut records = vec![
            rec(json!({"id": "p1", "stock": "abc"})),
            rec(json!({"id": "p2", "stock": true})),
            rec(json!({"id": "p3", "stock": {"n": 4}})),
        ];
        for (id, delta) in [("p1", 3), ("p2", 3), ("p3", -2)] {
            let op = WriteOp::AdjustCounter {
                collection: Collection::Products,
                id: id.into(),
                field: "stock",
                delta,
                updated_at: "2024-01-01T00:00:00.000Z".into(),
            };
            apply_in_memory(&mut records, &op).unwrap();
        }
        assert_eq!(records[0]["stock"], json!(3));
        assert_eq!(records[1]["stock"], json!(4));
        assert_eq!(records[2]["stock"], json!(0));
    }

    #[test]
    fn compare_and_set_only_writes_over_the_expected_value() {
        let mut records = vec![rec(json!({"id": "s1", "items": [{"quantity": 9}]}))];
        let cas = |expected: Value| WriteOp::CompareAndSet {
            collection: Collection::Sales,
            id: "s1".into(),
            field: "items",
            expected,
            value: json!([{"id": "x", "quantity": 1}]),
        };

        apply_in_memory(&mut records, &cas(json!([{"quantity": 1}]))).unwrap();
        assert_eq!(records[0]["items"], json!([{"quantity": 9}]));

        apply_in_memory(&mut records, &cas(json!([{"quantity": 9}]))).unwrap();
        assert_eq!(records[0]["items"], json!([{"id": "x", "quantity": 1}]));
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut records = vec![rec(json!({"id": "a"})), rec(json!({"id": "b"}))];
        let op = WriteOp::Delete { collection: Collection::Customers, id: "a".into() };
        apply_in_memory(&mut records, &op).unwrap();
        assert_eq!(records, vec![rec(json!({"id": "b"}))]);
    }
}
