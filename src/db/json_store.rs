// src/db/json_store.rs

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::Mutex};

use crate::{
    common::error::AppError,
    db::store::{apply_in_memory, record_id, Collection, Record, RecordStore, WriteOp},
};

/// Backend de arquivo: um `<coleção>.json` (array formatado) por coleção.
///
/// Toda escrita passa pelo mesmo mutex, então um lote de `WriteOp` é uma
/// única seção crítica: leitura, mutação e gravação sem interferência de
/// outra requisição deste processo.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!("📁 Armazenamento em arquivos JSON em {}", dir.display());
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    // Chamar apenas com o write_lock em mãos: pode criar o arquivo.
    async fn load_locked(&self, collection: Collection) -> Result<Vec<Record>, AppError> {
        let path = self.path_for(collection.storage_name());
        match fs::read_to_string(&path).await {
            Ok(raw) => parse_collection(&raw, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&path, "[]").await?;
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist_locked(&self, name: &str, value: &Value) -> Result<(), AppError> {
        let path = self.path_for(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(value)?).await?;
        // rename é atômico: leitores nunca veem um arquivo pela metade
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Aceita o array gravado por nós e também o mapa chaveado exportado do
/// banco remoto (`{ "<id>": {...}, ... }`).
fn parse_collection(raw: &str, path: &Path) -> Result<Vec<Record>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let entries = match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Null => Vec::new(),
        _ => {
            return Err(AppError::Storage(format!(
                "{} is not a JSON collection",
                path.display()
            )))
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(record) => Some(record),
            other => {
                tracing::warn!("Ignorando entrada inválida em {}: {}", path.display(), other);
                None
            }
        })
        .collect())
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>, AppError> {
        let path = self.path_for(collection.storage_name());
        match fs::read_to_string(&path).await {
            Ok(raw) => parse_collection(&raw, &path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // Primeira leitura: cria a coleção vazia sob o lock
                let _guard = self.write_lock.lock().await;
                self.load_locked(collection).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_one(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let records = self.read_all(collection).await?;
        Ok(records.into_iter().find(|r| record_id(r).as_deref() == Some(id)))
    }

    async fn write_all(&self, collection: Collection, records: Vec<Record>) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let value = Value::Array(records.into_iter().map(Value::Object).collect());
        self.persist_locked(collection.storage_name(), &value).await
    }

    async fn apply(&self, batch: Vec<WriteOp>) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;

        // Cada coleção tocada é lida uma vez e gravada uma vez.
        let mut touched: BTreeMap<Collection, Vec<Record>> = BTreeMap::new();
        for op in &batch {
            let collection = op.collection();
            if !touched.contains_key(&collection) {
                let records = self.load_locked(collection).await?;
                touched.insert(collection, records);
            }
            if let Some(records) = touched.get_mut(&collection) {
                apply_in_memory(records, op)?;
            }
        }

        for (collection, records) in touched {
            let value = Value::Array(records.into_iter().map(Value::Object).collect());
            self.persist_locked(collection.storage_name(), &value).await?;
        }
        Ok(())
    }

    async fn read_document(&self, name: &str) -> Result<Option<Value>, AppError> {
        match fs::read_to_string(self.path_for(name)).await {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, name: &str, document: Value) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.persist_locked(name, &document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn missing_collection_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let sales = store.read_all(Collection::Sales).await.unwrap();

        assert!(sales.is_empty());
        let raw = std::fs::read_to_string(dir.path().join("sales.json")).unwrap();
        assert_eq!(raw, "[]");
    }

    #[tokio::test]
    async fn keyed_object_files_are_read_as_collections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("products.json"),
            r#"{"p1": {"id": "p1", "stock": 3}, "p2": {"id": "p2", "stock": 1}}"#,
        )
        .unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let p2 = store.read_one(Collection::Products, "p2").await.unwrap();

        assert_eq!(p2.unwrap()["stock"], json!(1));
        assert_eq!(store.read_all(Collection::Products).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn customers_live_in_clients_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store
            .write_all(Collection::Customers, vec![rec(json!({"id": "c1", "name": "Ana"}))])
            .await
            .unwrap();

        assert!(dir.path().join("clients.json").exists());
        assert!(store.read_one(Collection::Customers, "c1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn batch_spans_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store
            .write_all(Collection::Products, vec![rec(json!({"id": "p1", "stock": 5}))])
            .await
            .unwrap();

        store
            .apply(vec![
                WriteOp::Put { collection: Collection::Sales, record: rec(json!({"id": "s1"})) },
                WriteOp::AdjustCounter {
                    collection: Collection::Products,
                    id: "p1".into(),
                    field: "stock",
                    delta: -3,
                    updated_at: "2024-01-01T00:00:00.000Z".into(),
                },
            ])
            .await
            .unwrap();

        assert!(store.read_one(Collection::Sales, "s1").await.unwrap().is_some());
        let p1 = store.read_one(Collection::Products, "p1").await.unwrap().unwrap();
        assert_eq!(p1["stock"], json!(2));
    }

    #[tokio::test]
    async fn concurrent_decrements_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
        store
            .write_all(Collection::Products, vec![rec(json!({"id": "p1", "stock": 100}))])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .apply(vec![WriteOp::AdjustCounter {
                        collection: Collection::Products,
                        id: "p1".into(),
                        field: "stock",
                        delta: -2,
                        updated_at: "2024-01-01T00:00:00.000Z".into(),
                    }])
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let p1 = store.read_one(Collection::Products, "p1").await.unwrap().unwrap();
        assert_eq!(p1["stock"], json!(60));
    }

    #[tokio::test]
    async fn documents_round_trip_and_default_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        assert!(store.read_document("settings").await.unwrap().is_none());
        store
            .write_document("settings", json!({"businessName": "Corralón"}))
            .await
            .unwrap();
        assert_eq!(
            store.read_document("settings").await.unwrap(),
            Some(json!({"businessName": "Corralón"}))
        );
    }

    #[tokio::test]
    async fn corrupt_file_is_a_storage_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sales.json"), "42").unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let err = store.read_all(Collection::Sales).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
