// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool, Postgres, Transaction};

use crate::{
    common::error::AppError,
    db::store::{record_id, Collection, Record, RecordStore, WriteOp},
};

/// Backend remoto: cada coleção é um mapa chaveado na tabela `records`.
///
/// Diferente do arquivo, aqui cada `WriteOp` é um comando por registro
/// dentro de uma transação; o ajuste de estoque é um único UPDATE, então
/// dois decrementos concorrentes nunca se sobrescrevem.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        collection: Collection,
        record: &Record,
    ) -> Result<(), AppError> {
        let id = record_id(record)
            .ok_or_else(|| AppError::Storage("record without id".to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO records (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(collection.storage_name())
        .bind(id)
        .bind(Json(record))
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn read_all(&self, collection: Collection) -> Result<Vec<Record>, AppError> {
        // Coleção vazia = nenhuma linha; não existe "not found" aqui.
        let rows = sqlx::query_scalar::<_, Json<Record>>(
            "SELECT data FROM records WHERE collection = $1 ORDER BY inserted_at, id",
        )
        .bind(collection.storage_name())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|Json(record)| record).collect())
    }

    async fn read_one(&self, collection: Collection, id: &str) -> Result<Option<Record>, AppError> {
        let row = sqlx::query_scalar::<_, Json<Record>>(
            "SELECT data FROM records WHERE collection = $1 AND id = $2",
        )
        .bind(collection.storage_name())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(record)| record))
    }

    async fn write_all(&self, collection: Collection, records: Vec<Record>) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM records WHERE collection = $1")
            .bind(collection.storage_name())
            .execute(&mut *tx)
            .await?;

        for record in &records {
            Self::upsert(&mut tx, collection, record).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn apply(&self, batch: Vec<WriteOp>) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;

        for op in &batch {
            match op {
                WriteOp::Put { collection, record } => {
                    Self::upsert(&mut tx, *collection, record).await?;
                }
                WriteOp::Merge { collection, id, patch } => {
                    sqlx::query(
                        "UPDATE records SET data = data || $3 WHERE collection = $1 AND id = $2",
                    )
                    .bind(collection.storage_name())
                    .bind(id)
                    .bind(Json(patch))
                    .execute(&mut *tx)
                    .await?;
                }
                WriteOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM records WHERE collection = $1 AND id = $2")
                        .bind(collection.storage_name())
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                WriteOp::CompareAndSet { collection, id, field, expected, value } => {
                    sqlx::query(
                        r#"
                        UPDATE records
                        SET data = jsonb_set(data, ARRAY[$3::text], $5)
                        WHERE collection = $1 AND id = $2 AND data->$3 = $4
                        "#,
                    )
                    .bind(collection.storage_name())
                    .bind(id)
                    .bind(*field)
                    .bind(Json(expected))
                    .bind(Json(value))
                    .execute(&mut *tx)
                    .await?;
                }
                WriteOp::AdjustCounter { collection, id, field, delta, updated_at } => {
                    // Mesma coerção de `coerce::to_quantity`: texto não numérico,
                    // objeto ou ausente contam como zero.
                    sqlx::query(
                        r#"
                        UPDATE records
                        SET data = jsonb_set(
                            jsonb_set(
                                data,
                                ARRAY[$3::text],
                                to_jsonb(GREATEST(0, LEAST(
                                    GREATEST(0, trunc(
                                        CASE
                                            WHEN jsonb_typeof(data->$3) = 'number'
                                                THEN (data->>$3)::numeric
                                            WHEN jsonb_typeof(data->$3) = 'string'
                                                AND btrim(data->>$3) ~ '^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$'
                                                THEN btrim(data->>$3)::numeric
                                            WHEN data->$3 = 'true'::jsonb THEN 1
                                            ELSE 0
                                        END
                                    )) + $4::numeric,
                                    9223372036854775807
                                ))::bigint)
                            ),
                            '{updatedAt}',
                            to_jsonb($5::text)
                        )
                        WHERE collection = $1 AND id = $2
                        "#,
                    )
                    .bind(collection.storage_name())
                    .bind(id)
                    .bind(*field)
                    .bind(*delta)
                    .bind(updated_at)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn read_document(&self, name: &str) -> Result<Option<Value>, AppError> {
        let row = sqlx::query_scalar::<_, Json<Value>>("SELECT data FROM documents WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|Json(doc)| doc))
    }

    async fn write_document(&self, name: &str, document: Value) -> Result<(), AppError> {
        // UPSERT (Insert or Update)
        sqlx::query(
            r#"
            INSERT INTO documents (name, data)
            VALUES ($1, $2)
            ON CONFLICT (name)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
