// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{JsonFileStore, PgRecordStore, RecordStore},
    services::{CustomerService, DocumentService, ProductService, SaleService, SettingsService},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Um `<coleção>.json` por coleção dentro do diretório.
    File { data_dir: PathBuf },
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
    pub bind_addr: SocketAddr,
    pub low_stock_threshold: i64,
    pub fonts_dir: PathBuf,
    pub font_family: String,
}

impl AppConfig {
    /// Lê o `.env` (se houver) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("STORAGE_BACKEND").as_deref().unwrap_or("file") {
            "file" => StorageBackend::File {
                data_dir: var("DATA_DIR").unwrap_or_else(|| "./data".to_string()).into(),
            },
            "postgres" => StorageBackend::Postgres {
                database_url: var("DATABASE_URL")
                    .ok_or_else(|| anyhow!("DATABASE_URL deve ser definida para o backend postgres"))?,
            },
            other => bail!("STORAGE_BACKEND inválido: {} (use 'file' ou 'postgres')", other),
        };

        let bind_addr: SocketAddr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR inválido")?;

        let low_stock_threshold = match var("LOW_STOCK_THRESHOLD") {
            Some(raw) => raw.parse::<i64>().context("LOW_STOCK_THRESHOLD deve ser um inteiro")?,
            None => 10,
        };
        if low_stock_threshold < 0 {
            bail!("LOW_STOCK_THRESHOLD não pode ser negativo");
        }

        Ok(Self {
            backend,
            bind_addr,
            low_stock_threshold,
            fonts_dir: var("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()).into(),
            font_family: var("FONT_FAMILY").unwrap_or_else(|| "Roboto".to_string()),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
    pub sale_service: SaleService,
    pub product_service: ProductService,
    pub customer_service: CustomerService,
    pub settings_service: SettingsService,
    pub document_service: DocumentService,
}

impl AppState {
    /// Abre o backend configurado. No Postgres também roda as migrações.
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match &config.backend {
            StorageBackend::File { data_dir } => {
                Arc::new(JsonFileStore::open(data_dir.clone()).await?) as Arc<dyn RecordStore>
            }
            StorageBackend::Postgres { database_url } => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgRecordStore::new(pool))
            }
        };

        Ok(Self::with_store(config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: AppConfig, store: Arc<dyn RecordStore>) -> Self {
        let sale_service = SaleService::new(store.clone());
        let product_service = ProductService::new(store.clone(), config.low_stock_threshold);
        let customer_service = CustomerService::new(store.clone());
        let settings_service = SettingsService::new(store.clone());
        let document_service = DocumentService::new(config.fonts_dir.clone(), config.font_family.clone());

        Self {
            config: Arc::new(config),
            store,
            sale_service,
            product_service,
            customer_service,
            settings_service,
            document_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_file_backend() {
        let config = config(&[]).unwrap();
        assert_eq!(config.backend, StorageBackend::File { data_dir: "./data".into() });
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.font_family, "Roboto");
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(config(&[("STORAGE_BACKEND", "postgres")]).is_err());

        let config = config(&[
            ("STORAGE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/vendas"),
        ])
        .unwrap();
        assert_eq!(
            config.backend,
            StorageBackend::Postgres { database_url: "postgres://localhost/vendas".into() }
        );
    }

    #[test]
    fn invalid_values_abort() {
        assert!(config(&[("STORAGE_BACKEND", "mongo")]).is_err());
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
        assert!(config(&[("LOW_STOCK_THRESHOLD", "dez")]).is_err());
        assert!(config(&[("LOW_STOCK_THRESHOLD", "-1")]).is_err());
    }
}
