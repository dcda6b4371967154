//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sales_manager::{build_router, config::StorageBackend, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o nível; padrão: info)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env()?;
    match &config.backend {
        StorageBackend::File { data_dir } => {
            tracing::info!("Backend de armazenamento: arquivos JSON ({})", data_dir.display())
        }
        StorageBackend::Postgres { .. } => tracing::info!("Backend de armazenamento: Postgres"),
    }

    let bind_addr = config.bind_addr;
    let app_state = AppState::new(config).await?;
    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
