// src/routes.rs

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

fn sales_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales)
                .post(handlers::sales::create_sale)
                .delete(handlers::sales::soft_delete_sales),
        )
        .route(
            "/{id}",
            get(handlers::sales::get_sale)
                .patch(handlers::sales::update_sale)
                .delete(handlers::sales::delete_sale),
        )
        .route("/{id}/toggle-status", post(handlers::sales::toggle_status))
        .route("/{id}/receipt", get(handlers::documents::sale_receipt))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        // Segmento estático: tem prioridade sobre /{id}
        .route("/low-stock", get(handlers::products::low_stock))
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .patch(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/{id}/stock", post(handlers::products::adjust_stock))
}

fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
}

/// Monta o router completo com o estado já aplicado.
pub fn build_router(app_state: AppState) -> Router {
    let settings_routes = Router::new().route(
        "/",
        get(handlers::settings::get_settings)
            .put(handlers::settings::update_settings)
            .post(handlers::settings::update_settings),
    );

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/sales", sales_routes())
        // O front antigo chamava as vendas de "orders"
        .nest("/api/orders", sales_routes())
        .nest("/api/products", product_routes())
        .nest("/api/customers", customer_routes())
        .nest("/api/settings", settings_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
