// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Sales Manager API", description = "Vendas, clientes e estoque"),
    paths(
        // --- Sales ---
        handlers::sales::list_sales,
        handlers::sales::create_sale,
        handlers::sales::get_sale,
        handlers::sales::update_sale,
        handlers::sales::toggle_status,
        handlers::sales::delete_sale,
        handlers::sales::soft_delete_sales,
        handlers::documents::sale_receipt,

        // --- Products ---
        handlers::products::list_products,
        handlers::products::low_stock,
        handlers::products::create_product,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::adjust_stock,
        handlers::products::delete_product,

        // --- Customers ---
        handlers::customers::list_customers,
        handlers::customers::create_customer,
        handlers::customers::get_customer,
        handlers::customers::update_customer,
        handlers::customers::delete_customer,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Sales ---
            models::sale::SaleStatus,
            models::sale::LineItem,
            models::sale::DeletedProduct,
            models::sale::ProductView,
            models::sale::UnknownCustomer,
            models::sale::CustomerView,
            models::sale::EnrichedLineItem,
            models::sale::SaleView,
            models::sale::CreateSalePayload,
            models::sale::UpdateSalePayload,
            models::sale::SoftDeletePayload,
            models::sale::SoftDeleteResult,

            // --- Products ---
            models::product::Product,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::AdjustStockPayload,

            // --- Customers ---
            models::customer::GeoPoint,
            models::customer::Customer,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,
            models::customer::CustomerDeleted,

            // --- Settings ---
            models::settings::SettingsSaved,
        )
    ),
    tags(
        (name = "Sales", description = "Vendas (também em /api/orders)"),
        (name = "Products", description = "Produtos e Estoque"),
        (name = "Customers", description = "Clientes"),
        (name = "Settings", description = "Configurações do Negócio")
    )
)]
pub struct ApiDoc;
