// src/services.rs

pub mod customer_service;
pub mod document_service;
pub mod enrichment;
pub mod normalizer;
pub mod product_service;
pub mod sale_service;
pub mod settings_service;
pub mod stock;

pub use customer_service::CustomerService;
pub use document_service::DocumentService;
pub use product_service::ProductService;
pub use sale_service::SaleService;
pub use settings_service::SettingsService;
