// src/handlers.rs

pub mod customers;
pub mod documents;
pub mod products;
pub mod sales;
pub mod settings;
