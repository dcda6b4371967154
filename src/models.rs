// src/models.rs

pub mod customer;
pub mod product;
pub mod sale;
pub mod settings;
