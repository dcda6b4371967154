// src/common.rs

pub mod coerce;
pub mod error;
pub mod extract;
pub mod timestamps;
