//! Shopfront storefront library.
//!
//! Exposes the product catalog as JSON and runs the one-time shipping
//! address capture that gates a purchase. The binary in `main.rs` wires
//! these modules to `PostgreSQL`; tests wire them to the in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
