//! JSON API handlers.

pub mod products;
