//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod id;
pub mod product;

pub use address::{AddressError, ShippingAddress};
pub use id::*;
pub use product::{ContentKind, Product};
