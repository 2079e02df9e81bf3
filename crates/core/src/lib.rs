//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - Catalog API and address capture workflow
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, the validated shipping address, and the public
//!   product projection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
