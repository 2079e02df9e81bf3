//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions)
//!
//! Customer identity is an extractor rather than a layer: only the purchase
//! routes need it.

pub mod customer;
pub mod request_id;
pub mod session;

pub use customer::{CUSTOMER_ID_HEADER, CurrentCustomer};
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, postgres_session_store};
