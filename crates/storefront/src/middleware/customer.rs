//! Customer identity extractor.
//!
//! Authentication happens upstream: the authenticating proxy forwards the
//! customer id in a request header. This module only reads it.

use axum::{extract::FromRequestParts, http::request::Parts};

use shopfront_core::CustomerId;

use crate::error::{AppError, set_sentry_user};

/// Header carrying the authenticated customer's id.
pub const CUSTOMER_ID_HEADER: &str = "x-customer-id";

/// Extractor that requires a customer identity.
///
/// Rejects with `401 Unauthorized` when the header is absent or is not a
/// valid id.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentCustomer(customer): CurrentCustomer) -> String {
///     format!("Hello, customer {customer}!")
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentCustomer(pub CustomerId);

impl<S> FromRequestParts<S> for CurrentCustomer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CUSTOMER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("customer identity required".to_string()))?;

        let customer = raw
            .to_str()
            .ok()
            .and_then(|value| value.parse::<CustomerId>().ok())
            .ok_or_else(|| AppError::Unauthorized("invalid customer identity".to_string()))?;

        set_sentry_user(&customer);

        Ok(Self(customer))
    }
}
