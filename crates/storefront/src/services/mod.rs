//! Business logic services.
//!
//! Services borrow their stores for the duration of one request; nothing is
//! held between requests.

pub mod address_capture;
pub mod catalog;

pub use address_capture::{
    ALREADY_SUBMITTED_NOTICE, AddressCapture, CaptureError, CheckOutcome, Completion,
    PURCHASED_NOTICE, PendingPurchase, SubmitOutcome,
};
pub use catalog::CatalogService;
