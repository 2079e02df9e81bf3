//! Purchase route handlers: the address capture workflow over HTTP.
//!
//! `GET` enters the workflow; `POST` submits the address form. The target
//! used for the final redirect is the one stored in the session by `GET`,
//! never one taken from the form body. The pending record outlives a
//! successful submission, so replaying the form updates the stored address.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentCustomer;
use crate::models::session;
use crate::routes::{product_path, purchase_path};
use crate::services::{CaptureError, CheckOutcome, Completion, SubmitOutcome};
use crate::state::AppState;

/// Address form page template.
#[derive(Template, WebTemplate)]
#[template(path = "purchase/address.html")]
pub struct AddressFormTemplate {
    pub action: String,
    pub address: String,
    pub error: Option<String>,
}

impl AddressFormTemplate {
    fn new(target: ProductId) -> Self {
        Self {
            action: purchase_path(target),
            address: String::new(),
            error: None,
        }
    }
}

/// Form input for the address submission.
#[derive(Debug, Deserialize)]
pub struct AddressFormInput {
    pub address: Option<String>,
}

/// Enter the workflow: redirect if an address is on file, otherwise show
/// the form.
#[instrument(skip(state, session))]
pub async fn check(
    State(state): State<AppState>,
    session: Session,
    CurrentCustomer(customer): CurrentCustomer,
    Path(raw_target): Path<String>,
) -> Result<Response> {
    let target = raw_target.parse::<ProductId>().ok();

    match state.address_capture().check(customer, target).await? {
        CheckOutcome::AlreadySubmitted(done) => complete(&session, done).await,
        CheckOutcome::Collect(pending) => {
            session::set_pending_purchase(&session, &pending).await?;
            let target_id = pending.target.to_string();
            add_breadcrumb(
                "purchase",
                "Address form shown",
                Some(&[("target_id", target_id.as_str())]),
            );
            Ok(AddressFormTemplate::new(pending.target).into_response())
        }
    }
}

/// Handle the address form submission.
#[instrument(skip(state, session, input))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    CurrentCustomer(customer): CurrentCustomer,
    Path(raw_target): Path<String>,
    Form(input): Form<AddressFormInput>,
) -> Result<Response> {
    let Ok(target) = raw_target.parse::<ProductId>() else {
        return Err(CaptureError::TargetNotFound.into());
    };

    let Some(pending) = session::pending_purchase(&session)
        .await?
        .filter(|pending| pending.target == target)
    else {
        tracing::info!(target_id = %target, "Submission without pending purchase, restarting");
        return Ok(restart(target));
    };

    match state
        .address_capture()
        .submit(pending, customer, input.address.as_deref())
        .await
    {
        Ok(SubmitOutcome::Purchased(done)) => complete(&session, done).await,
        Ok(SubmitOutcome::Rejected { pending, error }) => {
            let form = AddressFormTemplate {
                address: input.address.unwrap_or_default(),
                error: Some(error.to_string()),
                ..AddressFormTemplate::new(pending.target)
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, form).into_response())
        }
        Err(CaptureError::InteractionExpired) => {
            session::clear_pending_purchase(&session).await?;
            Ok(restart(target))
        }
        Err(e) => Err(e.into()),
    }
}

/// Queue the completion notice and redirect to the purchased product.
async fn complete(session: &Session, done: Completion) -> Result<Response> {
    session::push_flash(session, done.notice).await?;
    Ok(Redirect::to(&product_path(done.redirect_to)).into_response())
}

/// Send the customer back to the start of the workflow.
fn restart(target: ProductId) -> Response {
    Redirect::to(&purchase_path(target)).into_response()
}
