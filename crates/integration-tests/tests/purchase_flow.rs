//! Integration tests for the address capture workflow.
//!
//! Each test drives the router the way a browser would: `GET` the purchase
//! page, `POST` the address form, follow the redirect to the product page.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use shopfront_core::{CustomerId, ProductId, ShippingAddress};
use shopfront_integration_tests::TestApp;
use shopfront_storefront::services::{ALREADY_SUBMITTED_NOTICE, PURCHASED_NOTICE};
use shopfront_storefront::store::AddressStore;
use shopfront_storefront::store::memory::NewEntry;

const ALICE: CustomerId = CustomerId::new(7);
const BOB: CustomerId = CustomerId::new(8);

async fn app_with_widget() -> (TestApp, ProductId) {
    let app = TestApp::new();
    let id = app
        .catalog
        .insert(NewEntry::product("Widget").body("A widget").price("9.99"))
        .await;
    (app, id)
}

async fn stored_address(app: &TestApp, customer: CustomerId) -> Option<String> {
    app.addresses
        .find_by_customer(customer)
        .await
        .unwrap()
        .map(|record| record.address.into_inner())
}

// ============================================================================
// Check step
// ============================================================================

#[tokio::test]
async fn test_first_visit_shows_form() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));

    let resp = client.get(&format!("/purchase/{id}")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"name="address""#));
    assert!(resp.body.contains(&format!(r#"action="/purchase/{id}""#)));
    assert!(resp.headers.contains_key("set-cookie"));
}

#[tokio::test]
async fn test_returning_customer_skips_form() {
    let (app, id) = app_with_widget().await;
    app.addresses
        .upsert(ALICE, &ShippingAddress::parse("1 Main St").unwrap())
        .await
        .unwrap();
    let mut client = app.client(Some(ALICE));

    let resp = client.get(&format!("/purchase/{id}")).await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some(format!("/products/{id}").as_str()));

    let page = client.get(&format!("/products/{id}")).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(ALREADY_SUBMITTED_NOTICE));

    // Notices are shown once
    let again = client.get(&format!("/products/{id}")).await;
    assert!(!again.body.contains(ALREADY_SUBMITTED_NOTICE));
}

#[tokio::test]
async fn test_unknown_target_is_not_found() {
    let (app, _) = app_with_widget().await;
    let page = app.catalog.insert(NewEntry::product("About").kind("page")).await;
    let mut client = app.client(Some(ALICE));

    for uri in [
        "/purchase/999".to_string(),
        "/purchase/not-a-number".to_string(),
        format!("/purchase/{page}"),
    ] {
        let resp = client.get(&uri).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{uri}");
    }
    assert!(app.addresses.is_empty().await);
}

#[tokio::test]
async fn test_missing_customer_is_unauthorized() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(None);

    assert_eq!(
        client.get(&format!("/purchase/{id}")).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        client
            .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
            .await
            .status,
        StatusCode::UNAUTHORIZED
    );
    assert!(app.addresses.is_empty().await);
}

// ============================================================================
// Collect step
// ============================================================================

#[tokio::test]
async fn test_submit_stores_address_and_redirects() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    let resp = client
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some(format!("/products/{id}").as_str()));
    assert_eq!(stored_address(&app, ALICE).await.as_deref(), Some("1 Main St"));

    let page = client.get(&format!("/products/{id}")).await;
    assert!(page.body.contains(PURCHASED_NOTICE));
    assert!(page.body.contains("Widget"));

    // The next purchase short-circuits
    let resp = client.get(&format!("/purchase/{id}")).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_empty_address_rerenders_form() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    for form in ["address=", "address=+++", ""] {
        let resp = client.post_form(&format!("/purchase/{id}"), form).await;
        assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY, "{form:?}");
        assert!(resp.body.contains("Address field is required."));
        assert!(resp.body.contains(r#"name="address""#));
    }
    assert!(app.addresses.is_empty().await);

    // The interaction is still open after a rejection
    let resp = client
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(stored_address(&app, ALICE).await.as_deref(), Some("1 Main St"));
}

#[tokio::test]
async fn test_replayed_submission_updates_address() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    let first = client
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;
    assert_eq!(first.status, StatusCode::SEE_OTHER);

    let second = client
        .post_form(&format!("/purchase/{id}"), "address=2+Side+St")
        .await;
    assert_eq!(second.status, StatusCode::SEE_OTHER);
    assert_eq!(second.location(), Some(format!("/products/{id}").as_str()));
    assert_eq!(stored_address(&app, ALICE).await.as_deref(), Some("2 Side St"));

    let empty = client.post_form(&format!("/purchase/{id}"), "address=").await;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(empty.body.contains("Address field is required."));
    assert_eq!(stored_address(&app, ALICE).await.as_deref(), Some("2 Side St"));
    assert_eq!(app.addresses.len().await, 1);
}

#[tokio::test]
async fn test_too_long_address_rejected() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    let form = format!("address={}", "a".repeat(ShippingAddress::MAX_LENGTH + 1));
    let resp = client.post_form(&format!("/purchase/{id}"), &form).await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("cannot be longer than 128 characters"));
    assert!(app.addresses.is_empty().await);
}

#[tokio::test]
async fn test_submit_without_check_restarts() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));

    let resp = client
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location(), Some(format!("/purchase/{id}").as_str()));
    assert!(app.addresses.is_empty().await);
}

#[tokio::test]
async fn test_submit_for_other_target_restarts() {
    let (app, id) = app_with_widget().await;
    let other = app.catalog.insert(NewEntry::product("Gadget")).await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    let resp = client
        .post_form(&format!("/purchase/{other}"), "address=1+Main+St")
        .await;

    assert_eq!(resp.location(), Some(format!("/purchase/{other}").as_str()));
    assert!(app.addresses.is_empty().await);
}

#[tokio::test]
async fn test_customers_do_not_share_addresses() {
    let (app, id) = app_with_widget().await;

    let mut alice = app.client(Some(ALICE));
    alice.get(&format!("/purchase/{id}")).await;
    alice
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;

    let mut bob = app.client(Some(BOB));
    let resp = bob.get(&format!("/purchase/{id}")).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(stored_address(&app, BOB).await.is_none());
    assert_eq!(app.addresses.len().await, 1);
}

#[tokio::test]
async fn test_address_store_unavailable() {
    let (app, id) = app_with_widget().await;
    let mut client = app.client(Some(ALICE));
    client.get(&format!("/purchase/{id}")).await;

    app.addresses.set_available(false);

    let resp = client
        .post_form(&format!("/purchase/{id}"), "address=1+Main+St")
        .await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);

    let resp = client.get(&format!("/purchase/{id}")).await;
    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}
