use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use payment_engine::{
    db_types::{NewPayment, Payment, PaymentStatus},
    PaymentFlowApi,
    PaymentStoreError,
};
use serde_json::json;
use stripe_tools::{PaymentIntent, StripeApiError};

use super::{
    helpers::post_json,
    mocks::{MockPaymentsDb, MockStripe},
};
use crate::routes::CreatePaymentIntentRoute;

fn test_intent() -> PaymentIntent {
    PaymentIntent {
        id: "pi_1".to_string(),
        client_secret: "pi_1_secret_abc".to_string(),
        status: "requires_payment_method".to_string(),
    }
}

fn stored(payment: NewPayment) -> Payment {
    Payment {
        id: 1,
        amount: payment.amount,
        currency: payment.currency,
        processor_payment_id: payment.processor_payment_id,
        status: payment.status,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[actix_web::test]
async fn valid_initiation_returns_the_client_secret() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 2500, "currency": "usd"});
    let (status, body) = post_json("/create-payment-intent", &body, configure_success).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"client_secret":"pi_1_secret_abc"}"#);
}

#[actix_web::test]
async fn currency_is_normalized_to_lowercase() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 2500, "currency": "USD"});
    let (status, _) = post_json("/create-payment-intent", &body, configure_success).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn malformed_requests_have_no_side_effects() {
    let _ = env_logger::try_init().ok();
    let bodies = [
        json!({}),
        json!({"currency": "usd"}),
        json!({"amount": 2500}),
        json!({"amount": "2500", "currency": "usd"}),
        json!({"amount": 0, "currency": "usd"}),
        json!({"amount": -10, "currency": "usd"}),
        json!({"amount": 2500, "currency": ""}),
        json!({"amount": 2500, "currency": "dollars"}),
    ];
    for body in bodies {
        let (status, response) =
            post_json("/create-payment-intent", &body, configure_untouched).await.expect("Request failed");
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body} should have been rejected");
        assert!(response.contains("error"), "{response} should carry an error body");
    }
}

#[actix_web::test]
async fn upstream_failure_writes_no_row() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 2500, "currency": "usd"});
    let (status, response) =
        post_json("/create-payment-intent", &body, configure_upstream_failure).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.contains("error"));
}

#[actix_web::test]
async fn store_failure_is_surfaced_after_the_intent_was_created() {
    let _ = env_logger::try_init().ok();
    let body = json!({"amount": 2500, "currency": "usd"});
    let (status, response) =
        post_json("/create-payment-intent", &body, configure_store_failure).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.contains("error"));
}

fn configure_success(cfg: &mut ServiceConfig) {
    let mut stripe = MockStripe::new();
    stripe
        .expect_create_payment_intent()
        .withf(|amount, currency: &str| amount.value() == 2500 && currency == "usd")
        .times(1)
        .returning(|_, _| Ok(test_intent()));
    let mut db = MockPaymentsDb::new();
    db.expect_insert_payment()
        .withf(|payment| {
            payment.amount.value() == 2500
                && payment.currency == "usd"
                && payment.processor_payment_id == "pi_1"
                && payment.status == PaymentStatus::Created
        })
        .times(1)
        .returning(|payment| Ok(stored(payment)));
    register(cfg, db, stripe);
}

// Any call on either mock panics; requests through here must have no side effects at all.
fn configure_untouched(cfg: &mut ServiceConfig) {
    register(cfg, MockPaymentsDb::new(), MockStripe::new());
}

fn configure_upstream_failure(cfg: &mut ServiceConfig) {
    let mut stripe = MockStripe::new();
    stripe.expect_create_payment_intent().times(1).returning(|_, _| {
        Err(StripeApiError::ApiError { status: 402, message: "Your card was declined.".to_string() })
    });
    register(cfg, MockPaymentsDb::new(), stripe);
}

fn configure_store_failure(cfg: &mut ServiceConfig) {
    let mut stripe = MockStripe::new();
    stripe.expect_create_payment_intent().times(1).returning(|_, _| Ok(test_intent()));
    let mut db = MockPaymentsDb::new();
    db.expect_insert_payment()
        .times(1)
        .returning(|_| Err(PaymentStoreError::DatabaseError("disk I/O error".to_string())));
    register(cfg, db, stripe);
}

fn register(cfg: &mut ServiceConfig, db: MockPaymentsDb, stripe: MockStripe) {
    cfg.app_data(web::Data::new(PaymentFlowApi::new(db)))
        .app_data(web::Data::new(stripe))
        .service(CreatePaymentIntentRoute::<MockPaymentsDb, MockStripe>::new());
}
