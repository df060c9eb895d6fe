//! End-to-end checkout against a local stub of the plan and order endpoints

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::NaiveDate;
use checkout_client::{
    CheckoutConfig, CheckoutSession, ClientError, HttpOrderSubmitter, HttpPlanSource, PlanSource,
    REQUEST_ID_HEADER, spawn_catalog_load,
};
use checkout_core::{FieldValue, Stage, Step, Submission, Validator};
use rust_decimal_macros::dec;
use serde_json::{Value, json};

#[derive(Clone)]
struct Stub {
    orders: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    order_status: StatusCode,
}

async fn prices() -> Json<Value> {
    Json(json!({
        "subscription_plans": [
            { "duration_months": 3, "price_usd_per_gb": 3 },
            { "duration_months": 6, "price_usd_per_gb": 2.5 },
            { "duration_months": 12, "price_usd_per_gb": 2 }
        ]
    }))
}

async fn post_order(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    stub.orders.lock().unwrap().push((headers, body.clone()));
    (stub.order_status, Json(json!({ "json": body })))
}

async fn broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Serve the stub on an ephemeral port and return its base URL
async fn serve(stub: Stub) -> String {
    let app = Router::new()
        .route("/prices", get(prices))
        .route("/post", post(post_order))
        .route("/broken", get(broken))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn stub(order_status: StatusCode) -> Stub {
    Stub {
        orders: Arc::new(Mutex::new(Vec::new())),
        order_status,
    }
}

async fn session_for(base: &str) -> CheckoutSession {
    let config = CheckoutConfig::with_base_url(base);
    let http = config.http_client().unwrap();
    let plans = spawn_catalog_load(Arc::new(HttpPlanSource::new(http.clone(), config.plans_url.clone())));
    let orders = Arc::new(HttpOrderSubmitter::new(http, config.order_url.clone()));

    CheckoutSession::new(orders)
        .with_validator(Validator::at(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()))
        .with_catalog(plans.resolve().await)
}

async fn fill_to_review(session: &mut CheckoutSession, up_front: bool) {
    session.edit(FieldValue::Storage(50)).unwrap();
    session.edit(FieldValue::UpFront(up_front)).unwrap();
    session.next().await.unwrap();

    session.edit(FieldValue::CardNumber("5555 5555 5555 4444".into())).unwrap();
    session.edit(FieldValue::ExpirationDate("03/2029".into())).unwrap();
    session.edit(FieldValue::Cvv("321".into())).unwrap();
    session.next().await.unwrap();

    session.edit(FieldValue::Email("  jane@example.com ".into())).unwrap();
    session.edit(FieldValue::TermsAgreement(true)).unwrap();
    assert_eq!(session.stage(), Stage::Active(Step::Review));
}

#[tokio::test]
async fn test_catalog_loaded_over_http() {
    let base = serve(stub(StatusCode::OK)).await;
    let source = HttpPlanSource::from_config(&CheckoutConfig::with_base_url(&base)).unwrap();

    let catalog = source.fetch_plans().await.unwrap();
    assert_eq!(catalog.durations(), vec![3, 6, 12]);
    assert_eq!(catalog.find(6).unwrap().price_usd_per_gb, dec!(2.5));
}

#[tokio::test]
async fn test_catalog_error_status() {
    let base = serve(stub(StatusCode::OK)).await;
    let source = HttpPlanSource::new(reqwest::Client::new(), format!("{base}/broken"));

    let err = source.fetch_plans().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
    assert!(err.is_retryable());

    let pending = spawn_catalog_load(Arc::new(source));
    assert!(pending.resolve().await.is_empty());
}

#[tokio::test]
async fn test_full_checkout_posts_order() {
    let stub = stub(StatusCode::OK);
    let base = serve(stub.clone()).await;
    let mut session = session_for(&base).await;

    fill_to_review(&mut session, true).await;
    assert_eq!(session.quote().total, dec!(1080));

    assert_eq!(session.next().await.unwrap(), Stage::Done);
    let receipt = session.last_receipt().unwrap().clone();
    assert_eq!(receipt.status, 200);

    let orders = stub.orders.lock().unwrap();
    assert_eq!(orders.len(), 1);
    let (headers, body) = &orders[0];
    assert_eq!(
        headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap(),
        receipt.request_id.to_string()
    );
    assert_eq!(
        body,
        &json!({
            "duration": 12,
            "storage": 50,
            "upFront": true,
            "cardNumber": "5555555555554444",
            "expirationDate": "03/2029",
            "cvv": "321",
            "email": "jane@example.com",
            "termsAgreement": true
        })
    );
}

#[tokio::test]
async fn test_up_front_sent_as_boolean_false() {
    let stub = stub(StatusCode::OK);
    let base = serve(stub.clone()).await;
    let mut session = session_for(&base).await;

    fill_to_review(&mut session, false).await;
    session.next().await.unwrap();

    let orders = stub.orders.lock().unwrap();
    assert_eq!(orders[0].1["upFront"], json!(false));
}

#[tokio::test]
async fn test_rejected_order_can_be_retried() {
    let stub = stub(StatusCode::SERVICE_UNAVAILABLE);
    let base = serve(stub.clone()).await;
    let mut session = session_for(&base).await;
    fill_to_review(&mut session, true).await;

    let err = session.next().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
    assert_eq!(session.stage(), Stage::Active(Step::Review));
    assert!(matches!(session.checkout().submission(), Submission::Failed(_)));

    // Retry is a fresh submission with a new request id
    assert!(session.next().await.is_err());
    let orders = stub.orders.lock().unwrap();
    assert_eq!(orders.len(), 2);
    assert_ne!(
        orders[0].0.get(REQUEST_ID_HEADER),
        orders[1].0.get(REQUEST_ID_HEADER)
    );
}
