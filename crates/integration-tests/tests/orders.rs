//! End-to-end tests for order placement.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`teakspice-cli migrate`)
//! - The API server running (`cargo run -p teakspice-api`)
//! - `TEAKSPICE_DATABASE_URL` pointing at the server's database

use reqwest::{Method, StatusCode};
use serde_json::json;

use teakspice_integration_tests::{Session, pool, seed_product, stock_of};

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_order_rejected_when_stock_is_short() {
    let pool = pool().await;
    let product = seed_product(&pool, 30, 5).await;
    let session = Session::new().await;

    let (status, body) = Session::send(
        session.request(Method::POST, "/api/orders").json(&json!({
            "address": "1 Test Lane",
            "items": [{ "productId": product, "quantity": 10 }],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Insufficient stock");
    let detail = body["details"][0].as_str().expect("detail string");
    assert!(detail.ends_with("requested 10, only 5 available"), "{detail}");
    assert_eq!(body["shortfalls"][0]["available"], 5);

    assert_eq!(stock_of(&pool, product).await, 5);

    let (_, orders) = Session::send(session.request(Method::GET, "/api/orders")).await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_order_totals_decrements_and_empties_cart() {
    let pool = pool().await;
    let tray = seed_product(&pool, 100, 10).await;
    let spice = seed_product(&pool, 50, 3).await;
    let session = Session::new().await;

    Session::send(
        session
            .request(Method::POST, "/api/cart")
            .json(&json!({ "productId": tray, "quantity": 2 })),
    )
    .await;

    // The same product on two lines is one order line.
    let (status, body) = Session::send(
        session.request(Method::POST, "/api/orders").json(&json!({
            "address": "  1 Test Lane  ",
            "items": [
                { "productId": tray, "quantity": 1 },
                { "productId": spice, "quantity": 1 },
                { "productId": tray, "quantity": 1 },
            ],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["stockUpdated"], true);
    assert_eq!(body["order"]["total"], 250);
    assert_eq!(body["order"]["status"], "Processing");
    assert_eq!(body["order"]["address"], "1 Test Lane");
    assert_eq!(body["order"]["items"].as_array().map(Vec::len), Some(2));

    assert_eq!(stock_of(&pool, tray).await, 8);
    assert_eq!(stock_of(&pool, spice).await, 2);

    let (_, cart) = Session::send(session.request(Method::GET, "/api/cart")).await;
    assert_eq!(cart["items"], json!([]));

    let order_id = body["order"]["id"].as_i64().expect("order id");
    let (status, fetched) =
        Session::send(session.request(Method::GET, &format!("/api/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["total"], 250);

    let (_, listed) = Session::send(session.request(Method::GET, "/api/orders")).await;
    assert_eq!(listed[0]["id"], order_id);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_orders_are_private_to_their_owner() {
    let pool = pool().await;
    let product = seed_product(&pool, 10, 1).await;
    let owner = Session::new().await;
    let other = Session::new().await;

    let (_, body) = Session::send(owner.request(Method::POST, "/api/orders").json(&json!({
        "address": "1 Test Lane",
        "items": [{ "productId": product, "quantity": 1 }],
    })))
    .await;
    let order_id = body["order"]["id"].as_i64().expect("order id");

    let (status, _) =
        Session::send(other.request(Method::GET, &format!("/api/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_unknown_product_is_bad_request() {
    let session = Session::new().await;

    let (status, body) = Session::send(
        session.request(Method::POST, "/api/orders").json(&json!({
            "address": "1 Test Lane",
            "items": [{ "productId": 2_000_000_000, "quantity": 1 }],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product not found: 2000000000");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_concurrent_orders_never_oversell() {
    let pool = pool().await;
    let product = seed_product(&pool, 20, 1).await;
    let first = Session::new().await;
    let second = Session::new().await;

    let order = json!({
        "address": "1 Test Lane",
        "items": [{ "productId": product, "quantity": 1 }],
    });

    let (a, b) = tokio::join!(
        Session::send(first.request(Method::POST, "/api/orders").json(&order)),
        Session::send(second.request(Method::POST, "/api/orders").json(&order)),
    );

    let statuses = [a.0, b.0];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(),
        1
    );
    assert_eq!(stock_of(&pool, product).await, 0);
}
