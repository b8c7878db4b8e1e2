//! End-to-end tests for carts and wishlists.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`teakspice-cli migrate`)
//! - The API server running (`cargo run -p teakspice-api`)
//! - `TEAKSPICE_DATABASE_URL` pointing at the server's database

use reqwest::{Method, StatusCode};
use serde_json::json;

use teakspice_integration_tests::{Session, pool, seed_product};

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cart_merges_updates_and_removes() {
    let pool = pool().await;
    let product = seed_product(&pool, 40, 10).await;
    let session = Session::new().await;

    for _ in 0..2 {
        let (status, _) = Session::send(
            session
                .request(Method::POST, "/api/cart")
                .json(&json!({ "productId": product, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, cart) = Session::send(session.request(Method::GET, "/api/cart")).await;
    let items = cart["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 4);

    let (status, cart) = Session::send(
        session
            .request(Method::PUT, &format!("/api/cart/{product}"))
            .json(&json!({ "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cart_rejects_unknown_product() {
    let session = Session::new().await;

    let (status, body) = Session::send(
        session
            .request(Method::POST, "/api/cart")
            .json(&json!({ "productId": 2_000_000_000, "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_cart_clear() {
    let pool = pool().await;
    let product = seed_product(&pool, 5, 3).await;
    let session = Session::new().await;

    Session::send(
        session
            .request(Method::POST, "/api/cart")
            .json(&json!({ "productId": product, "quantity": 1 })),
    )
    .await;

    let (status, _) = Session::send(session.request(Method::POST, "/api/cart/clear")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, cart) = Session::send(session.request(Method::GET, "/api/cart")).await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
#[ignore = "Requires running API server and PostgreSQL"]
async fn test_wishlist_add_is_idempotent() {
    let pool = pool().await;
    let product = seed_product(&pool, 15, 1).await;
    let session = Session::new().await;

    for _ in 0..2 {
        let (status, _) = Session::send(
            session
                .request(Method::POST, "/api/wishlist")
                .json(&json!({ "productId": product })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, wishlist) = Session::send(session.request(Method::GET, "/api/wishlist")).await;
    assert_eq!(wishlist["productIds"], json!([product]));

    let (status, wishlist) = Session::send(
        session.request(Method::DELETE, &format!("/api/wishlist/{product}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wishlist["productIds"], json!([]));
}
