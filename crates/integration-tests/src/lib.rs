//! End-to-end tests for the Teakspice API.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p teakspice-cli -- migrate
//! TEAKSPICE_TRUST_PROXY_HEADERS=true cargo run -p teakspice-api
//!
//! # Run the ignored end-to-end tests
//! cargo test -p teakspice-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `TEAKSPICE_BASE_URL` - API base URL (default `http://localhost:8080`)
//! - `TEAKSPICE_DATABASE_URL` - Same database the server uses, for seeding
//!   products with known stock
//!
//! Every session sends its own `X-Forwarded-For` address so the auth rate
//! limit does not trip across tests. The server only honours that header
//! with `TEAKSPICE_TRUST_PROXY_HEADERS=true`.

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("TEAKSPICE_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Connect to the database the server is using.
pub async fn pool() -> PgPool {
    let url = std::env::var("TEAKSPICE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("TEAKSPICE_DATABASE_URL or DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to database")
}

/// Insert a product with a unique name and return its ID.
pub async fn seed_product(pool: &PgPool, price: i64, stock: i32) -> i64 {
    let (id,): (i32,) = sqlx::query_as(
        r"
        INSERT INTO shop.product (name, price, image, description, stock)
        VALUES ($1, $2, '', 'integration test product', $3)
        RETURNING id
        ",
    )
    .bind(format!("test-product-{}", Uuid::new_v4()))
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Failed to seed product");

    i64::from(id)
}

/// Read a product's current stock straight from the database.
pub async fn stock_of(pool: &PgPool, product_id: i64) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM shop.product WHERE id = $1")
        .bind(i32::try_from(product_id).expect("product id fits in i32"))
        .fetch_one(pool)
        .await
        .expect("Failed to read stock");
    stock
}

/// A registered, logged-in user.
///
/// Each session presents its own forwarded client address so tests do not
/// share a rate-limit bucket.
pub struct Session {
    pub client: Client,
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub token: String,
    pub user: Value,
    client_ip: String,
}

impl Session {
    /// Register a fresh user and log them in.
    pub async fn new() -> Self {
        let client = Client::new();
        let base_url = base_url();
        let client_ip = fake_client_ip();
        let email = format!("test-{}@example.com", Uuid::new_v4());
        let password = "correct horse battery staple".to_string();

        let resp = client
            .post(format!("{base_url}/api/register"))
            .header("x-forwarded-for", &client_ip)
            .json(&json!({
                "name": "Test User",
                "email": email,
                "phone": "555-0100",
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(resp.status(), StatusCode::OK, "register failed");

        let resp = client
            .post(format!("{base_url}/api/login"))
            .header("x-forwarded-for", &client_ip)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::OK, "login failed");

        let body: Value = resp.json().await.expect("Failed to parse login response");
        let token = body["token"]
            .as_str()
            .expect("login response has a token")
            .to_string();

        Self {
            client,
            base_url,
            email,
            password,
            token,
            user: body["user"].clone(),
            client_ip,
        }
    }

    /// Unauthenticated request from this session's client address.
    #[must_use]
    pub fn anonymous(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("x-forwarded-for", &self.client_ip)
    }

    /// Request carrying this session's bearer token.
    #[must_use]
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.anonymous(method, path).bearer_auth(&self.token)
    }

    /// Send a request and return its status and JSON body.
    pub async fn send(builder: RequestBuilder) -> (StatusCode, Value) {
        let resp = builder.send().await.expect("Request failed");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

/// A synthetic client address, unique enough per session.
fn fake_client_ip() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("203.0.{}.{}", bytes[0], bytes[1])
}
