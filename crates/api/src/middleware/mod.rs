//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (when an allowed origin is configured)
//! 5. Rate limiting on register/login (governor)

pub mod auth;
pub mod json;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireAuth;
pub use json::ApiJson;
pub use rate_limit::auth_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
