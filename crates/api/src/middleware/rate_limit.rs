//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only registration and login are limited (~10/min per client IP), which is
//! enough to slow down password guessing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Key extractor that buckets requests by client IP.
///
/// The peer address of the TCP connection is the key. `X-Forwarded-For` and
/// `X-Real-IP` are client-controlled, so they are only consulted when the
/// server sits behind a proxy that overwrites them.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self { trust_proxy_headers }
    }
}

/// Client IP named by the proxy headers, `X-Forwarded-For` first.
fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // First IP in the chain is the original client
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        // Requires `into_make_service_with_connect_info`
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
///
/// Uses `ClientIpKeyExtractor` to key buckets by client IP.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
/// Applied to `/api/register` and `/api/login`. Proxy headers pick the
/// bucket only when `trust_proxy_headers` is set.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
