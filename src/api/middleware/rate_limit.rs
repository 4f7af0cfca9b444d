//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

const PER_SECOND: u64 = 2;
const BURST_SIZE: u32 = 50;

type Layer<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn config<K: KeyExtractor>(extractor: K) -> Arc<GovernorConfig<K, NoOpMiddleware<QuantaInstant>>> {
    Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(extractor)
            .per_second(PER_SECOND)
            .burst_size(BURST_SIZE)
            .finish()
            .expect("non-zero rate limit configuration"),
    )
}

/// Creates the rate limiter for the `/api` routes, keyed by peer address.
///
/// # Limits
///
/// - **Rate**: 2 requests per second per client IP
/// - **Burst**: 50 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`. The server
/// must be served with connect info so the peer address is available.
///
/// # Panics
///
/// Never in practice: the constants above are non-zero, which is all the
/// builder checks.
pub fn layer() -> Layer<PeerIpKeyExtractor> {
    GovernorLayer::new(config(PeerIpKeyExtractor))
}

/// Same limits as [`layer`], keyed by the client IP a reverse proxy reports
/// (`X-Forwarded-For`, `X-Real-IP`, `Forwarded`), falling back to the peer.
///
/// Only use behind a proxy that overwrites these headers; otherwise clients
/// can pick their own key.
pub fn proxy_layer() -> Layer<SmartIpKeyExtractor> {
    GovernorLayer::new(config(SmartIpKeyExtractor))
}
