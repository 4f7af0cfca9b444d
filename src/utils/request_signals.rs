//! Extraction of classification signals from request headers.

use axum::http::{HeaderMap, header};

use crate::domain::classifier::RequestSignals;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Collects every `X-Forwarded-For` value, in order, and the User-Agent.
///
/// Values that are not valid UTF-8 are skipped; an empty User-Agent is
/// treated as missing.
pub fn signals_from_headers(headers: &HeaderMap) -> RequestSignals {
    let forwarded_for = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .map(str::to_string);

    RequestSignals::new(forwarded_for, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_collects_all_forwarded_values() {
        let mut headers = HeaderMap::new();
        headers.append(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.1"));
        headers.append(
            X_FORWARDED_FOR,
            HeaderValue::from_static("10.0.0.2, 52.165.149.97"),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));

        let signals = signals_from_headers(&headers);

        assert_eq!(
            signals.forwarded_for,
            vec!["203.0.113.1".to_string(), "10.0.0.2, 52.165.149.97".to_string()]
        );
        assert_eq!(signals.user_agent.as_deref(), Some("Mozilla/5.0"));
    }

    #[test]
    fn test_missing_headers() {
        let signals = signals_from_headers(&HeaderMap::new());
        assert!(signals.forwarded_for.is_empty());
        assert!(signals.user_agent.is_none());
    }

    #[test]
    fn test_blank_user_agent_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("  "));
        assert!(signals_from_headers(&headers).user_agent.is_none());
    }
}
