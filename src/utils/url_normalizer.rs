//! Destination URL normalization.
//!
//! Destinations may be submitted without a scheme (`example.com/page`); those
//! are taken to be HTTPS. Hostnames are lowercased and default ports dropped so
//! the stored destination has one canonical spelling. Paths, queries and
//! fragments are kept as submitted.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Prefixes `https://` unless the input already carries an explicit scheme.
pub fn with_default_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Normalizes a destination URL.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs or URLs
/// without a host, and [`UrlNormalizationError::UnsupportedProtocol`] for
/// schemes other than HTTP(S).
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_url("Example.com/Path").unwrap(), "https://example.com/Path");
/// assert_eq!(normalize_url("http://example.com:80/").unwrap(), "http://example.com/");
/// ```
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let candidate = with_default_scheme(input);
    if candidate == "https://" {
        return Err(UrlNormalizationError::InvalidFormat("empty URL".to_string()));
    }

    let mut url =
        Url::parse(&candidate).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    let Some(host) = url.host_str() else {
        return Err(UrlNormalizationError::InvalidFormat("missing host".to_string()));
    };

    let host_lowercase = host.to_ascii_lowercase();
    url.set_host(Some(&host_lowercase)).map_err(|_| {
        UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
    })?;

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}
