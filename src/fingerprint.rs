//! Low-entropy client fingerprint for campaign deduplication.
//!
//! Not authentication: users behind the same NAT with the same browser
//! configuration collide, and that false positive is accepted. What
//! matters is determinism: the same header triple must always produce
//! the same 16 characters.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine};

const UNKNOWN: &str = "unknown";
const FINGERPRINT_LEN: usize = 16;

/// Derive the fingerprint from request headers. Total function; any
/// missing header is replaced by the literal "unknown".
pub fn client_fingerprint(headers: &HeaderMap) -> String {
    let ip = client_ip(headers);
    let user_agent = header_or_unknown(headers, "user-agent");
    let language = header_or_unknown(headers, "accept-language");

    fingerprint_from_parts(&ip, &user_agent, &language)
}

/// First x-forwarded-for entry, then x-real-ip, then "unknown".
/// Mirrors the reverse-proxy setups this service sits behind.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(ip) = forwarded_for.to_str() {
            return ip.split(',').next().unwrap_or(UNKNOWN).trim().to_string();
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.to_string();
        }
    }

    UNKNOWN.to_string()
}

fn header_or_unknown(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(UNKNOWN)
        .to_string()
}

fn fingerprint_from_parts(ip: &str, user_agent: &str, language: &str) -> String {
    let raw = format!("{}|{}|{}", ip, user_agent, language);
    let encoded = STANDARD.encode(raw.as_bytes());
    encoded.chars().take(FINGERPRINT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(ip: Option<&str>, ua: Option<&str>, lang: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(ip) = ip {
            map.insert("x-forwarded-for", HeaderValue::from_str(ip).unwrap());
        }
        if let Some(ua) = ua {
            map.insert("user-agent", HeaderValue::from_str(ua).unwrap());
        }
        if let Some(lang) = lang {
            map.insert("accept-language", HeaderValue::from_str(lang).unwrap());
        }
        map
    }

    #[test]
    fn test_deterministic_for_identical_headers() {
        let h = headers(Some("203.0.113.7"), Some("Mozilla/5.0"), Some("ja-JP"));
        assert_eq!(client_fingerprint(&h), client_fingerprint(&h));
    }

    #[test]
    fn test_fixed_length() {
        let h = headers(Some("203.0.113.7"), Some("Mozilla/5.0"), Some("ja-JP"));
        assert_eq!(client_fingerprint(&h).len(), FINGERPRINT_LEN);

        let empty = headers(None, None, None);
        assert_eq!(client_fingerprint(&empty).len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_missing_headers_become_unknown() {
        let empty = headers(None, None, None);
        let expected = fingerprint_from_parts(UNKNOWN, UNKNOWN, UNKNOWN);
        assert_eq!(client_fingerprint(&empty), expected);
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut h = headers(Some("203.0.113.7, 10.0.0.1"), Some("ua"), Some("en"));
        let first_only = headers(Some("203.0.113.7"), Some("ua"), Some("en"));
        assert_eq!(client_fingerprint(&h), client_fingerprint(&first_only));

        // x-real-ip is only the fallback
        h.insert("x-real-ip", HeaderValue::from_static("192.0.2.1"));
        assert_eq!(client_fingerprint(&h), client_fingerprint(&first_only));
    }

    #[test]
    fn test_distinct_inputs_usually_differ() {
        let a = client_fingerprint(&headers(Some("203.0.113.7"), Some("Mozilla/5.0"), Some("ja")));
        let b = client_fingerprint(&headers(Some("198.51.100.2"), Some("Mozilla/5.0"), Some("ja")));
        assert_ne!(a, b);
    }
}
