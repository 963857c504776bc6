//! Request key hashing.

use sha2::{Digest, Sha256};

use crate::request::RequestKey;

/// Compute the storage key for a request.
///
/// Method and URL are both part of the key, so a HEAD and a GET for the same URL
/// never share an entry.
pub fn compute_cache_key(key: &RequestKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(key.url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(method: &str, url: &str) -> RequestKey {
        RequestKey { method: method.into(), url: url.into() }
    }

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key(&key("GET", "https://example.com/style.css"));
        let hash2 = compute_cache_key(&key("GET", "https://example.com/style.css"));
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case_insensitive() {
        let upper = compute_cache_key(&key("GET", "https://example.com/"));
        let lower = compute_cache_key(&key("get", "https://example.com/"));
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_cache_key(&key("GET", "https://example.com/"));
        let head = compute_cache_key(&key("HEAD", "https://example.com/"));
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key(&key("GET", "https://example.com"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
