//! Normalized view of an incoming HTTP request.
//!
//! A descriptor is built once per accepted connection, handed to the resolved
//! handler, and discarded after the response is written. Handlers that bridge
//! into another component forward the descriptor (or a subset of it) as the
//! gateway payload — never the raw body stream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Immutable request snapshot: method, path, and headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method, always uppercased.
    pub method: String,
    /// URL path as received (e.g. `/memory`, `/cpu/stats`).
    pub path: String,
    /// Request headers as plain string pairs.
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    /// Build a descriptor, normalizing the method to uppercase.
    #[must_use]
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            method: method.into().to_uppercase(),
            path: path.into(),
            headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_uppercase_method() {
        let descriptor = RequestDescriptor::new("get", "/memory", HashMap::new());
        assert_eq!(descriptor.method, "GET");
    }

    #[test]
    fn should_keep_path_untouched() {
        let descriptor = RequestDescriptor::new("GET", "/cpu//stats/", HashMap::new());
        assert_eq!(descriptor.path, "/cpu//stats/");
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let mut headers = HashMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        let descriptor = RequestDescriptor::new("POST", "/some-path", headers);

        let json = serde_json::to_string(&descriptor).unwrap();
        let parsed: RequestDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(descriptor, parsed);
    }
}
