//! Handler identifier resolution — method+path → CamelCase identifier.

/// Derive the handler identifier for an HTTP method and URL path.
///
/// The method is uppercased. The root path maps to `{METHOD}Root`. Any other
/// path is split on `/` (empty segments from repeated slashes are dropped),
/// each segment is split on `-` and `_` and camel-cased per word, and the
/// transformed segments are concatenated after the method:
///
/// ```
/// use devrack_adapter_http::resolve::resolve;
///
/// assert_eq!(resolve("get", "/"), "GETRoot");
/// assert_eq!(resolve("GET", "/memory"), "GETMemory");
/// assert_eq!(resolve("POST", "/cpu_stats/some-path"), "POSTCpuStatsSomePath");
/// ```
///
/// Pure and total: no I/O, no failure path, always returns a string. Note
/// that distinct paths can resolve to the same identifier (`/cpu/stats` and
/// `/cpu-stats` both yield `GETCpuStats`); the registry guards against
/// ambiguous *registrations*, so colliding requests deterministically hit
/// the single registered handler.
#[must_use]
pub fn resolve(method: &str, path: &str) -> String {
    let method = method.to_uppercase();
    if path == "/" {
        return format!("{method}Root");
    }

    let mut identifier = method;
    for segment in path.trim_matches('/').split('/') {
        if segment.is_empty() {
            continue;
        }
        for word in segment.split(['-', '_']) {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                identifier.extend(first.to_uppercase());
                identifier.push_str(&chars.as_str().to_lowercase());
            }
        }
    }
    identifier
}
