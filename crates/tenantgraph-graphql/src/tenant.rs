//! Tenant id resolution from incoming requests.

use axum::http::{HeaderMap, HeaderName};

/// Extracts the tenant id of a request.
///
/// Returning `None` lets the handler fall back to the first registered tenant.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

impl<F> TenantResolver for F
where
    F: Fn(&HeaderMap) -> Option<String> + Send + Sync,
{
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        self(headers)
    }
}

/// Reads the tenant id from a request header.
///
/// Empty or non-UTF-8 values count as absent.
#[derive(Debug, Clone)]
pub struct HeaderTenantResolver {
    header: HeaderName,
}

impl HeaderTenantResolver {
    pub const DEFAULT_HEADER: &'static str = "x-tenant-id";

    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Creates a resolver for a header given by name.
    ///
    /// # Errors
    ///
    /// Returns an error if `header` is not a valid header name.
    pub fn from_name(header: &str) -> Result<Self, String> {
        HeaderName::from_bytes(header.as_bytes())
            .map(Self::new)
            .map_err(|e| format!("invalid tenant header '{header}': {e}"))
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for HeaderTenantResolver {
    fn default() -> Self {
        Self::new(HeaderName::from_static(Self::DEFAULT_HEADER))
    }
}

impl TenantResolver for HeaderTenantResolver {
    fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_resolver() {
        let resolver = HeaderTenantResolver::default();
        let mut headers = HeaderMap::new();
        assert_eq!(resolver.resolve(&headers), None);

        headers.insert("x-tenant-id", HeaderValue::from_static("acme"));
        assert_eq!(resolver.resolve(&headers).as_deref(), Some("acme"));

        headers.insert("x-tenant-id", HeaderValue::from_static("  "));
        assert_eq!(resolver.resolve(&headers), None);
    }

    #[test]
    fn test_custom_header() {
        let resolver = HeaderTenantResolver::from_name("X-Org").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-org", HeaderValue::from_static("globex"));
        assert_eq!(resolver.resolve(&headers).as_deref(), Some("globex"));

        assert!(HeaderTenantResolver::from_name("bad header").is_err());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &HeaderMap| Some("fixed".to_string());
        assert_eq!(
            TenantResolver::resolve(&resolver, &HeaderMap::new()).as_deref(),
            Some("fixed")
        );
    }
}
