//! Transport carrier: reading the session credential and the organization id
//! out of an inbound request.

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::{HeaderMap, header, request::Parts};

use crate::config::SessionConfig;

/// Path parameter that names the organization a request targets.
pub const ORG_ID_PARAM: &str = "org_id";

/// Extracts the session token from request headers.
#[derive(Clone, Debug)]
pub struct CredentialExtractor {
    cookie_name: String,
    allow_bearer: bool,
}

impl CredentialExtractor {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            allow_bearer: config.allow_bearer,
        }
    }

    /// The session cookie if present, else a bearer token when allowed.
    #[must_use]
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        Self::from_cookie(headers, &self.cookie_name).or_else(|| {
            if self.allow_bearer {
                Self::from_bearer(headers)
            } else {
                None
            }
        })
    }

    /// Extract a named cookie value from every `Cookie` header.
    #[must_use]
    pub fn from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == cookie_name)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Extract the token from `Authorization: Bearer <token>`.
    #[must_use]
    pub fn from_bearer(headers: &HeaderMap) -> Option<String> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// What the guards read from a request.
///
/// Built from the transport once per request; guards never look at raw
/// headers themselves, which keeps them testable without HTTP.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    credential: Option<String>,
    org_id: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credential(mut self, token: impl Into<String>) -> Self {
        self.credential = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// The organization id from the path, if the route carries one.
    #[must_use]
    pub fn org_id(&self) -> Option<&str> {
        self.org_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Read the credential and the `{org_id}` path parameter from a request.
    pub async fn from_parts(parts: &mut Parts, extractor: &CredentialExtractor) -> Self {
        let credential = extractor.extract(&parts.headers);
        let org_id = match RawPathParams::from_request_parts(parts, &()).await {
            Ok(params) => params
                .iter()
                .find(|(name, _)| *name == ORG_ID_PARAM)
                .map(|(_, value)| value.to_string()),
            Err(_) => None,
        };
        Self { credential, org_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn extractor(allow_bearer: bool) -> CredentialExtractor {
        CredentialExtractor::new(&SessionConfig {
            cookie_name: "bulkhead_session".to_string(),
            allow_bearer,
        })
    }

    #[test]
    fn test_cookie_is_found_among_others() {
        let map = headers(&[("cookie", "theme=dark; bulkhead_session=abc123; lang=en")]);
        assert_eq!(extractor(true).extract(&map).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let map = headers(&[
            ("cookie", "bulkhead_session=from-cookie"),
            ("authorization", "Bearer from-header"),
        ]);
        assert_eq!(extractor(true).extract(&map).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_bearer_fallback_respects_config() {
        let map = headers(&[("authorization", "Bearer tok")]);
        assert_eq!(extractor(true).extract(&map).as_deref(), Some("tok"));
        assert_eq!(extractor(false).extract(&map), None);
    }

    #[test]
    fn test_malformed_credentials_are_absent() {
        assert_eq!(CredentialExtractor::from_bearer(&headers(&[("authorization", "Basic xyz")])), None);
        assert_eq!(CredentialExtractor::from_bearer(&headers(&[("authorization", "Bearer ")])), None);
        assert_eq!(
            CredentialExtractor::from_cookie(&headers(&[("cookie", "bulkhead_session=")]), "bulkhead_session"),
            None
        );
        assert_eq!(
            CredentialExtractor::from_cookie(&headers(&[("cookie", "other_session=x")]), "bulkhead_session"),
            None
        );
    }

    #[tokio::test]
    async fn test_context_without_route_has_no_org_id() {
        let (mut parts, _) = Request::builder()
            .uri("/organizations/o1")
            .header("authorization", "Bearer tok")
            .body(())
            .unwrap()
            .into_parts();

        let ctx = RequestContext::from_parts(&mut parts, &extractor(true)).await;
        assert_eq!(ctx.credential(), Some("tok"));
        assert_eq!(ctx.org_id(), None);
    }

    #[test]
    fn test_blank_org_id_counts_as_missing() {
        let ctx = RequestContext::new().with_org_id("  ");
        assert_eq!(ctx.org_id(), None);
    }
}
