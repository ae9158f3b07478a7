//! Credential extraction from inbound requests

use axum::http::{HeaderMap, header};
use axum_extra::extract::CookieJar;

use crate::core::constants::{ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, REFRESH_TOKEN_HEADER};

/// Where the access token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Bearer,
    Cookie,
}

/// Tokens presented by the caller
#[derive(Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub source: CredentialSource,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("source", &self.source)
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Bearer header first, then the access cookie. `None` when neither is present.
    pub fn extract(headers: &HeaderMap, jar: &CookieJar) -> Option<Self> {
        let (access_token, source) = match bearer_token(headers) {
            Some(token) => (token.to_string(), CredentialSource::Bearer),
            None => {
                let cookie = jar.get(ACCESS_COOKIE_NAME)?;
                let value = cookie.value();
                if value.is_empty() {
                    return None;
                }
                (value.to_string(), CredentialSource::Cookie)
            }
        };

        Some(Self {
            access_token,
            refresh_token: refresh_token(headers, jar),
            source,
        })
    }
}

/// Extract a bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Refresh token from the refresh cookie or the `X-Refresh-Token` header
pub fn refresh_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .or_else(|| {
            headers
                .get(REFRESH_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_bearer_token_valid() {
        let h = headers(&[("authorization", "Bearer abc.def")]);
        assert_eq!(bearer_token(&h), Some("abc.def"));

        let h = headers(&[("authorization", "bearer abc")]);
        assert_eq!(bearer_token(&h), Some("abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token(&headers(&[("authorization", "Basic dXNlcg==")])), None);
        assert_eq!(bearer_token(&headers(&[("authorization", "Bearer ")])), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_prefers_bearer_over_cookie() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_COOKIE_NAME, "from-cookie"));
        let h = headers(&[("authorization", "Bearer from-header")]);

        let creds = Credentials::extract(&h, &jar).unwrap();
        assert_eq!(creds.access_token, "from-header");
        assert_eq!(creds.source, CredentialSource::Bearer);
    }

    #[test]
    fn test_extract_from_cookies() {
        let jar = CookieJar::new()
            .add(Cookie::new(ACCESS_COOKIE_NAME, "access"))
            .add(Cookie::new(REFRESH_COOKIE_NAME, "refresh"));

        let creds = Credentials::extract(&HeaderMap::new(), &jar).unwrap();
        assert_eq!(creds.access_token, "access");
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(creds.source, CredentialSource::Cookie);
    }

    #[test]
    fn test_extract_refresh_from_header() {
        let h = headers(&[
            ("authorization", "Bearer access"),
            ("x-refresh-token", "refresh-header"),
        ]);
        let creds = Credentials::extract(&h, &CookieJar::new()).unwrap();
        assert_eq!(creds.refresh_token.as_deref(), Some("refresh-header"));
    }

    #[test]
    fn test_extract_nothing() {
        assert!(Credentials::extract(&HeaderMap::new(), &CookieJar::new()).is_none());

        // A refresh token alone is not an access credential
        let jar = CookieJar::new().add(Cookie::new(REFRESH_COOKIE_NAME, "refresh"));
        assert!(Credentials::extract(&HeaderMap::new(), &jar).is_none());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let creds = Credentials {
            access_token: "secret-access".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            source: CredentialSource::Bearer,
        };
        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
