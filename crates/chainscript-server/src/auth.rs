use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ServerResult;

/// Who is making a request. Verification votes are recorded under `name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self { name: "anonymous".into() }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read `Authorization: Bearer <token>`. Anything else is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self::Bearer(token.to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Takes the bearer token itself as the caller's name.
///
/// Tokens are not checked against any identity service; swap in another
/// [`AuthProvider`] to do that.
pub struct BearerIdentityAuth;

#[async_trait]
impl AuthProvider for BearerIdentityAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => Ok(Identity::user(token.as_str())),
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(auth: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        map
    }

    #[test]
    fn bearer_header_is_parsed() {
        assert_eq!(
            Credentials::from_headers(&headers("Bearer bob")),
            Credentials::Bearer("bob".into())
        );
    }

    #[test]
    fn other_schemes_are_anonymous() {
        assert_eq!(Credentials::from_headers(&HeaderMap::new()), Credentials::Anonymous);
        assert_eq!(Credentials::from_headers(&headers("Basic Ym9i")), Credentials::Anonymous);
        assert_eq!(Credentials::from_headers(&headers("Bearer   ")), Credentials::Anonymous);
    }

    #[tokio::test]
    async fn bearer_token_names_the_caller() {
        let auth = BearerIdentityAuth;
        let id = auth.authenticate(&Credentials::Bearer("carol".into())).await.unwrap();
        assert_eq!(id, Identity::user("carol"));

        let anon = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert_eq!(anon, Identity::anonymous());
    }
}
