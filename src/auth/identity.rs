//! Identity resolution for authenticated requests
//!
//! Turns a request's authorization header into the authenticated principal.
//! A valid signature alone is not enough - the principal must still exist in
//! the store, so a token issued before the user was deleted resolves to
//! nothing.

use hyper::header::AUTHORIZATION;
use hyper::HeaderMap;

use crate::auth::TokenService;
use crate::db::{Store, UserRow};
use crate::types::{ApiError, Result};

/// Extract the bearer token from an authorization header, if present and
/// well-formed.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the authenticated principal for a request.
///
/// Every failure mode - missing or malformed header, unverifiable or expired
/// token, vanished user - is `Unauthenticated`.
pub async fn resolve(
    store: &Store,
    tokens: &TokenService,
    headers: &HeaderMap,
) -> Result<UserRow> {
    let token = extract_bearer(headers)
        .ok_or_else(|| ApiError::Unauthenticated("Not authenticated".to_string()))?;

    let user_id = tokens
        .verify(token)
        .ok_or_else(|| ApiError::Unauthenticated("Could not validate credentials".to_string()))?;

    store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated("Could not validate credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use hyper::header::HeaderValue;
    use jsonwebtoken::Algorithm;
    use uuid::Uuid;

    fn token_service() -> TokenService {
        TokenService::new(&AuthConfig {
            secret: "test-secret".to_string(),
            algorithm: Algorithm::HS256,
            token_ttl: chrono::Duration::minutes(30),
        })
    }

    async fn test_store() -> Store {
        let url = format!("sqlite:file:{}?mode=memory&cache=shared", Uuid::new_v4());
        Store::connect(&url).await.unwrap()
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn extract_bearer_requires_scheme_prefix() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn resolve_happy_path() {
        let store = test_store().await;
        let tokens = token_service();

        let user = store.create_user("a@x.com", "digest").await.unwrap();
        let token = tokens
            .issue(Uuid::parse_str(&user.id).unwrap())
            .unwrap();

        let resolved = resolve(&store, &tokens, &bearer_headers(&token))
            .await
            .unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "a@x.com");
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let store = test_store().await;
        let tokens = token_service();

        let err = resolve(&store, &tokens, &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn garbage_token_is_unauthenticated() {
        let store = test_store().await;
        let tokens = token_service();

        let err = resolve(&store, &tokens, &bearer_headers("garbage"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_unauthenticated() {
        let store = test_store().await;
        let tokens = token_service();

        let user = store.create_user("gone@x.com", "digest").await.unwrap();
        let user_id = Uuid::parse_str(&user.id).unwrap();
        let token = tokens.issue(user_id).unwrap();

        // The signature still checks out, but the lookup is mandatory
        store.delete_user(user_id).await.unwrap();
        let err = resolve(&store, &tokens, &bearer_headers(&token))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated(_)));
    }
}
