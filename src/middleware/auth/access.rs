//! access token (JWT) verification → AuthCtx in request extensions
//!
//! This layer never rejects a request. A missing, malformed or invalid token
//! simply leaves the request without an `AuthCtx`; handlers then refuse it
//! through `AuthCtxExtractor` (401) or the role guard (403).

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::TokenVerifier;
use crate::state::AppState;

/// Applies bearer authentication to every route of `router`.
///
/// ```ignore
/// let routes = api::v1::routes();
/// let routes = middleware::auth::access::apply(routes, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 `from_fn` cannot take a State extractor, so state is passed via `from_fn_with_state`
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "authenticating request");

    if let Some(auth_ctx) = authenticate(&state.auth, req.headers()) {
        // handed to AuthCtxExtractor through request extensions
        req.extensions_mut().insert(auth_ctx);
    }

    next.run(req).await
}

/// Derives the caller identity from the `Authorization` header, if any.
pub fn authenticate(verifier: &TokenVerifier, headers: &HeaderMap) -> Option<AuthCtx> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        tracing::debug!("no authorization header");
        return None;
    };

    let Some(token) = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        tracing::warn!("authorization header is not a bearer token");
        return None;
    };

    tracing::debug!(token = %fingerprint(token), "bearer token extracted");

    match verifier.verify_verified(token) {
        Ok(verified) => {
            let roles: Vec<&str> = verified.roles.iter().map(|r| r.as_str()).collect();
            tracing::debug!(username = %verified.username, ?roles, "access token accepted");
            Some(AuthCtx::new(verified.username, verified.roles))
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                token = %fingerprint(token),
                "access token verification failed"
            );
            None
        }
    }
}

// Enough to correlate log lines without leaking a usable token.
fn fingerprint(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}…({} chars)", token.chars().count())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;
    use crate::services::auth::Role;
    use crate::testing::{mint_token, test_verifier};

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(authorization).unwrap(),
        );
        headers
    }

    #[test]
    fn missing_header_leaves_request_anonymous() {
        assert!(authenticate(&test_verifier(), &HeaderMap::new()).is_none());
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let verifier = test_verifier();

        assert!(authenticate(&verifier, &headers("Basic dXNlcjpwYXNz")).is_none());
        assert!(authenticate(&verifier, &headers("Bearer ")).is_none());
        assert!(authenticate(&verifier, &headers("bearer abc")).is_none());
    }

    #[test]
    fn invalid_token_leaves_request_anonymous() {
        assert!(authenticate(&test_verifier(), &headers("Bearer invalid.token.here")).is_none());
    }

    #[test]
    fn valid_token_installs_identity() {
        let token = mint_token("Alice\u{200B}", json!("ROLE_USER,ROLE_ADMIN"));

        let ctx = authenticate(&test_verifier(), &headers(&format!("Bearer {token}"))).unwrap();

        assert_eq!(ctx.username, "Alice");
        assert_eq!(ctx.roles, vec![Role::User, Role::Admin]);
        assert!(ctx.is_admin());
    }

    #[test]
    fn fingerprint_does_not_contain_the_whole_token() {
        let token = "abcdefghijklmnopqrstuvwxyz";
        let fp = fingerprint(token);

        assert!(fp.starts_with("abcdefgh"));
        assert!(!fp.contains(token));
        assert!(fp.contains("26 chars"));
    }
}
