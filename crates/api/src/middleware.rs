//! Bearer-token authentication middleware.
//!
//! Verifies the access token, then re-reads the user so that role or
//! permission changes and deactivation take effect on the next request, not
//! at the token's natural expiry. The result is a typed [`AuthContext`] in
//! the request extensions; downstream handlers receive it explicitly
//! instead of a duck-typed request mutation.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use sentra_auth::{TokenCodec, TokenError};
use sentra_core::AuthError;
use sentra_infra::{AccountService, CredentialStore};

use crate::errors::error_to_response;

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<TokenCodec>,
    pub store: Arc<dyn CredentialStore>,
    pub accounts: AccountService,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let ctx = authenticate(&state, req.headers())
        .await
        .map_err(|e| error_to_response(&e))?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

async fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<sentra_auth::AuthContext, AuthError> {
    let token = extract_bearer(headers)?;

    let claims = state.codec.verify_access(token).map_err(|e| match e {
        TokenError::Expired => AuthError::authentication("token has expired"),
        _ => AuthError::authentication("invalid token"),
    })?;

    // Fresh read: the token's embedded snapshot is not trusted here.
    let user = state
        .store
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| AuthError::authentication("user not found"))?;

    if !user.is_active {
        return Err(AuthError::authentication("account is deactivated"));
    }

    state.accounts.load_context(&user).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AuthError::authentication("access token is required"))?;

    let header = header
        .to_str()
        .map_err(|_| AuthError::authentication("access token is required"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::authentication("access token is required"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::authentication("access token is required"));
    }

    Ok(token)
}
