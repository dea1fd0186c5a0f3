//! Bearer-token lookup against the identity collaborator. Token issuance,
//! sessions, and verification flows live elsewhere; this side only resolves
//! `Authorization: Bearer <token>` to a known user.

use axum::http::{HeaderMap, header::AUTHORIZATION};

use crate::{error::AppError, model::User, store::Store};

pub async fn authenticate(store: &dyn Store, headers: &HeaderMap) -> Result<User, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    store
        .user_by_token(token)
        .await?
        .ok_or(AppError::Unauthenticated)
}
