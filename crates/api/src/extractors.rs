//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use komuna_db::entities::admin;

/// Authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub admin::Model);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get admin from request extensions (set by auth middleware)
        parts
            .extensions
            .get::<admin::Model>()
            .cloned()
            .map(AuthAdmin)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

/// Optional authenticated admin extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthAdmin(pub Option<admin::Model>);

impl<S> FromRequestParts<S> for MaybeAuthAdmin
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<admin::Model>().cloned()))
    }
}
