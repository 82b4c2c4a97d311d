//! Axum extractors

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use larder_types::SubjectId;

use crate::error::ApiError;

/// Header carrying the authenticated subject, set by the upstream auth gateway
pub const SUBJECT_HEADER: &str = "x-subject-id";

/// Subject the request acts on behalf of
#[derive(Debug, Clone, Copy)]
pub struct Subject(pub SubjectId);

impl<S> FromRequestParts<S> for Subject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(SUBJECT_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| SubjectId::parse(value.trim()).ok())
            .map(Self)
            .ok_or(ApiError::Unauthenticated)
    }
}
