use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::survey::SubmitterMeta;

/// Extracts submitter metadata from forwarding and client headers. Both
/// fields are optional; a bare request yields an anonymous submission.
pub struct Submitter(pub SubmitterMeta);

impl<S: Send + Sync> FromRequestParts<S> for Submitter {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ip_address = parts
            .headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                parts
                    .headers
                    .get("X-Real-IP")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned)
            });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Ok(Submitter(SubmitterMeta {
            ip_address,
            user_agent,
        }))
    }
}
