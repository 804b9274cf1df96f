//! Resolves the acting identity for a request.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::AppState;
use crate::models::Actor;

pub const ACTOR_HEADER: &str = "x-actor";

/// The actor named by the `X-Actor` header, or the configured fallback
/// identity when the header is missing or blank.
#[derive(Debug, Clone)]
pub struct RequestActor(pub Actor);

impl FromRequestParts<AppState> for RequestActor {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Actor::new)
            .unwrap_or_else(|| state.fallback_actor.clone());
        Ok(Self(actor))
    }
}
