//! Identity extractors. Sessions are handled by the layer in front of
//! this service, which forwards the signed-in user's id in a header.

use std::convert::Infallible;
use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use http::request::Parts;

use super::public::ApiError;
use crate::api::state::AppState;
use crate::events::{EventError, UserId};
use crate::users::User;

type SharedState = Arc<RwLock<AppState>>;

pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id_from_headers(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(UserId::from)
}

/// Whoever is making the request, if they are signed in.
pub struct Actor(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor(user_id_from_headers(parts)))
    }
}

/// A signed-in user known to the directory. Rejects with 401
/// otherwise.
pub struct AuthUser(pub User);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let Some(user_id) = user_id_from_headers(parts) else {
            return Err(EventError::Unauthenticated.into());
        };
        let users = Arc::clone(&state.read().expect("Unable to read shared state").users);
        match users.lookup_user(&user_id).await.map_err(EventError::from)? {
            Some(user) => Ok(AuthUser(user)),
            None => Err(EventError::Unauthenticated.into()),
        }
    }
}
