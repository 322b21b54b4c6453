//! Router for the events API

use std::sync::{Arc, RwLock};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use super::public;
use crate::api::auth::{Actor, AuthUser};
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::events::{EventId, EventService};

type SharedState = Arc<RwLock<AppState>>;

// Clone the service out so the lock isn't held across an await
fn events(state: &SharedState) -> Arc<EventService> {
    Arc::clone(&state.read().expect("Unable to read shared state").events)
}

async fn create_event(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Json(input): Json<public::EventInput>,
) -> Result<(StatusCode, Json<public::EventCreatedResponse>), ApiError> {
    let event_id = events(&state).create_event(actor.as_ref(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(public::EventCreatedResponse { event_id }),
    ))
}

async fn edit_event(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(input): Json<public::EventInput>,
) -> Result<StatusCode, ApiError> {
    events(&state)
        .edit_event(actor.as_ref(), &EventId::from(id), input)
        .await?;
    Ok(StatusCode::OK)
}

async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<public::EventView>, ApiError> {
    let view = events(&state).get_event(&EventId::from(id)).await?;
    Ok(Json(view))
}

async fn delete_event(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    events(&state)
        .delete_event(&user.id, &EventId::from(id))
        .await?;
    Ok(StatusCode::OK)
}

async fn submit_response(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(submission): Json<public::ResponseSubmission>,
) -> Result<Json<Value>, ApiError> {
    events(&state)
        .submit_response(actor.as_ref(), &EventId::from(id), submission)
        .await?;
    Ok(Json(json!({})))
}

async fn delete_response(
    State(state): State<SharedState>,
    Actor(actor): Actor,
    Path(id): Path<String>,
    Json(request): Json<public::DeleteResponseRequest>,
) -> Result<Json<Value>, ApiError> {
    events(&state)
        .delete_response(actor.as_ref(), &EventId::from(id), request)
        .await?;
    Ok(Json(json!({})))
}

// Linked from reminder emails so it doesn't require sign in
async fn mark_responded(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<public::MarkRespondedRequest>,
) -> Result<Json<Value>, ApiError> {
    events(&state)
        .mark_responded(&EventId::from(id), &request.email)
        .await?;
    Ok(Json(json!({})))
}

async fn decline_invite(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    events(&state)
        .decline_invite(&user, &EventId::from(id))
        .await?;
    Ok(Json(json!({})))
}

async fn duplicate_event(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(request): Json<public::DuplicateRequest>,
) -> Result<(StatusCode, Json<public::EventCreatedResponse>), ApiError> {
    let event_id = events(&state)
        .duplicate_event(&user.id, &EventId::from(id), request)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(public::EventCreatedResponse { event_id }),
    ))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(create_event))
        .route(
            "/{id}",
            get(get_event).put(edit_event).delete(delete_event),
        )
        .route(
            "/{id}/response",
            post(submit_response).delete(delete_response),
        )
        .route("/{id}/responded", post(mark_responded))
        .route("/{id}/decline", post(decline_invite))
        .route("/{id}/duplicate", post(duplicate_event))
}
