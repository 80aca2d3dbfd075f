use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::json;

use super::domain::{ContactRequest, DispatchError};
use super::notifier::LeadNotifier;
use super::service::LeadDispatcher;

pub const CONTACT_PATH: &str = "/api/contact";

/// Router exposing the lead submission endpoint.
pub fn contact_router<N>(dispatcher: Arc<LeadDispatcher<N>>) -> Router
where
    N: LeadNotifier + 'static,
{
    Router::new()
        .route(CONTACT_PATH, post(contact_handler::<N>))
        .with_state(dispatcher)
}

pub(crate) async fn contact_handler<N>(
    State(dispatcher): State<Arc<LeadDispatcher<N>>>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Response
where
    N: LeadNotifier + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "rejected contact payload");
            return error_response(DispatchError::MalformedPayload(rejection.body_text()));
        }
    };

    match dispatcher.dispatch(request).await {
        Ok(accepted) => (StatusCode::OK, Json(accepted)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: DispatchError) -> Response {
    let payload = json!({ "error": err.public_message() });
    (err.status_code(), Json(payload)).into_response()
}
