use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};

use super::AppState;
use super::models::SearchRequest;

pub const USERNAME_REQUIRED: &str = "Username is required";

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, (StatusCode, String)> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            log::debug!("rejected search body: {rejection}");
            SearchRequest::default()
        }
    };
    let Some(username) = request.username() else {
        return Err((StatusCode::BAD_REQUEST, USERNAME_REQUIRED.to_string()));
    };

    // Headers are committed from here on; failures travel as error frames.
    let events = state
        .bridge
        .search(username)
        .map(|event| Event::default().json_data(event));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.keep_alive)))
}
