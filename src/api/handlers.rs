//! Request handlers for the REST API

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::warn;

use super::models::{ApiResponse, RepurposeApiRequest, TtsRequest};
use super::server::AppState;
use crate::history::{HistoryInput, HistoryItem};
use crate::repurpose::{RepurposeOutput, RepurposeRequest};

pub async fn health() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("ok".to_string()))
}

pub async fn repurpose(
    State(state): State<AppState>,
    Json(payload): Json<RepurposeApiRequest>,
) -> Response {
    let request = RepurposeRequest::new(payload.content, payload.output_type, payload.language);

    if let Err(e) = request.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<RepurposeOutput>::error(e.to_string())),
        )
            .into_response();
    }

    match state.repurposer.repurpose(&request).await {
        Ok(output) => {
            let input = HistoryInput {
                content: request.content.clone(),
                output_type: request.output_type,
                language: request.language.clone(),
            };
            if let Err(e) = state.history.record(input, output.clone()).await {
                warn!("Failed to record history entry: {}", e);
            }
            (StatusCode::OK, Json(ApiResponse::success(output))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<RepurposeOutput>::error(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn tts(State(state): State<AppState>, Json(payload): Json<TtsRequest>) -> Response {
    match state
        .synthesizer
        .synthesize(&payload.text, &payload.language_code)
        .await
    {
        Ok(audio) => (
            [(header::CONTENT_TYPE, audio.content_type())],
            audio.data,
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::<()>::error(e.to_string())),
        )
            .into_response(),
    }
}

pub async fn history_list(State(state): State<AppState>) -> Json<ApiResponse<Vec<HistoryItem>>> {
    Json(ApiResponse::success(state.history.list().await))
}

pub async fn history_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.history.get(&id).await {
        Some(item) => (StatusCode::OK, Json(ApiResponse::success(item))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<HistoryItem>::error(format!(
                "no history entry with id {}",
                id
            ))),
        )
            .into_response(),
    }
}

pub async fn history_delete(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.history.remove(&id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(id))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<String>::error(format!(
                "no history entry with id {}",
                id
            ))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<String>::error(e.to_string())),
        )
            .into_response(),
    }
}
