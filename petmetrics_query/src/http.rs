//! Axum router exposing a [`TimeBucketedQuery`] at `/v1/metrics/{granularity}`.
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::Value;
use thiserror::Error;

use crate::{
    QueryError, TimeBucketedQuery,
    types::{ErrorResponse, Granularity, QueryResponse},
};

#[derive(Error, Debug)]
pub enum HttpQueryError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<QueryError> for HttpQueryError {
    fn from(error: QueryError) -> Self {
        let message = error.to_string();
        match error {
            QueryError::UnknownGranularity { .. } => HttpQueryError::NotFound(message),
            QueryError::InvalidEvent { .. } => HttpQueryError::BadRequest(message),
            QueryError::InvalidLabel { .. } => HttpQueryError::Internal(message),
        }
    }
}

impl IntoResponse for HttpQueryError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            HttpQueryError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpQueryError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpQueryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = Json(ErrorResponse {
            message: self.to_string(),
        });

        (status_code, response).into_response()
    }
}

pub struct HttpQueryServer {
    provider: Arc<dyn TimeBucketedQuery>,
}

impl HttpQueryServer {
    pub fn new(provider: Arc<dyn TimeBucketedQuery>) -> Self {
        Self { provider }
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route("/v1/metrics/{granularity}", post(query_handler))
            .with_state(self.provider)
    }
}

pub async fn query_handler(
    State(provider): State<Arc<dyn TimeBucketedQuery>>,
    Path(granularity): Path<String>,
    body: Bytes,
) -> Response {
    match process_query_request(provider.as_ref(), &granularity, &body).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn process_query_request(
    provider: &dyn TimeBucketedQuery,
    granularity: &str,
    body: &[u8],
) -> Result<QueryResponse, HttpQueryError> {
    let granularity: Granularity = granularity.parse()?;

    let event = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body)
            .map_err(|err| HttpQueryError::BadRequest(format!("invalid event: {err}")))?
    };

    Ok(provider.query(granularity, event).await?)
}
