//! HTTP API in front of a [`TimeSeriesStore`].
//!
//! The router exposes database and table management under `/v1/databases`
//! and batch writes under
//! `/v1/databases/{database}/tables/{table}/records`.

pub mod error;
pub mod handlers;
pub mod types;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use petmetrics_store::TimeSeriesStore;

pub use error::{HttpStoreError, Result};
pub use types::{ErrorResponse, RecordPayload, WriteRecordsRequest, WriteRecordsResponse};

use crate::handlers::{
    create_database_handler, create_table_handler, get_database_handler, get_table_handler,
    list_databases_handler, list_tables_handler, write_records_handler,
};

pub struct HttpStoreServer {
    state: HttpStoreState,
}

#[derive(Clone)]
pub struct HttpStoreState {
    store: Arc<dyn TimeSeriesStore>,
}

impl HttpStoreServer {
    pub fn new(store: Arc<dyn TimeSeriesStore>) -> Self {
        Self {
            state: HttpStoreState { store },
        }
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route(
                "/v1/databases",
                post(create_database_handler).get(list_databases_handler),
            )
            .route("/v1/databases/{database}", get(get_database_handler))
            .route(
                "/v1/databases/{database}/tables",
                post(create_table_handler).get(list_tables_handler),
            )
            .route(
                "/v1/databases/{database}/tables/{table}",
                get(get_table_handler),
            )
            .route(
                "/v1/databases/{database}/tables/{table}/records",
                post(write_records_handler),
            )
            .with_state(self.state)
    }
}
