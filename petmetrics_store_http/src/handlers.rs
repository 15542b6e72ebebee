use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use petmetrics_store::{DatabaseName, MAX_RECORDS_PER_WRITE, TableName};
use tracing::debug;

use crate::{
    HttpStoreState,
    error::{HttpStoreError, Result},
    types::{
        CreateDatabaseRequest, CreateTableRequest, DatabaseResponse, ListDatabasesResponse,
        ListTablesResponse, TableResponse, WriteRecordsRequest, WriteRecordsResponse,
    },
};

pub async fn create_database_handler(
    State(state): State<HttpStoreState>,
    Json(request): Json<CreateDatabaseRequest>,
) -> Response {
    let result = async {
        let name = parse_database_name(&request.database_name)?;
        let database = state.store.create_database(name).await?;
        Ok::<_, HttpStoreError>(DatabaseResponse::from(&database))
    }
    .await;

    into_response(result, StatusCode::CREATED)
}

pub async fn get_database_handler(
    State(state): State<HttpStoreState>,
    Path(database): Path<String>,
) -> Response {
    let result = async {
        let name = parse_database_name(&database)?;
        let database = state.store.get_database(name).await?;
        Ok::<_, HttpStoreError>(DatabaseResponse::from(&database))
    }
    .await;

    into_response(result, StatusCode::OK)
}

pub async fn list_databases_handler(State(state): State<HttpStoreState>) -> Response {
    let result = async {
        let databases = state.store.list_databases().await?;
        Ok::<_, HttpStoreError>(ListDatabasesResponse {
            databases: databases.iter().map(DatabaseResponse::from).collect(),
        })
    }
    .await;

    into_response(result, StatusCode::OK)
}

pub async fn create_table_handler(
    State(state): State<HttpStoreState>,
    Path(database): Path<String>,
    Json(request): Json<CreateTableRequest>,
) -> Response {
    let result = async {
        let name = parse_table_name(&database, &request.table_name)?;
        let table = state
            .store
            .create_table(name, request.table_options())
            .await?;
        Ok::<_, HttpStoreError>(TableResponse::from(&table))
    }
    .await;

    into_response(result, StatusCode::CREATED)
}

pub async fn get_table_handler(
    State(state): State<HttpStoreState>,
    Path((database, table)): Path<(String, String)>,
) -> Response {
    let result = async {
        let name = parse_table_name(&database, &table)?;
        let table = state.store.get_table(name).await?;
        Ok::<_, HttpStoreError>(TableResponse::from(&table))
    }
    .await;

    into_response(result, StatusCode::OK)
}

pub async fn list_tables_handler(
    State(state): State<HttpStoreState>,
    Path(database): Path<String>,
) -> Response {
    let result = async {
        let name = parse_database_name(&database)?;
        let tables = state.store.list_tables(name).await?;
        Ok::<_, HttpStoreError>(ListTablesResponse {
            tables: tables.iter().map(TableResponse::from).collect(),
        })
    }
    .await;

    into_response(result, StatusCode::OK)
}

pub async fn write_records_handler(
    State(state): State<HttpStoreState>,
    Path((database, table)): Path<(String, String)>,
    Json(request): Json<WriteRecordsRequest>,
) -> Response {
    into_response(
        process_write_request(&state, &database, &table, request).await,
        StatusCode::OK,
    )
}

async fn process_write_request(
    state: &HttpStoreState,
    database: &str,
    table: &str,
    request: WriteRecordsRequest,
) -> Result<WriteRecordsResponse> {
    let name = parse_table_name(database, table)?;

    if request.records.is_empty() || request.records.len() > MAX_RECORDS_PER_WRITE {
        return Err(HttpStoreError::BadRequest(format!(
            "a write must contain between 1 and {MAX_RECORDS_PER_WRITE} records, got {}",
            request.records.len()
        )));
    }

    let records = request
        .records
        .into_iter()
        .enumerate()
        .map(|(index, payload)| {
            payload
                .into_record()
                .map_err(|err| HttpStoreError::BadRequest(format!("record {index}: {err}")))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(table = %name, num_records = records.len(), "write records request");

    let outcome = state.store.write_records(name, &records).await?;

    Ok(WriteRecordsResponse::from(&outcome))
}

fn parse_database_name(id: &str) -> Result<DatabaseName> {
    DatabaseName::new(id)
        .map_err(|err| HttpStoreError::BadRequest(format!("invalid database name: {id} {err}")))
}

fn parse_table_name(database: &str, table: &str) -> Result<TableName> {
    let database = parse_database_name(database)?;
    TableName::new(table, database)
        .map_err(|err| HttpStoreError::BadRequest(format!("invalid table name: {table} {err}")))
}

fn into_response<T: serde::Serialize>(result: Result<T>, success: StatusCode) -> Response {
    match result {
        Ok(response) => (success, Json(response)).into_response(),
        Err(err) => err.into_response(),
    }
}
