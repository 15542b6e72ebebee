//! HTTP client for a remote time-series store.
//!
//! [`HttpStoreClient`] implements [`TimeSeriesStore`] on top of the API
//! served by `petmetrics_store_http`, so the ingestion pipeline can write to
//! a remote store the same way it writes to the in-memory one.

use async_trait::async_trait;
use petmetrics_store::{
    Database, DatabaseName, Record, Result, StoreError, Table, TableName, TableOptions,
    TimeSeriesStore, WriteOutcome,
};
use petmetrics_store_http::{
    error::{CODE_CONFLICT, CODE_NOT_FOUND, CODE_THROTTLING, CODE_UNAVAILABLE, CODE_VALIDATION},
    types::{
        CreateDatabaseRequest, CreateTableRequest, DatabaseResponse, ErrorResponse,
        ListDatabasesResponse, ListTablesResponse, RecordPayload, TableResponse,
        WriteRecordsRequest, WriteRecordsResponse,
    },
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

/// A client for a store served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStoreClient {
    /// Create a new client for the server at `base_url`, e.g. `http://127.0.0.1:7780`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn database_url(&self, database: &DatabaseName) -> String {
        format!("{}/v1/databases/{}", self.base_url, database.id())
    }

    fn table_url(&self, table: &TableName) -> String {
        format!(
            "{}/tables/{}",
            self.database_url(table.parent()),
            table.id()
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &'static str,
    ) -> Result<T> {
        let response = request.send().await.map_err(|err| StoreError::Unavailable {
            message: format!("request failed: {err}"),
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|err| StoreError::Internal {
                message: format!("failed to decode response: {err}"),
            });
        }

        let body = response.json::<ErrorResponse>().await.ok();
        Err(error_from_response(resource, status, body))
    }
}

#[async_trait]
impl TimeSeriesStore for HttpStoreClient {
    async fn create_database(&self, name: DatabaseName) -> Result<Database> {
        let request = self
            .client
            .post(format!("{}/v1/databases", self.base_url))
            .json(&CreateDatabaseRequest {
                database_name: name.id().to_string(),
            });

        let _: DatabaseResponse = self.send(request, "database").await?;

        Ok(Database::new(name))
    }

    async fn get_database(&self, name: DatabaseName) -> Result<Database> {
        let request = self.client.get(self.database_url(&name));
        let _: DatabaseResponse = self.send(request, "database").await?;

        Ok(Database::new(name))
    }

    async fn list_databases(&self) -> Result<Vec<Database>> {
        let request = self.client.get(format!("{}/v1/databases", self.base_url));
        let response: ListDatabasesResponse = self.send(request, "database").await?;

        response
            .databases
            .into_iter()
            .map(|database| {
                DatabaseName::new(database.database_name)
                    .map(Database::new)
                    .map_err(|source| StoreError::InvalidResourceName {
                        resource: "database",
                        source,
                    })
            })
            .collect()
    }

    async fn create_table(&self, name: TableName, options: TableOptions) -> Result<Table> {
        let request = self
            .client
            .post(format!("{}/tables", self.database_url(name.parent())))
            .json(&CreateTableRequest::new(name.id(), &options));

        let response: TableResponse = self.send(request, "table").await?;

        Ok(Table::new(name, response.table_options()))
    }

    async fn get_table(&self, name: TableName) -> Result<Table> {
        let request = self.client.get(self.table_url(&name));
        let response: TableResponse = self.send(request, "table").await?;

        Ok(Table::new(name, response.table_options()))
    }

    async fn list_tables(&self, database: DatabaseName) -> Result<Vec<Table>> {
        let request = self
            .client
            .get(format!("{}/tables", self.database_url(&database)));
        let response: ListTablesResponse = self.send(request, "table").await?;

        response
            .tables
            .into_iter()
            .map(|table| {
                let options = table.table_options();
                TableName::new(table.table_name, database.clone())
                    .map(|name| Table::new(name, options))
                    .map_err(|source| StoreError::InvalidResourceName {
                        resource: "table",
                        source,
                    })
            })
            .collect()
    }

    async fn write_records(&self, table: TableName, records: &[Record]) -> Result<WriteOutcome> {
        debug!(table = %table, num_records = records.len(), "writing records");

        let payload = WriteRecordsRequest {
            records: records.iter().map(RecordPayload::from).collect(),
        };

        let request = self
            .client
            .post(format!("{}/records", self.table_url(&table)))
            .json(&payload);

        let response: WriteRecordsResponse = self.send(request, "records").await?;

        Ok(response.into())
    }
}

/// Rebuild a [`StoreError`] from an error response.
///
/// The error code takes precedence; the status code is used when the body
/// could not be decoded.
fn error_from_response(
    resource: &'static str,
    status: StatusCode,
    body: Option<ErrorResponse>,
) -> StoreError {
    let (code, message) = match body {
        Some(body) => (Some(body.code), body.message),
        None => (None, format!("request failed with status {status}")),
    };

    let code = code.as_deref().unwrap_or(match status {
        StatusCode::NOT_FOUND => CODE_NOT_FOUND,
        StatusCode::CONFLICT => CODE_CONFLICT,
        StatusCode::BAD_REQUEST => CODE_VALIDATION,
        StatusCode::TOO_MANY_REQUESTS => CODE_THROTTLING,
        StatusCode::SERVICE_UNAVAILABLE => CODE_UNAVAILABLE,
        _ => "",
    });

    match code {
        CODE_NOT_FOUND => StoreError::NotFound { resource, message },
        CODE_CONFLICT => StoreError::AlreadyExists { resource, message },
        CODE_VALIDATION => StoreError::InvalidArgument { resource, message },
        CODE_THROTTLING => StoreError::Throttled { message },
        CODE_UNAVAILABLE => StoreError::Unavailable { message },
        _ => StoreError::Internal { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_response_prefers_code() {
        let err = error_from_response(
            "table",
            StatusCode::BAD_REQUEST,
            Some(ErrorResponse {
                code: CODE_CONFLICT.to_string(),
                message: "already exists".to_string(),
            }),
        );
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_error_from_response_falls_back_to_status() {
        let err = error_from_response("records", StatusCode::TOO_MANY_REQUESTS, None);
        assert!(matches!(err, StoreError::Throttled { .. }));

        let err = error_from_response("records", StatusCode::BAD_GATEWAY, None);
        assert!(matches!(err, StoreError::Internal { .. }));
    }

    #[test]
    fn test_urls() {
        let client = HttpStoreClient::new("http://127.0.0.1:7780/");
        let table = TableName::new_unchecked(
            "PetMetricsTable",
            DatabaseName::new_unchecked("PetMetricsDB"),
        );

        assert_eq!(
            client.table_url(&table),
            "http://127.0.0.1:7780/v1/databases/PetMetricsDB/tables/PetMetricsTable"
        );
    }
}
