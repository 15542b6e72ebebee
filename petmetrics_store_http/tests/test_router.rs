use std::{sync::Arc, time::SystemTime};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use petmetrics_store::{InMemoryTimeSeriesStore, Timestamp};
use petmetrics_store_http::{
    HttpStoreServer,
    types::{ErrorResponse, TableResponse, WriteRecordsResponse},
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn router() -> Router {
    HttpStoreServer::new(Arc::new(InMemoryTimeSeriesStore::new())).into_router()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .expect("request");

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn provision(router: &Router) {
    let (status, _) = send(
        router,
        "POST",
        "/v1/databases",
        Some(json!({ "databaseName": "PetMetricsDB" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        router,
        "POST",
        "/v1/databases/PetMetricsDB/tables",
        Some(json!({
            "tableName": "PetMetricsTable",
            "retentionProperties": {
                "MemoryStoreRetentionPeriodInHours": 100,
                "MagneticStoreRetentionPeriodInDays": 365
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let table: TableResponse = serde_json::from_value(body).expect("table response");
    assert_eq!(table.table_name, "PetMetricsTable");
    assert_eq!(table.retention_properties.magnetic_store_retention_period_in_days, 365);
}

fn now_nanos() -> String {
    Timestamp::from_system_time(SystemTime::now())
        .expect("now")
        .to_string()
}

#[tokio::test]
async fn test_create_twice_is_conflict() {
    let router = router();
    provision(&router).await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/databases",
        Some(json!({ "databaseName": "PetMetricsDB" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    let error: ErrorResponse = serde_json::from_value(body).expect("error response");
    assert_eq!(error.code, "Conflict");
}

#[tokio::test]
async fn test_write_records_reports_rejections() {
    let router = router();
    provision(&router).await;

    let time = now_nanos();
    let (status, body) = send(
        &router,
        "POST",
        "/v1/databases/PetMetricsDB/tables/PetMetricsTable/records",
        Some(json!({
            "records": [
                {
                    "dimensions": [{ "name": "userId", "value": "user_1" }, { "name": "petId", "value": "pet_user_1_1" }],
                    "measureName": "weight",
                    "measureValue": "21.5",
                    "measureValueType": "DOUBLE",
                    "time": time,
                    "timeUnit": "NANOSECONDS"
                },
                {
                    "dimensions": [],
                    "measureName": "visits",
                    "measureValue": "3",
                    "measureValueType": "BIGINT",
                    "time": time,
                    "timeUnit": "NANOSECONDS"
                }
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let response: WriteRecordsResponse = serde_json::from_value(body).expect("write response");
    assert_eq!(response.records_ingested.total, 1);
    assert_eq!(response.rejected_records.len(), 1);
    assert_eq!(response.rejected_records[0].record_index, 1);
}

#[tokio::test]
async fn test_write_to_missing_table_is_not_found() {
    let router = router();

    let (status, body) = send(
        &router,
        "POST",
        "/v1/databases/PetMetricsDB/tables/PetMetricsTable/records",
        Some(json!({
            "records": [{
                "dimensions": [{ "name": "userId", "value": "user_1" }],
                "measureName": "weight",
                "measureValue": "21.5",
                "measureValueType": "DOUBLE",
                "time": now_nanos()
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ResourceNotFound");
}

#[tokio::test]
async fn test_malformed_record_is_bad_request() {
    let router = router();
    provision(&router).await;

    let (status, body) = send(
        &router,
        "POST",
        "/v1/databases/PetMetricsDB/tables/PetMetricsTable/records",
        Some(json!({
            "records": [{
                "dimensions": [{ "name": "userId", "value": "user_1" }],
                "measureName": "weight",
                "measureValue": "21.5",
                "measureValueType": "VARCHAR",
                "time": now_nanos()
            }]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("record 0"));
}

#[tokio::test]
async fn test_get_and_list_tables() {
    let router = router();
    provision(&router).await;

    let (status, body) = send(
        &router,
        "GET",
        "/v1/databases/PetMetricsDB/tables/PetMetricsTable",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["databaseName"], "PetMetricsDB");

    let (status, body) = send(&router, "GET", "/v1/databases/PetMetricsDB/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tables"].as_array().unwrap().len(), 1);

    let (status, body) = send(&router, "GET", "/v1/databases", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["databases"][0]["databaseName"], "PetMetricsDB");
}
