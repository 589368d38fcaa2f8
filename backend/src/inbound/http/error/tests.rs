//! Tests for HTTP error mapping.

use super::*;
use crate::domain::LendingError;
use crate::domain::{BookId, Error};
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[fixture]
fn internal_error_case(expected_trace_id: String) -> Error {
    Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id)
        .with_details(json!({"secret": "x"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::SEE_OTHER)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

#[rstest]
#[case(LendingError::Unauthenticated, StatusCode::SEE_OTHER)]
#[case(LendingError::NotFound(BookId::random()), StatusCode::NOT_FOUND)]
#[case(LendingError::AlreadyBorrowed, StatusCode::CONFLICT)]
#[case(LendingError::NotBorrowed, StatusCode::CONFLICT)]
#[case(LendingError::NotYourBook, StatusCode::FORBIDDEN)]
#[case(LendingError::ConcurrentModification, StatusCode::CONFLICT)]
#[case(LendingError::WriteError("disk full".to_owned()), StatusCode::SERVICE_UNAVAILABLE)]
#[case(
    LendingError::StoreUnavailable("pool empty".to_owned()),
    StatusCode::SERVICE_UNAVAILABLE
)]
fn lending_failures_map_to_statuses(#[case] failure: LendingError, #[case] status: StatusCode) {
    let err = Error::from(failure);
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn response_payload(error: &Error) -> (StatusCode, Option<String>, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let trace = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds");
    (status, trace, payload)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(
    #[from(internal_error_case)] internal_error: Error,
    expected_trace_id: String,
) {
    let (status, trace, payload) = response_payload(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace.as_deref(), Some(expected_trace_id.as_str()));
    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn conflict_details_reach_the_client() {
    let error = Error::from(LendingError::AlreadyBorrowed).with_trace_id(TRACE_ID);

    let (status, trace, payload) = response_payload(&error).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(trace.as_deref(), Some(TRACE_ID));
    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.details(), Some(&json!({"code": "already_borrowed"})));
}

#[rstest]
#[actix_web::test]
async fn unauthenticated_callers_are_redirected_to_login() {
    let response = ResponseError::error_response(&Error::from(LendingError::Unauthenticated));

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ascii location");
    assert_eq!(location, LOGIN_PATH);

    let bytes = to_bytes(response.into_body()).await.expect("body");
    let payload: Error = serde_json::from_slice(&bytes).expect("error json");
    assert_eq!(payload.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::invalid_request("bad").with_details(json!({"field": "title"}));

    let (status, trace, payload) = response_payload(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(trace.is_none());
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.details(), Some(&json!({"field": "title"})));
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let actix_err = actix_web::error::ErrorBadRequest("boom");
    let err: Error = actix_err.into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
