use crate::lookup::{LookupError, LookupService};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use opsdesk_core::dto::LookupResponse;
use opsdesk_core::rules::LookupRequest;
use opsdesk_core::time::now_iso;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

pub const LOOKUP_PATH: &str = "/api/customers/lookup";

const INTERNAL_ERROR_MESSAGE: &str = "internal error";

#[derive(Clone)]
pub struct AppState {
    lookup: Arc<LookupService>,
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    digits: Option<String>,
    pages: Option<String>,
}

pub fn router(lookup: Arc<LookupService>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(LOOKUP_PATH, get(lookup_customers))
        .with_state(AppState { lookup })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn lookup_customers(
    State(state): State<AppState>,
    params: Result<Query<LookupParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            debug!(error = %rejection, "rejected lookup query string");
            return failure(StatusCode::BAD_REQUEST, "invalid query string");
        }
    };

    let request = match LookupRequest::parse(params.digits.as_deref(), params.pages.as_deref()) {
        Ok(request) => request,
        Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let lookup = Arc::clone(&state.lookup);
    let joined = tokio::task::spawn_blocking(move || lookup.run(&request, &now_iso())).await;
    match joined {
        Ok(Ok(outcome)) => (StatusCode::OK, Json(LookupResponse::from(outcome))).into_response(),
        Ok(Err(err)) => lookup_error_response(err),
        Err(err) => {
            error!(error = %err, "customer lookup task aborted");
            failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn lookup_error_response(err: LookupError) -> Response {
    if err.is_client_error() {
        return failure(StatusCode::BAD_REQUEST, err.to_string());
    }
    error!(error = %err, "customer lookup failed");
    failure(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(LookupResponse::failure(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::{router, LOOKUP_PATH};
    use crate::lookup::testing::{contact, FakeDirectory, FakePage, FakePrimary};
    use crate::lookup::{LookupService, PrimaryStore, SharedDirectory};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use opsdesk_core::domain::ContactOrigin;
    use serde_json::Value;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(primary: FakePrimary, directory: FakeDirectory) -> axum::Router {
        let service = LookupService::new(
            Some(Box::new(primary) as Box<dyn PrimaryStore>),
            Some(Box::new(directory) as SharedDirectory),
        );
        router(Arc::new(service))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn lookup_returns_merged_results() {
        let primary = FakePrimary {
            rows: vec![contact(ContactOrigin::PrimaryStore, "c1", "(555) 000-1234")],
            ..Default::default()
        };
        let directory = FakeDirectory {
            pages: vec![FakePage::Records(vec![
                contact(ContactOrigin::Directory, "c1", "555-000-1234"),
                contact(ContactOrigin::Directory, "c2", "555 999 1234"),
            ])],
            ..Default::default()
        };
        let (status, body) = get(
            app(primary, directory),
            &format!("{LOOKUP_PATH}?digits=1234&pages=3"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        let results = body["results"].as_array().expect("results");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "c1");
        assert_eq!(results[0]["contactName"], "First c1 Last");
        assert_eq!(results[0]["phone"], "(555) 000-1234");
        assert!(results[0]["dateAdded"].is_string());
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn invalid_digits_are_rejected_without_io() {
        let primary = FakePrimary::default();
        let directory = FakeDirectory {
            endless: true,
            ..Default::default()
        };
        let (status, body) = get(
            app(primary.clone(), directory.clone()),
            &format!("{LOOKUP_PATH}?digits=12a4"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "digits must be exactly 4 numbers");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
        assert!(directory.requested().is_empty());
    }

    #[tokio::test]
    async fn missing_digits_are_rejected() {
        let (status, body) = get(
            app(FakePrimary::default(), FakeDirectory::default()),
            LOOKUP_PATH,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "digits is required");
    }

    #[tokio::test]
    async fn failed_page_still_succeeds() {
        let directory = FakeDirectory {
            pages: vec![
                FakePage::Records(vec![
                    contact(ContactOrigin::Directory, "a", "1234"),
                    contact(ContactOrigin::Directory, "b", "1234"),
                    contact(ContactOrigin::Directory, "c", "1234"),
                ]),
                FakePage::Status(500),
            ],
            ..Default::default()
        };
        let (status, body) = get(
            app(FakePrimary::default(), directory),
            &format!("{LOOKUP_PATH}?digits=1234"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().expect("results").len(), 3);
    }

    #[tokio::test]
    async fn non_numeric_pages_fall_back_to_default() {
        let directory = FakeDirectory {
            endless: true,
            ..Default::default()
        };
        let (status, body) = get(
            app(FakePrimary::default(), directory.clone()),
            &format!("{LOOKUP_PATH}?digits=1234&pages=many"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(directory.requested().len(), 10);
        assert_eq!(body["results"].as_array().expect("results").len(), 10);
    }

    #[tokio::test]
    async fn unexpected_errors_hide_details() {
        let directory = FakeDirectory {
            pages: vec![FakePage::Garbage],
            ..Default::default()
        };
        let (status, body) = get(
            app(FakePrimary::default(), directory),
            &format!("{LOOKUP_PATH}?digits=1234"),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let response = app(FakePrimary::default(), FakeDirectory::default())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
