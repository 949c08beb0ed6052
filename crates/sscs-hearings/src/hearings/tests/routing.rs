use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::hearings::auth::{StaticServiceAuth, SERVICE_AUTHORIZATION};
use crate::hearings::domain::{CaseId, CaseLink, CollectionItem};
use crate::hearings::router::service_hearings_router;
use crate::hearings::values::ServiceHearingValuesService;

const TOKEN: &str = "hmc-token";

fn router(ccd: FakeCcd) -> Router {
    let values = ServiceHearingValuesService::new(Arc::new(ccd), mapper());
    let auth = StaticServiceAuth::new(vec![TOKEN.to_string()]);
    service_hearings_router(Arc::new(values), Arc::new(auth))
}

fn post(path: &str, case_reference: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(path).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("ServiceAuthorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(
            serde_json::to_vec(&json!({ "caseReference": case_reference })).expect("body"),
        ))
        .expect("request")
}

#[tokio::test]
async fn service_hearing_values_are_served_for_authorised_callers() {
    let response = router(FakeCcd::with_case(ready_to_list_case()))
        .oneshot(post(
            "/serviceHearingValues",
            &CASE_ID.to_string(),
            Some(TOKEN),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["hmctsServiceID"], json!(SERVICE_CODE));
    assert_eq!(body["hmctsInternalCaseName"], json!("Jo Bloggs"));
    assert_eq!(body["externalCaseReference"], json!("SC123/24/00001"));
    assert_eq!(body["caseCategories"][0]["categoryValue"], json!("BBA3-002"));
    assert_eq!(body["duration"], json!(60));
    assert_eq!(body["hearingChannels"], json!(["INTER"]));
    let roles: Vec<&str> = body["parties"]
        .as_array()
        .expect("parties")
        .iter()
        .filter_map(|party| party["partyRole"].as_str())
        .collect();
    assert_eq!(roles, vec!["APEL", "RESP"]);
}

#[tokio::test]
async fn missing_service_token_is_unauthorised() {
    let response = router(FakeCcd::with_case(ready_to_list_case()))
        .oneshot(post("/serviceHearingValues", &CASE_ID.to_string(), None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_service_token_is_forbidden() {
    let response = router(FakeCcd::with_case(ready_to_list_case()))
        .oneshot(post(
            "/serviceHearingValues",
            &CASE_ID.to_string(),
            Some("someone-else"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn case_errors_map_to_client_statuses() {
    let mut incomplete = ready_to_list_case();
    incomplete.data.benefit_code = None;
    let ccd = FakeCcd::with_case(incomplete);

    let app = router(ccd);
    let cases: [(&str, StatusCode); 3] = [
        ("not-a-case", StatusCode::BAD_REQUEST),
        ("1650000000000999", StatusCode::NOT_FOUND),
        ("1650000000000001", StatusCode::UNPROCESSABLE_ENTITY),
    ];
    for (reference, expected) in cases {
        let response = app
            .clone()
            .oneshot(post("/serviceHearingValues", reference, Some(TOKEN)))
            .await
            .expect("response");
        assert_eq!(response.status(), expected, "case reference {reference}");
        let body: Value = read_json_body(response).await;
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn linked_cases_resolve_names_and_skip_dangling_links() {
    let linked_id = CaseId(1_650_000_000_000_002);
    let mut case = ready_to_list_case();
    let mut link = CaseLink {
        case_reference: Some(linked_id.to_string()),
        ..CaseLink::default()
    };
    link.extra.insert("reason".to_string(), json!("Same appellant"));
    case.data.linked_case = vec![
        CollectionItem::new(link),
        CollectionItem::new(CaseLink {
            case_reference: Some("1650000000000404".to_string()),
            ..CaseLink::default()
        }),
    ];
    let mut other = ready_to_list_case();
    other.id = linked_id;

    let ccd = FakeCcd::with_case(case);
    ccd.insert(other);

    let response = router(ccd)
        .oneshot(post("/serviceLinkedCases", &CASE_ID.to_string(), Some(TOKEN)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!([{
            "caseReference": linked_id.to_string(),
            "caseName": "Jo Bloggs",
            "reasonsForLink": ["Same appellant"],
        }])
    );
}

#[tokio::test]
async fn service_token_is_checked_before_the_body() {
    let app = router(FakeCcd::with_case(ready_to_list_case()));
    let malformed = || {
        Request::post("/serviceHearingValues")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("not json"))
            .expect("request")
    };

    let response = app.clone().oneshot(malformed()).await.expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let mut authorised = malformed();
    authorised.headers_mut().insert(
        SERVICE_AUTHORIZATION,
        format!("Bearer {TOKEN}").parse().expect("header value"),
    );
    let response = app.oneshot(authorised).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"].as_str().expect("error").starts_with("invalid message"));
}
