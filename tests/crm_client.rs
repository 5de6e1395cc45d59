//! Runs the real CRM client against an in-process stub of the HubSpot API.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use cobj_portal::config::CrmConfig;
use cobj_portal::crm::{CachedCrmClient, CrmApi, CrmClient, CrmError, MeasureOption, Record};
use cobj_portal::web::create_router;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const OBJECT_TYPE: &str = "2-42357121";
const TOKEN: &str = "pat-na1-test";

/// One request as the stub saw it
#[derive(Debug, Clone)]
struct Captured {
  method: Method,
  path: String,
  query: Option<String>,
  authorization: Option<String>,
  content_type: Option<String>,
  body: Option<Value>,
}

#[derive(Clone, Default)]
struct Stub {
  requests: Arc<Mutex<Vec<Captured>>>,
  fail_with: Option<StatusCode>,
  /// Raw body for a successful create instead of the stored object
  create_body: Option<&'static str>,
}

impl Stub {
  fn requests(&self) -> Vec<Captured> {
    self.requests.lock().unwrap().clone()
  }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(String::from)
}

async fn capture(
  State(stub): State<Stub>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
  body: Bytes,
) -> Response {
  stub.requests.lock().unwrap().push(Captured {
    method: method.clone(),
    path: uri.path().to_string(),
    query: uri.query().map(String::from),
    authorization: header_value(&headers, "authorization"),
    content_type: header_value(&headers, "content-type"),
    body: serde_json::from_slice(&body).ok(),
  });

  if let Some(status) = stub.fail_with {
    return (status, Json(json!({ "status": "error", "message": "nope" }))).into_response();
  }

  let properties_path = format!("/crm/v3/properties/{}/time_measure", OBJECT_TYPE);
  let objects_path = format!("/crm/v3/objects/{}", OBJECT_TYPE);

  let path = uri.path();

  if method == Method::GET && path == properties_path {
    Json(json!({
      "name": "time_measure",
      "options": [
        { "label": "Years", "value": "years", "displayOrder": 0 },
        { "label": "Months", "value": "months", "displayOrder": 1 }
      ]
    }))
    .into_response()
  } else if method == Method::GET && path == objects_path {
    Json(json!({
      "results": [
        {
          "id": "101",
          "properties": { "name": "Ada", "institution": "MIT", "time_taken": "4", "time_measure": "years" },
          "createdAt": "2024-03-01T10:15:30.123Z",
          "updatedAt": "2024-03-01T10:15:30.123Z",
          "archived": false
        }
      ]
    }))
    .into_response()
  } else if method == Method::POST && path == objects_path {
    if let Some(body) = stub.create_body {
      return (StatusCode::CREATED, body).into_response();
    }
    (
      StatusCode::CREATED,
      Json(json!({
        "id": "202",
        "properties": { "name": "Grace" },
        "createdAt": "2024-03-02T09:00:00Z",
        "archived": false
      })),
    )
      .into_response()
  } else {
    StatusCode::NOT_FOUND.into_response()
  }
}

/// Serve the stub on an ephemeral port and return a client pointed at it
async fn start(stub: Stub) -> CrmClient {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let app = Router::new().fallback(capture).with_state(stub);
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });

  let config = CrmConfig {
    base_url: format!("http://{}", addr),
    object_type_id: OBJECT_TYPE.to_string(),
  };
  CrmClient::new(&config, TOKEN).unwrap()
}

#[tokio::test]
async fn test_fetch_measure_options() {
  let stub = Stub::default();
  let client = start(stub.clone()).await;

  let options = client.fetch_measure_options().await.unwrap();
  assert_eq!(
    options,
    vec![
      MeasureOption {
        value: "years".into(),
        label: "Years".into()
      },
      MeasureOption {
        value: "months".into(),
        label: "Months".into()
      },
    ]
  );

  let requests = stub.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].method, Method::GET);
  assert_eq!(
    requests[0].path,
    "/crm/v3/properties/2-42357121/time_measure"
  );
  assert_eq!(requests[0].authorization.as_deref(), Some("Bearer pat-na1-test"));
  assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_list_records_sends_limit_and_projection() {
  let stub = Stub::default();
  let client = start(stub.clone()).await;

  let records = client.list_records(100).await.unwrap();
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].id, "101");
  assert_eq!(records[0].properties.name.as_deref(), Some("Ada"));

  let requests = stub.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].path, "/crm/v3/objects/2-42357121");
  assert_eq!(
    requests[0].query.as_deref(),
    Some("limit=100&properties=name%2Cinstitution%2Ctime_taken%2Ctime_measure")
  );
  assert_eq!(requests[0].authorization.as_deref(), Some("Bearer pat-na1-test"));
}

#[tokio::test]
async fn test_create_record_posts_properties() {
  let stub = Stub::default();
  let client = start(stub.clone()).await;

  let record = Record {
    name: "Grace".into(),
    institution: "Yale".into(),
    time_taken: "2".into(),
    time_measure: "years".into(),
  };
  let created = client.create_record(&record).await.unwrap();
  assert_eq!(created.map(|c| c.id).as_deref(), Some("202"));

  let requests = stub.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].method, Method::POST);
  assert_eq!(requests[0].path, "/crm/v3/objects/2-42357121");
  assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
  assert_eq!(
    requests[0].body,
    Some(json!({
      "properties": {
        "name": "Grace",
        "institution": "Yale",
        "time_taken": "2",
        "time_measure": "years"
      }
    }))
  );
}

fn grace() -> Record {
  Record {
    name: "Grace".into(),
    institution: "Yale".into(),
    time_taken: "2".into(),
    time_measure: "years".into(),
  }
}

#[tokio::test]
async fn test_create_succeeds_whatever_the_body() {
  for body in ["", "{}", r#"{"properties":{}}"#, "created"] {
    let stub = Stub {
      create_body: Some(body),
      ..Default::default()
    };
    let client = start(stub.clone()).await;

    let created = client.create_record(&grace()).await;
    assert!(
      matches!(created, Ok(None)),
      "body {:?} gave {:?}",
      body,
      created
    );
    assert_eq!(stub.requests().len(), 1);
  }
}

#[tokio::test]
async fn test_create_with_empty_body_redirects_to_list() {
  let stub = Stub {
    create_body: Some(""),
    ..Default::default()
  };
  let router = create_router(CachedCrmClient::new(start(stub.clone()).await), None);

  let request = Request::builder()
    .method("POST")
    .uri("/update-cobj")
    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
    .body(Body::from(
      "name=Grace&institution=Yale&time_taken=2&time_measure=years",
    ))
    .unwrap();
  let response = router.oneshot(request).await.unwrap();

  assert_eq!(response.status(), StatusCode::SEE_OTHER);
  assert_eq!(
    response
      .headers()
      .get(header::LOCATION)
      .and_then(|v| v.to_str().ok()),
    Some("/")
  );

  let requests = stub.requests();
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].method, Method::POST);
}

#[tokio::test]
async fn test_error_status_is_reported() {
  let stub = Stub {
    fail_with: Some(StatusCode::UNAUTHORIZED),
    ..Default::default()
  };
  let client = start(stub.clone()).await;

  let err = client.list_records(100).await.unwrap_err();
  assert!(matches!(err, CrmError::Status { .. }));
  assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

  let err = client
    .create_record(&Record {
      name: "Ada".into(),
      institution: "MIT".into(),
      time_taken: "4".into(),
      time_measure: "years".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

  // One attempt per call, no retries
  assert_eq!(stub.requests().len(), 2);
}

#[tokio::test]
async fn test_unreachable_upstream_is_a_transport_error() {
  // Bind then drop to get a port nothing listens on
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);

  let config = CrmConfig {
    base_url: format!("http://{}", addr),
    object_type_id: OBJECT_TYPE.to_string(),
  };
  let client = CrmClient::new(&config, TOKEN).unwrap();

  let err = client.fetch_measure_options().await.unwrap_err();
  assert!(matches!(err, CrmError::Transport { .. }));
}

#[tokio::test]
async fn test_cached_client_hits_property_endpoint_once() {
  let stub = Stub::default();
  let crm = CachedCrmClient::new(start(stub.clone()).await);

  let first = crm.measure_options().await.unwrap();
  let second = crm.measure_options().await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.len(), 2);

  let property_calls = stub
    .requests()
    .iter()
    .filter(|r| r.path.starts_with("/crm/v3/properties/"))
    .count();
  assert_eq!(property_calls, 1);
}

#[tokio::test]
async fn test_cached_client_retries_after_failure() {
  let failing = Stub {
    fail_with: Some(StatusCode::INTERNAL_SERVER_ERROR),
    ..Default::default()
  };
  let crm = CachedCrmClient::new(start(failing.clone()).await);

  assert!(crm.measure_options().await.is_err());
  assert!(crm.measure_options().await.is_err());
  assert_eq!(failing.requests().len(), 2);
}
