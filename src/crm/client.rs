use crate::config::CrmConfig;
use crate::crm::api_types::{ApiCreateObject, ApiObjectList, ApiProperty};
use crate::crm::error::CrmError;
use crate::crm::types::{CrmObject, MeasureOption, Record};
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use url::Url;

/// Property whose enumeration options feed the form's dropdown
pub const MEASURE_PROPERTY: &str = "time_measure";

/// Properties requested when listing records
pub const RECORD_PROPERTIES: [&str; 4] = ["name", "institution", "time_taken", "time_measure"];

/// The three CRM operations the web layer depends on.
pub trait CrmApi: Clone + Send + Sync + 'static {
  /// Read the allowed values of the `time_measure` property
  fn fetch_measure_options(
    &self,
  ) -> impl Future<Output = Result<Vec<MeasureOption>, CrmError>> + Send;

  /// List up to `limit` records, projected to [`RECORD_PROPERTIES`]
  fn list_records(&self, limit: u32)
    -> impl Future<Output = Result<Vec<CrmObject>, CrmError>> + Send;

  /// Create a record. Any success status counts as created; the stored
  /// object is returned only when the response body decodes as one.
  fn create_record(
    &self,
    record: &Record,
  ) -> impl Future<Output = Result<Option<CrmObject>, CrmError>> + Send;
}

/// HubSpot CRM v3 client for one custom object type
#[derive(Clone)]
pub struct CrmClient {
  http: reqwest::Client,
  base_url: Url,
  object_type_id: String,
}

impl CrmClient {
  pub fn new(config: &CrmConfig, token: &str) -> Result<Self> {
    let base_url = config.base_url()?;

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
      .map_err(|_| eyre!("Access token contains characters not allowed in a header"))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      object_type_id: config.object_type_id.clone(),
    })
  }

  /// Append path segments to the base URL, keeping any prefix it already has
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  fn property_url(&self) -> Url {
    self.endpoint(&["crm", "v3", "properties", &self.object_type_id, MEASURE_PROPERTY])
  }

  fn objects_url(&self) -> Url {
    self.endpoint(&["crm", "v3", "objects", &self.object_type_id])
  }
}

/// Send a request and fail on any non-success status
async fn send(endpoint: &'static str, request: RequestBuilder) -> Result<Response, CrmError> {
  let response = request
    .send()
    .await
    .map_err(|source| CrmError::Transport { endpoint, source })?;

  let status = response.status();
  tracing::debug!(endpoint, %status, "CRM response");

  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(CrmError::Status {
      endpoint,
      status,
      body,
    });
  }

  Ok(response)
}

/// Send a request and decode a JSON body, mapping every failure to [`CrmError`]
async fn send_json<T: DeserializeOwned>(
  endpoint: &'static str,
  request: RequestBuilder,
) -> Result<T, CrmError> {
  send(endpoint, request)
    .await?
    .json::<T>()
    .await
    .map_err(|source| CrmError::Decode { endpoint, source })
}

impl CrmApi for CrmClient {
  async fn fetch_measure_options(&self) -> Result<Vec<MeasureOption>, CrmError> {
    let url = self.property_url();
    tracing::debug!(%url, "Fetching measure options");

    let property: ApiProperty = send_json("property metadata", self.http.get(url)).await?;

    Ok(property.into_options())
  }

  async fn list_records(&self, limit: u32) -> Result<Vec<CrmObject>, CrmError> {
    let url = self.objects_url();
    tracing::debug!(%url, limit, "Listing records");

    let request = self.http.get(url).query(&[
      ("limit", limit.to_string()),
      ("properties", RECORD_PROPERTIES.join(",")),
    ]);

    let list: ApiObjectList = send_json("object list", request).await?;

    Ok(list.results)
  }

  async fn create_record(&self, record: &Record) -> Result<Option<CrmObject>, CrmError> {
    let url = self.objects_url();
    tracing::debug!(%url, "Creating record");

    let body = ApiCreateObject { properties: record };
    let response = send("object create", self.http.post(url).json(&body)).await?;

    // The status alone decides success; the body only feeds the log line
    let created = match response.bytes().await {
      Ok(bytes) => serde_json::from_slice::<CrmObject>(&bytes).ok(),
      Err(e) => {
        tracing::warn!(error = %e, "Failed to read create response body");
        None
      }
    };
    if created.is_none() {
      tracing::debug!("Create response carried no stored object");
    }

    Ok(created)
  }
}
