use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A new custom object record, as submitted through the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
  pub name: String,
  pub institution: String,
  pub time_taken: String,
  pub time_measure: String,
}

/// One allowed value of the `time_measure` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureOption {
  pub value: String,
  pub label: String,
}

impl MeasureOption {
  /// An option whose label is its value
  pub fn new(value: impl Into<String>) -> Self {
    let value = value.into();
    Self {
      label: value.clone(),
      value,
    }
  }
}

/// A stored custom object, as returned in the CRM's `results` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmObject {
  pub id: String,
  #[serde(default)]
  pub properties: RecordProperties,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub archived: bool,
}

/// Projected properties of a stored record. Any value may be unset upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordProperties {
  pub name: Option<String>,
  pub institution: Option<String>,
  pub time_taken: Option<String>,
  pub time_measure: Option<String>,
  // Everything else HubSpot sends back (hs_object_id, hs_createdate, ...)
  #[serde(flatten)]
  pub extra: HashMap<String, serde_json::Value>,
}
