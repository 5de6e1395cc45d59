//! Serde types matching HubSpot CRM v3 request and response bodies.
//!
//! These are kept apart from the domain types so the wire format can change
//! without touching handlers or views.

use serde::{Deserialize, Serialize};

use super::types::{CrmObject, MeasureOption, Record};

// ============================================================================
// Property metadata endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiProperty {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub options: Vec<ApiPropertyOption>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPropertyOption {
  pub value: String,
  #[serde(default)]
  pub label: String,
}

impl From<ApiPropertyOption> for MeasureOption {
  fn from(option: ApiPropertyOption) -> Self {
    let label = if option.label.is_empty() {
      option.value.clone()
    } else {
      option.label
    };
    MeasureOption {
      value: option.value,
      label,
    }
  }
}

impl ApiProperty {
  pub fn into_options(self) -> Vec<MeasureOption> {
    self.options.into_iter().map(MeasureOption::from).collect()
  }
}

// ============================================================================
// Object list endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiObjectList {
  #[serde(default)]
  pub results: Vec<CrmObject>,
}

// ============================================================================
// Object create endpoint
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ApiCreateObject<'a> {
  pub properties: &'a Record,
}
