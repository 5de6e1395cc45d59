//! Creation form payload and validation.

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use std::convert::Infallible;
use thiserror::Error;

use crate::crm::Record;

/// Inline message shown when a required field is missing
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill all the fields";

/// Raw creation-form fields, as posted by the browser or a JSON client.
///
/// Every field is optional here so that a missing field reaches validation
/// instead of failing extraction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordForm {
  pub name: Option<String>,
  pub institution: Option<String>,
  pub time_taken: Option<String>,
  pub time_measure: Option<String>,
}

/// A creation-form submission, sent either urlencoded or as JSON.
///
/// `None` when the body could not be read as a [`RecordForm`] at all
/// (wrong content type, malformed JSON, repeated fields). Extraction never
/// fails, so the handler can re-render the form instead of a bare error.
#[derive(Debug)]
pub struct Submission(pub Option<RecordForm>);

impl<S: Send + Sync> FromRequest<S> for Submission {
  type Rejection = Infallible;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let is_json = req
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .is_some_and(|v| v.starts_with("application/json"));

    let form = if is_json {
      Json::<RecordForm>::from_request(req, state)
        .await
        .map(|Json(form)| form)
        .map_err(|e| e.body_text())
    } else {
      Form::<RecordForm>::from_request(req, state)
        .await
        .map(|Form(form)| form)
        .map_err(|e| e.body_text())
    };

    match form {
      Ok(form) => Ok(Self(Some(form))),
      Err(reason) => {
        tracing::debug!(%reason, "Unreadable form submission");
        Ok(Self(None))
      }
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Please fill all the fields")]
  MissingFields(Vec<&'static str>),
}

/// Trimmed value of a required field, or `None` if it is blank
fn required(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RecordForm {
  /// Check that all four fields are filled in and build the record to create.
  ///
  /// `name`, `institution` and `time_taken` are trimmed. `time_measure` comes
  /// from a fixed list and is passed through as submitted.
  pub fn validate(&self) -> Result<Record, ValidationError> {
    let name = required(&self.name);
    let institution = required(&self.institution);
    let time_taken = required(&self.time_taken);
    let time_measure = required(&self.time_measure).and(self.time_measure.as_deref());

    match (name, institution, time_taken, time_measure) {
      (Some(name), Some(institution), Some(time_taken), Some(time_measure)) => Ok(Record {
        name: name.to_string(),
        institution: institution.to_string(),
        time_taken: time_taken.to_string(),
        time_measure: time_measure.to_string(),
      }),
      _ => {
        let missing = [
          ("name", name),
          ("institution", institution),
          ("time_taken", time_taken),
          ("time_measure", time_measure),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| field)
        .collect();
        Err(ValidationError::MissingFields(missing))
      }
    }
  }
}
