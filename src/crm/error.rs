use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single CRM API call.
#[derive(Debug, Error)]
pub enum CrmError {
  #[error("request to {endpoint} failed: {source}")]
  Transport {
    endpoint: &'static str,
    #[source]
    source: reqwest::Error,
  },

  #[error("{endpoint} returned HTTP {status}: {body}")]
  Status {
    endpoint: &'static str,
    status: StatusCode,
    body: String,
  },

  #[error("failed to decode {endpoint} response: {source}")]
  Decode {
    endpoint: &'static str,
    #[source]
    source: reqwest::Error,
  },
}

impl CrmError {
  /// Upstream HTTP status, if the request got that far
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      Self::Transport { source, .. } | Self::Decode { source, .. } => source.status(),
    }
  }
}
