//! Web router using Axum

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
  routing::get,
  Router,
};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::crm::{CachedCrmClient, CrmApi, MeasureOption};

use super::form::{RecordForm, Submission, ValidationError, MISSING_FIELDS_MESSAGE};
use super::views::{self, FormPage};

pub const LIST_ERROR_MESSAGE: &str = "An error occurred while loading the records";
pub const SAVE_ERROR_MESSAGE: &str = "An error occurred while saving the data";

/// Create the web router.
///
/// Paths no route matches fall through to `static_dir` when one is given.
pub fn create_router<C: CrmApi>(crm: CachedCrmClient<C>, static_dir: Option<&Path>) -> Router {
  let router = Router::new()
    .route("/", get(list_handler::<C>))
    .route(
      "/update-cobj",
      get(show_form_handler::<C>).post(submit_form_handler::<C>),
    )
    .with_state(crm);

  let router = match static_dir {
    Some(dir) => router.fallback_service(ServeDir::new(dir)),
    None => router,
  };

  router.layer(TraceLayer::new_for_http())
}

async fn list_handler<C: CrmApi>(State(crm): State<CachedCrmClient<C>>) -> Response {
  match crm.list_records().await {
    Ok(records) => views::record_list(&records).into_response(),
    Err(e) => {
      tracing::error!(error = %e, status = ?e.status(), "Failed to list records");
      (StatusCode::BAD_GATEWAY, views::error_page(LIST_ERROR_MESSAGE)).into_response()
    }
  }
}

/// Measure options for the form; an upstream failure renders as no options
async fn form_options<C: CrmApi>(crm: &CachedCrmClient<C>) -> Vec<MeasureOption> {
  match crm.measure_options().await {
    Ok(options) => options,
    Err(e) => {
      tracing::error!(error = %e, status = ?e.status(), "Failed to fetch measure options");
      Vec::new()
    }
  }
}

async fn show_form_handler<C: CrmApi>(State(crm): State<CachedCrmClient<C>>) -> Response {
  let options = form_options(&crm).await;
  views::record_form(&FormPage {
    options: &options,
    ..Default::default()
  })
  .into_response()
}

/// Re-render the form with the missing-fields message and whatever was entered
async fn reject_submission<C: CrmApi>(
  crm: &CachedCrmClient<C>,
  values: Option<&RecordForm>,
) -> Response {
  let options = form_options(crm).await;
  let page = views::record_form(&FormPage {
    options: &options,
    message: Some(MISSING_FIELDS_MESSAGE),
    values,
  });
  (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

async fn submit_form_handler<C: CrmApi>(
  State(crm): State<CachedCrmClient<C>>,
  Submission(form): Submission,
) -> Response {
  let validated = match &form {
    Some(form) => form.validate(),
    None => Err(ValidationError::MissingFields(Vec::new())),
  };

  let record = match validated {
    Ok(record) => record,
    Err(e) => {
      tracing::debug!(error = ?e, "Rejected form submission");
      return reject_submission(&crm, form.as_ref()).await;
    }
  };

  match crm.create_record(&record).await {
    Ok(Some(created)) => {
      tracing::info!(id = %created.id, "Created record");
      Redirect::to("/").into_response()
    }
    Ok(None) => {
      tracing::info!("Created record");
      Redirect::to("/").into_response()
    }
    Err(e) => {
      tracing::error!(error = %e, status = ?e.status(), "Failed to create record");
      (StatusCode::BAD_GATEWAY, views::error_page(SAVE_ERROR_MESSAGE)).into_response()
    }
  }
}
