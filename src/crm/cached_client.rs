//! CRM client wrapper that memoizes the measure options.

use crate::cache::{CacheLayer, CacheSource};

use super::client::CrmApi;
use super::error::CrmError;
use super::types::{CrmObject, MeasureOption, Record};

/// Fixed page size for the record listing
pub const LIST_PAGE_SIZE: u32 = 100;

/// CRM client with a process-lifetime cache for the `time_measure` options.
///
/// Records are never cached; only the option vocabulary is.
#[derive(Clone)]
pub struct CachedCrmClient<C> {
  inner: C,
  options: CacheLayer<MeasureOption>,
}

impl<C: CrmApi> CachedCrmClient<C> {
  pub fn new(inner: C) -> Self {
    Self {
      inner,
      options: CacheLayer::new(),
    }
  }

  /// Get the measure options, fetching them only while the cache is empty.
  pub async fn measure_options(&self) -> Result<Vec<MeasureOption>, CrmError> {
    let inner = self.inner.clone();
    let result = self
      .options
      .fetch_list(|| async move { inner.fetch_measure_options().await })
      .await?;

    match result.source {
      CacheSource::Memory => tracing::debug!(
        count = result.data.len(),
        cached_at = ?result.cached_at,
        "Measure options cache hit"
      ),
      CacheSource::Network => {
        if result.data.is_empty() {
          tracing::warn!("CRM returned no measure options; will fetch again on next request");
        } else {
          tracing::info!(count = result.data.len(), "Cached measure options");
        }
      }
    }

    Ok(result.data)
  }

  /// List one page of records (not cached).
  pub async fn list_records(&self) -> Result<Vec<CrmObject>, CrmError> {
    self.inner.list_records(LIST_PAGE_SIZE).await
  }

  /// Create a record (not cached - write operation).
  pub async fn create_record(&self, record: &Record) -> Result<Option<CrmObject>, CrmError> {
    self.inner.create_record(record).await
  }
}
