pub mod api_types;
pub mod cached_client;
pub mod client;
pub mod error;
pub mod types;

pub use cached_client::{CachedCrmClient, LIST_PAGE_SIZE};
pub use client::{CrmApi, CrmClient, MEASURE_PROPERTY, RECORD_PROPERTIES};
pub use error::CrmError;
pub use types::{CrmObject, MeasureOption, Record, RecordProperties};
