pub mod form;
pub mod router;
pub mod views;

pub use form::{RecordForm, Submission, ValidationError, MISSING_FIELDS_MESSAGE};
pub use router::{create_router, LIST_ERROR_MESSAGE, SAVE_ERROR_MESSAGE};
