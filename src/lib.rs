//! Web front-end for viewing and creating HubSpot custom object records.
//!
//! Three routes, each backed by one CRM API call:
//! - `GET /` lists records
//! - `GET /update-cobj` shows the creation form
//! - `POST /update-cobj` validates and creates a record

pub mod cache;
pub mod config;
pub mod crm;
pub mod telemetry;
pub mod web;

pub use config::Config;
pub use crm::{CachedCrmClient, CrmApi, CrmClient};
pub use web::create_router;
