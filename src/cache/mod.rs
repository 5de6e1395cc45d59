//! Generic in-memory caching layer.
//!
//! Memoizes near-static lists fetched from an upstream API for the lifetime
//! of the process. There is no expiry and no invalidation.

mod layer;
mod traits;

pub use layer::CacheLayer;
pub use traits::{CacheResult, CacheSource};
