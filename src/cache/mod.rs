//! Response caching for analysis calls.

mod response;

pub use response::{DEFAULT_CACHE_CAPACITY, ResponseCache};
pub(crate) use response::fingerprint;
