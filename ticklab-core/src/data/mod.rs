//! Raw quote records and their conversion into typed bars.

pub mod raw;

pub use raw::{DataError, RawQuote};
