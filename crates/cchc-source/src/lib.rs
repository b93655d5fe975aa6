//! Dataset loading for the CCHC topic dashboard.
//!
//! Fetches the message CSV over HTTP with a timeout and bounded retries,
//! validates the schema at load time, and keeps the parsed table in an
//! explicit [`DatasetCache`] owned by the hosting application.

pub mod cache;
pub mod client;
pub mod error;
pub mod parse;
mod retry;
pub mod source;

pub use cache::{Clock, DatasetCache, SystemClock};
pub use client::DatasetClient;
pub use error::SourceError;
pub use parse::{parse_dataset, REQUIRED_COLUMNS};
pub use source::DataSource;
