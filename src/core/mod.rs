//! Core utilities shared across the pipeline
//!
//! - `cache`: whole-file JSON documents on disk
//! - `http`: HTTP client and retrying, rate-limited JSON GET

pub mod cache;
pub mod http;

pub use cache::{read_json, try_read_to_string, write_json, write_string};
pub use http::{build_client, get_json_with_retry, RetryPolicy};
