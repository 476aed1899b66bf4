//! Plannet Core - Common infrastructure for directory export pipelines
//!
//! This crate provides the reusable pieces every export is built from:
//! a blocking HTTP page source, link-following pagination, CSV output
//! and logging/progress plumbing.

pub mod error;
pub mod http;
pub mod logging;
pub mod paginate;
pub mod progress;
pub mod sink;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{
    FHIR_JSON, HttpConfig, HttpPageSource, SHARED_RUNTIME, http_client, http_config,
    set_http_config,
};
pub use logging::{IndicatifLogger, init_logging};
pub use paginate::{Bundle, BundleLink, Collected, OnError, PageSource, Paginator};
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use sink::{CsvSink, Record, write_csv};
