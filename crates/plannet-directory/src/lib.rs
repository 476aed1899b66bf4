//! Plannet Directory - provider directory export pipelines
//!
//! Pulls `Organization` and `PractitionerRole` search results from a
//! Da Vinci PDex Plan-Net FHIR endpoint, flattens them and writes CSV.
//!
//! # Example
//!
//! ```no_run
//! use plannet_directory::{Config, export_organizations, http_source, organization_search_url};
//! use indicatif::ProgressBar;
//!
//! let config = Config::default();
//! let url = organization_search_url(&config.base_url, "Cottage Hospital")?;
//! let export = export_organizations(&config, http_source(&config)?, &url, &ProgressBar::hidden())?;
//! println!("{} organizations", export.rows.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod network;
pub mod organization;
pub mod query;
pub mod runner;

// Re-exports
pub use config::Config;
pub use error::MalformedEntry;
pub use network::{NETWORK_REFERENCE_URL, NetworkRow, extract_networks, unique_by_network};
pub use organization::{OrganizationRow, flatten_organization, organization_ids};
pub use query::{organization_search_url, practitioner_role_search_url};
pub use runner::{Export, ExportSummary, export_networks, export_organizations, http_source};
