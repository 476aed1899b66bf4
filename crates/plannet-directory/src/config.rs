//! Directory export configuration

use std::num::NonZeroUsize;
use std::path::PathBuf;

use plannet_core::{FHIR_JSON, OnError};

/// Default Plan-Net endpoint (Anthem CMS-mandated Medicaid directory)
pub const DEFAULT_BASE_URL: &str = "https://cmsmanapi.anthem.com/fhir/cms_mandate/mcd/";

/// Runtime configuration for the export pipelines
#[derive(Debug, Clone)]
pub struct Config {
    /// FHIR base URL that search paths are joined onto
    pub base_url: String,
    /// `Accept` header sent with every page request (empty = none)
    pub accept: String,
    /// Directory the CSV files are written into
    pub output_dir: PathBuf,
    pub organizations_file: PathBuf,
    pub networks_file: PathBuf,
    /// Failure policy for pages and entries, shared by both pipelines
    pub on_error: OnError,
    /// Maximum pages per search (for testing)
    pub max_pages: Option<NonZeroUsize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept: FHIR_JSON.to_string(),
            output_dir: PathBuf::from("."),
            organizations_file: PathBuf::from("organization_ids.csv"),
            networks_file: PathBuf::from("associated_networks.csv"),
            on_error: OnError::Partial,
            max_pages: None,
        }
    }
}

impl Config {
    pub fn organizations_path(&self) -> PathBuf {
        self.output_dir.join(&self.organizations_file)
    }

    pub fn networks_path(&self) -> PathBuf {
        self.output_dir.join(&self.networks_file)
    }
}
