//! Organizations subcommand - export `id,name,identifiers` for a name search

use anyhow::Result;
use clap::{ArgGroup, Args};

use plannet_core::SharedProgress;
use plannet_directory::{
    Config, Export, OrganizationRow, export_organizations, http_source, organization_search_url,
};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("search").required(true).args(["name", "url"])))]
pub struct OrganizationsArgs {
    /// Organization name to search for, e.g. "Cottage Hospital"
    #[arg(long)]
    pub name: Option<String>,

    /// Full Organization search URL, used verbatim
    #[arg(long)]
    pub url: Option<String>,
}

impl OrganizationsArgs {
    pub fn search_url(&self, config: &Config) -> Result<String> {
        match (&self.url, &self.name) {
            (Some(url), _) => Ok(url.clone()),
            (None, Some(name)) => organization_search_url(&config.base_url, name),
            (None, None) => anyhow::bail!("Either --name or --url must be provided"),
        }
    }
}

/// Export and preview; returns the rows for chaining
pub fn export(
    args: &OrganizationsArgs,
    config: &Config,
    progress: &SharedProgress,
) -> Result<Export<OrganizationRow>> {
    let url = args.search_url(config)?;
    let pb = progress.page_spinner("organizations");
    let result = export_organizations(config, http_source(config)?, &url, &pb);
    pb.finish_and_clear();
    let export = result?;

    super::print_export_summary("Organizations", &export.summary);
    super::preview_csv(&export.summary.output)?;
    Ok(export)
}

pub fn run(args: OrganizationsArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    export(&args, config, progress).map(|_| ())
}
