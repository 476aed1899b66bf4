//! Run subcommand - organizations, then networks of every organization found

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use plannet_core::SharedProgress;
use plannet_directory::{Config, organization_ids, practitioner_role_search_url};

use super::organizations::OrganizationsArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub search: OrganizationsArgs,

    /// Also write the one-row-per-network view to this file
    #[arg(long)]
    pub unique_output: Option<PathBuf>,
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let orgs = super::organizations::export(&args.search, config, progress)?;

    let ids = organization_ids(&orgs.rows);
    if ids.is_empty() {
        log::warn!("No organization ids found, skipping network export");
        return Ok(());
    }
    log::info!("Fetching networks for {} organizations", ids.len());

    let urls = ids
        .into_iter()
        .map(|id| practitioner_role_search_url(&config.base_url, id))
        .collect::<Result<Vec<_>>>()?;
    super::networks::export(&urls, args.unique_output.as_ref(), config, progress)?;
    Ok(())
}
