//! Networks subcommand - export `practitionerRole,network` for organizations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Args};

use plannet_core::{SharedProgress, write_csv};
use plannet_directory::{
    Config, Export, NetworkRow, export_networks, http_source, practitioner_role_search_url,
    unique_by_network,
};

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("search").required(true).multiple(true).args(["organization", "url"])))]
pub struct NetworksArgs {
    /// Organization id(s), bare or as `Organization/<id>` (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub organization: Vec<String>,

    /// Full PractitionerRole search URL(s), used verbatim
    #[arg(long)]
    pub url: Vec<String>,

    /// Also write the one-row-per-network view to this file
    #[arg(long)]
    pub unique_output: Option<PathBuf>,
}

impl NetworksArgs {
    pub fn search_urls(&self, config: &Config) -> Result<Vec<String>> {
        let mut urls = self.url.clone();
        for org in &self.organization {
            urls.push(practitioner_role_search_url(&config.base_url, org)?);
        }
        Ok(urls)
    }
}

/// Export networks for `urls`, preview the file, then show and optionally
/// persist the de-duplicated view
pub fn export(
    urls: &[String],
    unique_output: Option<&PathBuf>,
    config: &Config,
    progress: &SharedProgress,
) -> Result<Export<NetworkRow>> {
    if let Some(path) = unique_output {
        ensure_separate(path, &config.networks_path())?;
    }

    let pb = progress.page_spinner("networks");
    let result = export_networks(config, http_source(config)?, urls, &pb);
    pb.finish_and_clear();
    let export = result?;

    super::print_export_summary("Networks", &export.summary);
    super::preview_csv(&export.summary.output)?;

    super::print_unique_networks(&unique_by_network(&export.rows));
    if let Some(path) = unique_output {
        write_unique(&export.rows, path, &config.networks_path())?;
    }

    Ok(export)
}

/// Write the one-row-per-network view to `path`, never over `main`
fn write_unique(rows: &[NetworkRow], path: &Path, main: &Path) -> Result<usize> {
    ensure_separate(path, main)?;
    let written = write_csv(path, unique_by_network(rows))
        .with_context(|| format!("Cannot write {}", path.display()))?;
    log::info!("Unique networks: {written} rows -> {}", path.display());
    Ok(written)
}

fn ensure_separate(path: &Path, main: &Path) -> Result<()> {
    if resolve(path) == resolve(main) {
        anyhow::bail!(
            "--unique-output {} would overwrite the networks file",
            path.display()
        );
    }
    Ok(())
}

/// `path` with its directory canonicalized when that directory exists
fn resolve(path: &Path) -> PathBuf {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    match (dir.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

pub fn run(args: NetworksArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let urls = args.search_urls(config)?;
    export(&urls, args.unique_output.as_ref(), config, progress).map(|_| ())
}
