//! Export runner: paginate → flatten → write CSV

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde_json::Value;

use plannet_core::{FetchError, HttpPageSource, OnError, PageSource, Paginator, Record, write_csv};

use crate::config::Config;
use crate::error::MalformedEntry;
use crate::network::{NetworkRow, extract_networks};
use crate::organization::{OrganizationRow, flatten_organization};

/// Export execution summary
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub searches: usize,
    pub requests: usize,
    pub pages: usize,
    pub entries: usize,
    pub rows: usize,
    /// Malformed entries skipped under [`OnError::Partial`]
    pub skipped: usize,
    /// Page failures that cut a search short under [`OnError::Partial`]
    pub interrupted: Vec<FetchError>,
    /// Some search stopped at the page limit
    pub truncated: bool,
    pub elapsed: Duration,
}

impl ExportSummary {
    /// True when every page was read and every entry flattened
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_empty() && !self.truncated && self.skipped == 0
    }

    /// Log summary for non-TTY output
    pub fn log(&self, label: &str) {
        log::info!(
            "{label}: {} rows from {} entries on {} pages ({} skipped) in {:.1}s -> {}",
            self.rows,
            self.entries,
            self.pages,
            self.skipped,
            self.elapsed.as_secs_f64(),
            self.output.display()
        );
        for e in &self.interrupted {
            log::warn!("{label}: incomplete, pagination stopped by {e}");
        }
    }
}

/// Rows written by an export, kept for previews and chaining
#[derive(Debug)]
pub struct Export<R> {
    pub rows: Vec<R>,
    pub summary: ExportSummary,
}

/// Page source configured from `config.accept`
pub fn http_source(config: &Config) -> Result<HttpPageSource> {
    Ok(HttpPageSource::with_accept(&config.accept)?)
}

/// Export organizations matching one search URL to `config.organizations_path()`
pub fn export_organizations<S: PageSource>(
    config: &Config,
    source: S,
    start_url: &str,
    pb: &ProgressBar,
) -> Result<Export<OrganizationRow>> {
    run_export(
        "organizations",
        config,
        source,
        &[start_url.to_string()],
        &config.organizations_path(),
        pb,
        |entry| flatten_organization(entry).map(|row| vec![row]),
    )
}

/// Export network associations from one or more PractitionerRole searches
/// into the single file `config.networks_path()`
pub fn export_networks<S: PageSource>(
    config: &Config,
    source: S,
    start_urls: &[String],
    pb: &ProgressBar,
) -> Result<Export<NetworkRow>> {
    run_export(
        "networks",
        config,
        source,
        start_urls,
        &config.networks_path(),
        pb,
        extract_networks,
    )
}

/// Shared pipeline: every search is fully paginated and flattened before
/// the file is written, so an aborted export leaves no file behind.
fn run_export<S, R, F>(
    label: &str,
    config: &Config,
    source: S,
    start_urls: &[String],
    output: &Path,
    pb: &ProgressBar,
    mut flatten: F,
) -> Result<Export<R>>
where
    S: PageSource,
    R: Record,
    F: FnMut(&Value) -> Result<Vec<R>, MalformedEntry>,
{
    let start = Instant::now();
    let mut paginator = Paginator::new(source)
        .on_error(config.on_error)
        .max_pages(config.max_pages);
    let mut summary = ExportSummary {
        output: output.to_path_buf(),
        ..Default::default()
    };
    let mut rows = Vec::new();

    for url in start_urls {
        log::info!("{label}: fetching {url}");
        let collected = paginator
            .collect(url, pb)
            .with_context(|| format!("{label}: failed to fetch data from {url}"))?;

        summary.searches += 1;
        summary.requests += collected.requests;
        summary.pages += collected.pages;
        summary.entries += collected.entries.len();
        summary.truncated |= collected.truncated;
        summary.interrupted.extend(collected.interrupted);

        for (idx, entry) in collected.entries.iter().enumerate() {
            match flatten(entry) {
                Ok(flat) => rows.extend(flat),
                Err(e) if config.on_error == OnError::Abort => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("{label}: entry {idx} of {url} is unusable")));
                }
                Err(e) => {
                    log::warn!("{label}: skipping entry {idx} of {url}: {e}");
                    summary.skipped += 1;
                }
            }
        }
    }

    summary.rows = write_csv(output, &rows)
        .with_context(|| format!("Cannot write {}", output.display()))?;
    summary.elapsed = start.elapsed();
    summary.log(label);

    Ok(Export { rows, summary })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use plannet_core::Bundle;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::network::NETWORK_REFERENCE_URL;

    /// Serves queued responses in order regardless of URL
    #[derive(Default)]
    struct Queue(VecDeque<Result<Bundle, FetchError>>);

    impl Queue {
        fn ok(mut self, body: Value) -> Self {
            self.0.push_back(Ok(serde_json::from_value(body).unwrap()));
            self
        }

        fn status(mut self, status: u16) -> Self {
            self.0.push_back(Err(FetchError::Http {
                status: Some(status),
                message: "mock".to_string(),
            }));
            self
        }
    }

    impl PageSource for Queue {
        fn fetch(&mut self, _url: &str) -> Result<Bundle, FetchError> {
            self.0.pop_front().expect("unexpected extra request")
        }
    }

    fn config(dir: &TempDir, on_error: OnError) -> Config {
        Config {
            output_dir: dir.path().to_path_buf(),
            on_error,
            ..Default::default()
        }
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    fn role(id: &str, network: &str) -> Value {
        json!({"resource": {
            "id": id,
            "extension": [{"url": NETWORK_REFERENCE_URL, "valueReference": {"display": network}}]
        }})
    }

    #[test]
    fn organizations_written_with_header() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Partial);
        let source = Queue::default().ok(json!({
            "entry": [
                {"resource": {"id": "1", "name": "North", "identifier": [{"value": "A"}, {"value": "B"}]}},
                {"resource": {"id": "2", "name": "South"}}
            ]
        }));

        let export =
            export_organizations(&config, source, "https://x/Organization", &ProgressBar::hidden())
                .unwrap();

        assert_eq!(export.summary.rows, 2);
        assert!(export.summary.is_complete());
        assert_eq!(
            lines(&config.organizations_path()),
            vec!["id,name,identifiers", r#"1,North,"A, B""#, "2,South,"]
        );
    }

    #[test]
    fn organizations_first_page_failure_is_header_only() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Partial);
        let source = Queue::default().status(500);

        let export =
            export_organizations(&config, source, "https://x/Organization", &ProgressBar::hidden())
                .unwrap();

        assert_eq!(export.summary.rows, 0);
        assert_eq!(export.summary.interrupted[0].status(), Some(500));
        assert!(!export.summary.is_complete());
        assert_eq!(lines(&config.organizations_path()), vec!["id,name,identifiers"]);
    }

    #[test]
    fn networks_abort_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Abort);
        let source = Queue::default().status(502);

        let err = export_networks(
            &config,
            source,
            &["https://x/PractitionerRole".to_string()],
            &ProgressBar::hidden(),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("HTTP 502"));
        assert!(!config.networks_path().exists());
    }

    #[test]
    fn networks_skip_malformed_under_partial() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Partial);
        let source = Queue::default().ok(json!({
            "entry": [role("pr-1", "Net A"), {"fullUrl": "no resource"}, role("pr-2", "Net B")]
        }));

        let export = export_networks(
            &config,
            source,
            &["https://x/PractitionerRole".to_string()],
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(export.summary.skipped, 1);
        assert_eq!(
            lines(&config.networks_path()),
            vec!["practitionerRole,network", "pr-1,Net A", "pr-2,Net B"]
        );
    }

    #[test]
    fn networks_malformed_aborts_under_abort() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Abort);
        let source = Queue::default().ok(json!({"entry": [{"fullUrl": "no resource"}]}));

        let err = export_networks(
            &config,
            source,
            &["https://x/PractitionerRole".to_string()],
            &ProgressBar::hidden(),
        )
        .unwrap_err();

        assert!(format!("{err:#}").contains("malformed record"));
        assert!(!config.networks_path().exists());
    }

    #[test]
    fn networks_from_several_searches_share_one_file() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, OnError::Partial);
        let source = Queue::default()
            .ok(json!({"entry": [role("pr-1", "Net A")]}))
            .ok(json!({"entry": [role("pr-2", "Net A"), role("pr-3", "Net C")]}));
        let urls = vec![
            "https://x/PractitionerRole?organization=Organization/1".to_string(),
            "https://x/PractitionerRole?organization=Organization/2".to_string(),
        ];

        let export = export_networks(&config, source, &urls, &ProgressBar::hidden()).unwrap();

        assert_eq!(export.summary.searches, 2);
        assert_eq!(export.summary.requests, 2);
        assert_eq!(export.rows.len(), 3);
        assert_eq!(lines(&config.networks_path()).len(), 4);
    }
}
