//! Subcommands and the tables they print

pub mod networks;
pub mod organizations;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

use plannet_core::fmt_num;
use plannet_directory::{ExportSummary, NetworkRow};

/// Rows shown by a CSV preview before it is cut off
pub const PREVIEW_ROWS: usize = 50;

fn table_with_header<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            header
                .into_iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

/// Print a key-value summary table on stderr
pub fn print_summary(title: &str, rows: &[(&str, String)]) {
    let mut table = table_with_header([title, "Value"]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}

/// Summary table for one finished export
pub fn print_export_summary(title: &str, summary: &ExportSummary) {
    let status = if summary.is_complete() {
        "complete".to_string()
    } else if let Some(e) = summary.interrupted.first() {
        format!("incomplete ({e})")
    } else if summary.truncated {
        "incomplete (page limit)".to_string()
    } else {
        "incomplete (entries skipped)".to_string()
    };

    print_summary(
        title,
        &[
            ("Output", summary.output.display().to_string()),
            (
                "Pages",
                format!("{} ({} requests)", summary.pages, summary.requests),
            ),
            (
                "Rows",
                format!(
                    "{} from {} entries ({} skipped)",
                    fmt_num(summary.rows),
                    fmt_num(summary.entries),
                    summary.skipped
                ),
            ),
            ("Status", status),
            ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ],
    );
}

/// Read a written CSV back and print it as a table on stdout
pub fn preview_csv(path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let header = reader
        .headers()
        .with_context(|| format!("Cannot read header of {}", path.display()))?
        .clone();

    let mut table = table_with_header(header.iter());
    let mut total = 0;
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed row in {}", path.display()))?;
        if total < PREVIEW_ROWS {
            table.add_row(record.iter().collect::<Vec<_>>());
        }
        total += 1;
    }

    println!("{} ({} rows)", path.display(), fmt_num(total));
    println!("{table}");
    if total > PREVIEW_ROWS {
        println!("... {} more rows", fmt_num(total - PREVIEW_ROWS));
    }
    Ok(())
}

/// Print the first row per network name; the file on disk is left as is
pub fn print_unique_networks(rows: &[&NetworkRow]) {
    let mut table = table_with_header(["practitionerRole", "network"]);
    for row in rows {
        table.add_row(vec![row.practitioner_role.as_str(), row.network.as_str()]);
    }
    println!("Unique networks ({})", rows.len());
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn preview_reads_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("organization_ids.csv");
        std::fs::write(&path, "id,name,identifiers\n1,North,\"A, B\"\n").unwrap();
        preview_csv(&path).unwrap();
    }

    #[test]
    fn preview_header_only_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("associated_networks.csv");
        std::fs::write(&path, "practitionerRole,network\n").unwrap();
        preview_csv(&path).unwrap();
    }

    #[test]
    fn preview_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = preview_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }
}
