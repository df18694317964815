//! The vendoring pipeline.
//!
//! `gopin sync` runs the whole thing:
//!
//! 1. Remove `vendor/`
//! 2. Fetch every package in declared order
//! 3. Rewrite imports across the fetched tree
//!
//! The rewrite step only starts once every fetch is done, so a package can
//! refer to one declared after it.

use crate::config::RunConfig;
use crate::deps::fetch::{Fetcher, fetch_all};
use crate::error::{FetchError, RewriteError, VendorError};
use crate::package::{PackageSpec, validate_packages};
use crate::rewrite::{RewriteReport, VendorIndex, rewrite_all};
use crate::ui;
use colored::*;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct VendorSummary {
    pub packages: Vec<PathBuf>,
    pub report: RewriteReport,
}

/// Delete the vendor directory. Returns whether anything was removed.
pub fn clear_vendor_dir(config: &RunConfig) -> Result<bool, FetchError> {
    if !config.vendor_dir.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(&config.vendor_dir).map_err(|source| FetchError::Io {
        path: config.vendor_dir.clone(),
        source,
    })?;
    Ok(true)
}

pub fn sync(
    config: &RunConfig,
    packages: &[PackageSpec],
    fetcher: &dyn Fetcher,
    quiet: bool,
) -> Result<VendorSummary, VendorError> {
    validate_packages(packages)?;

    clear_vendor_dir(config)?;
    fs::create_dir_all(&config.vendor_root).map_err(|source| FetchError::Io {
        path: config.vendor_root.clone(),
        source,
    })?;

    if !quiet {
        println!(
            "{} Vendoring {} packages into {}...",
            "📦".blue(),
            packages.len(),
            config.vendor_root.display()
        );
    }
    let fetched = fetch_all(config, packages, fetcher)?;

    let report = rewrite(config, quiet)?;
    Ok(VendorSummary {
        packages: fetched,
        report,
    })
}

/// Rewrite pass alone, over whatever is already in the vendor root.
pub fn rewrite(config: &RunConfig, quiet: bool) -> Result<RewriteReport, RewriteError> {
    if !quiet {
        println!(
            "{} Rewriting imports under {}/vendor/src...",
            "⚡".yellow(),
            config.namespace_prefix
        );
    }
    let index = VendorIndex::new(&config.vendor_root);
    rewrite_all(&config.vendor_root, &config.namespace_prefix, &index)
}

pub fn print_report(config: &RunConfig, report: &RewriteReport, verbose: bool) {
    let mut table = ui::Table::new(&["Metric", "Count"]);
    table.add_row(vec![
        "Files scanned".dimmed().to_string(),
        report.files_scanned.to_string(),
    ]);
    table.add_row(vec![
        "Files rewritten".green().to_string(),
        report.rewritten.len().to_string(),
    ]);
    table.add_row(vec![
        "Imports rewritten".green().to_string(),
        report.substitutions.to_string(),
    ]);
    table.add_row(vec![
        "Test files removed".dimmed().to_string(),
        report.removed_tests.len().to_string(),
    ]);
    table.print();

    if verbose {
        for path in &report.rewritten {
            let shown = path.strip_prefix(&config.vendor_root).unwrap_or(path);
            println!("   {} {}", "~".yellow(), shown.display());
        }
    }
}
