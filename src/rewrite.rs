//! Import path rewriting for vendored Go sources.
//!
//! After every package is fetched, each `.go` file under the vendor root is
//! scanned. Imports that name another vendored package are redirected into the
//! project namespace:
//!
//! ```text
//! import (
//!     "github.com/Sirupsen/logrus"
//! )
//! ```
//!
//! becomes
//!
//! ```text
//! import (
//!     "github.com/acme/proxy/vendor/src/github.com/Sirupsen/logrus"
//! )
//! ```
//!
//! The transform is textual. Candidates come from the first `import (` block
//! only, but a matching quoted literal is replaced everywhere in the file.
//! Test files (`_test.go`) are deleted instead of rewritten.

use crate::config::vendored_import;
use crate::error::RewriteError;
use crate::package::is_plain_relative;
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

pub const SOURCE_EXTENSION: &str = "go";
pub const TEST_SUFFIX: &str = "_test.go";

static IMPORT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"import \(([^)]+)").expect("import block pattern"));

// Every run of non-quote characters that directly follows a quote, on one line.
static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\n]+)"#).expect("quoted string pattern"));

/// Answers "is this import location a vendored package?".
///
/// A location counts as vendored when it names a directory under the vendor
/// root. Sub-packages of a vendored repository therefore qualify too, but only
/// if that directory actually exists.
#[derive(Debug, Clone)]
pub struct VendorIndex {
    root: PathBuf,
}

impl VendorIndex {
    pub fn new(vendor_root: &Path) -> Self {
        Self {
            root: vendor_root.to_path_buf(),
        }
    }

    pub fn contains(&self, location: &str) -> bool {
        is_plain_relative(location) && self.root.join(location).is_dir()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    pub substitutions: usize,
}

/// Candidate import locations from the first import block of `content`.
pub fn import_candidates(content: &str) -> Vec<&str> {
    let Some(block) = IMPORT_BLOCK.captures(content).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    QUOTED
        .captures_iter(block.as_str())
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Rewrite vendored imports in a single source file's text.
///
/// Returns `None` when nothing was substituted, so the caller can leave the
/// file untouched.
pub fn rewrite_source(
    content: &str,
    prefix: &str,
    is_vendored: impl Fn(&str) -> bool,
) -> Option<Rewrite> {
    let mut out = content.to_string();
    let mut substitutions = 0;
    let mut seen = HashSet::new();

    for location in import_candidates(content) {
        if !seen.insert(location) || !is_vendored(location) {
            continue;
        }
        let needle = format!("\"{}\"", location);
        let count = out.matches(&needle).count();
        if count == 0 {
            continue;
        }
        let replacement = format!("\"{}\"", vendored_import(prefix, location));
        out = out.replace(&needle, &replacement);
        substitutions += count;
    }

    (substitutions > 0).then_some(Rewrite {
        content: out,
        substitutions,
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub substitutions: usize,
    pub rewritten: Vec<PathBuf>,
    pub removed_tests: Vec<PathBuf>,
}

enum FileOutcome {
    Unchanged,
    Rewritten(PathBuf, usize),
    RemovedTest(PathBuf),
}

/// Run the rewrite pass over every Go source file under `vendor_root`.
///
/// Must only be called once all packages are fetched: the index consults the
/// filesystem, so a package fetched later would otherwise be missed.
pub fn rewrite_all(
    vendor_root: &Path,
    prefix: &str,
    index: &VendorIndex,
) -> Result<RewriteReport, RewriteError> {
    let sources = collect_sources(vendor_root)?;

    let outcomes = sources
        .par_iter()
        .map(|path| process_file(path, prefix, index))
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = RewriteReport::default();
    for outcome in outcomes {
        match outcome {
            FileOutcome::Unchanged => report.files_scanned += 1,
            FileOutcome::Rewritten(path, n) => {
                report.files_scanned += 1;
                report.substitutions += n;
                report.rewritten.push(path);
            }
            FileOutcome::RemovedTest(path) => report.removed_tests.push(path),
        }
    }
    report.rewritten.sort();
    report.removed_tests.sort();
    Ok(report)
}

fn collect_sources(vendor_root: &Path) -> Result<Vec<PathBuf>, RewriteError> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(vendor_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION) {
            sources.push(path.to_path_buf());
        }
    }
    Ok(sources)
}

fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TEST_SUFFIX))
}

fn process_file(path: &Path, prefix: &str, index: &VendorIndex) -> Result<FileOutcome, RewriteError> {
    if is_test_file(path) {
        fs::remove_file(path).map_err(|source| RewriteError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(FileOutcome::RemovedTest(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| RewriteError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match rewrite_source(&content, prefix, |loc| index.contains(loc)) {
        Some(rewrite) => {
            fs::write(path, &rewrite.content).map_err(|source| RewriteError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(FileOutcome::Rewritten(path.to_path_buf(), rewrite.substitutions))
        }
        None => Ok(FileOutcome::Unchanged),
    }
}
