//! Package fetching.
//!
//! Materializes one pinned revision of each package at
//! `<vendor root>/<location>` and strips the VCS bookkeeping directory.
//!
//! ## Backends
//!
//! - **git** - cloned in-process with `git2`, then hard reset to the revision
//! - **hg** - `hg clone --updaterev <rev>` through the system `hg` binary

use crate::config::RunConfig;
use crate::error::FetchError;
use crate::package::{PackageSpec, VcsKind};
use colored::*;
use git2::build::{CheckoutBuilder, RepoBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of package trees.
///
/// Implementations place exactly the tree of `spec.revision` at `dest`.
/// `dest` does not exist yet or is an empty directory.
pub trait Fetcher {
    fn fetch(&self, spec: &PackageSpec, dest: &Path) -> Result<(), FetchError>;
}

/// Fetches through git or Mercurial depending on the package kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct VcsFetcher {
    pub quiet: bool,
}

impl VcsFetcher {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn spinner(&self, spec: &PackageSpec) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷"),
        );
        pb.set_message(format!(
            "Fetching {} @ {}...",
            spec.location,
            spec.short_revision()
        ));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

impl Fetcher for VcsFetcher {
    fn fetch(&self, spec: &PackageSpec, dest: &Path) -> Result<(), FetchError> {
        let pb = self.spinner(spec);
        let result = match spec.kind {
            VcsKind::Git => fetch_git(spec, dest),
            VcsKind::Hg => fetch_hg(spec, dest),
        };

        match &result {
            Ok(()) => pb.finish_with_message(format!(
                "{} {} @ {}",
                "✓".green(),
                spec.location,
                spec.short_revision()
            )),
            Err(_) => pb.finish_with_message(format!("{} Failed {}", "x".red(), spec.location)),
        }
        result
    }
}

fn fetch_git(spec: &PackageSpec, dest: &Path) -> Result<(), FetchError> {
    let url = spec.source_url();

    // Clone without populating the work tree; the reset below does that.
    let mut no_checkout = CheckoutBuilder::new();
    no_checkout.dry_run();
    let repo = RepoBuilder::new()
        .with_checkout(no_checkout)
        .clone(&url, dest)
        .map_err(|source| FetchError::Clone {
            location: spec.location.clone(),
            url: url.clone(),
            source,
        })?;

    let unknown = |source| FetchError::UnknownRevision {
        location: spec.location.clone(),
        revision: spec.revision.clone(),
        source,
    };
    let commit = repo
        .revparse_single(&spec.revision)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(unknown)?;

    let mut force = CheckoutBuilder::new();
    force.force();
    repo.reset(commit.as_object(), git2::ResetType::Hard, Some(&mut force))
        .map_err(|source| FetchError::Checkout {
            location: spec.location.clone(),
            revision: spec.revision.clone(),
            source,
        })?;
    Ok(())
}

fn fetch_hg(spec: &PackageSpec, dest: &Path) -> Result<(), FetchError> {
    let url = spec.source_url();
    let mut cmd = Command::new("hg");
    cmd.args(["clone", "--quiet", "--updaterev", &spec.revision, &url])
        .arg(dest);

    let command = format!(
        "hg clone --quiet --updaterev {} {} {}",
        spec.revision,
        url,
        dest.display()
    );
    match cmd.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(FetchError::Command {
            command,
            status: status.to_string(),
        }),
        Err(e) => Err(FetchError::Command {
            command,
            status: format!("could not start hg: {}", e),
        }),
    }
}

/// Fetch every package, in declared order, under `config.vendor_root`.
///
/// Returns the local path of each package.
pub fn fetch_all(
    config: &RunConfig,
    packages: &[PackageSpec],
    fetcher: &dyn Fetcher,
) -> Result<Vec<PathBuf>, FetchError> {
    let mut paths = Vec::with_capacity(packages.len());

    for spec in packages {
        let dest = config.package_path(&spec.location);
        ensure_empty_destination(&dest)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|source| FetchError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fetcher.fetch(spec, &dest)?;
        strip_metadata(&dest, spec.kind)?;
        paths.push(dest);
    }

    Ok(paths)
}

fn ensure_empty_destination(dest: &Path) -> Result<(), FetchError> {
    if !dest.exists() {
        return Ok(());
    }
    let io_err = |source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    };
    if !dest.is_dir() || fs::read_dir(dest).map_err(io_err)?.next().is_some() {
        return Err(FetchError::DestinationNotEmpty(dest.to_path_buf()));
    }
    Ok(())
}

/// Remove the VCS bookkeeping directory from a fetched package.
pub fn strip_metadata(dest: &Path, kind: VcsKind) -> Result<(), FetchError> {
    let meta = dest.join(kind.metadata_dir());
    if meta.exists() {
        fs::remove_dir_all(&meta).map_err(|source| FetchError::Io { path: meta, source })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Writes a single marker file and a fake `.git` directory.
    #[derive(Default)]
    struct RecordingFetcher {
        calls: RefCell<Vec<String>>,
    }

    impl Fetcher for RecordingFetcher {
        fn fetch(&self, spec: &PackageSpec, dest: &Path) -> Result<(), FetchError> {
            self.calls.borrow_mut().push(spec.location.clone());
            fs::create_dir_all(dest.join(".git").join("objects")).unwrap();
            fs::write(dest.join("pkg.go"), format!("package p // {}", spec.revision)).unwrap();
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> RunConfig {
        RunConfig::new(dir.to_path_buf(), "github.com/acme/proxy".to_string())
    }

    #[test]
    fn test_fetch_all_in_declared_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let packages = vec![
            PackageSpec::new(VcsKind::Git, "host/x/one", "rev1"),
            PackageSpec::new(VcsKind::Git, "host/y/two", "rev2"),
        ];
        let fetcher = RecordingFetcher::default();

        let paths = fetch_all(&config, &packages, &fetcher).unwrap();

        assert_eq!(*fetcher.calls.borrow(), vec!["host/x/one", "host/y/two"]);
        assert_eq!(paths[0], config.vendor_root.join("host/x/one"));
        assert!(paths[1].join("pkg.go").is_file());
        assert!(!paths[0].join(".git").exists());
    }

    #[test]
    fn test_non_empty_destination_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let dest = config.package_path("host/x/one");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.go"), "package stale").unwrap();

        let packages = vec![PackageSpec::new(VcsKind::Git, "host/x/one", "rev1")];
        let fetcher = RecordingFetcher::default();
        let err = fetch_all(&config, &packages, &fetcher).unwrap_err();

        assert!(matches!(err, FetchError::DestinationNotEmpty(p) if p == dest));
        assert!(fetcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_destination_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::create_dir_all(config.package_path("host/x/one")).unwrap();

        let packages = vec![PackageSpec::new(VcsKind::Git, "host/x/one", "rev1")];
        assert!(fetch_all(&config, &packages, &RecordingFetcher::default()).is_ok());
    }

    #[test]
    fn test_strip_metadata_for_hg() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".hg/store")).unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();

        strip_metadata(dir.path(), VcsKind::Hg).unwrap();
        assert!(!dir.path().join(".hg").exists());
        assert!(dir.path().join(".git").exists());
    }

    #[test]
    fn test_git_clone_failure_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = PackageSpec::new(VcsKind::Git, "host/none/missing", "abc");
        spec.url = Some(dir.path().join("does-not-exist").display().to_string());

        let err = VcsFetcher::new(true)
            .fetch(&spec, &dir.path().join("dest"))
            .unwrap_err();
        assert!(matches!(err, FetchError::Clone { .. }));
    }
}
