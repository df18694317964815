//! Run configuration.
//!
//! All paths used by a run are resolved once into a [`RunConfig`] and passed
//! explicitly to the fetch and rewrite stages.
//!
//! The namespace prefix is the project root relative to `$GOPATH/src`, e.g.
//! a project at `$GOPATH/src/github.com/acme/proxy` gets the prefix
//! `github.com/acme/proxy` and vendored imports become
//! `github.com/acme/proxy/vendor/src/<location>`.

use crate::error::ConfigError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

pub const WORKSPACE_ENV: &str = "GOPATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub project_root: PathBuf,
    /// `<root>/vendor`, removed wholesale before a sync.
    pub vendor_dir: PathBuf,
    /// `<root>/vendor/src`, where each package lives under its location.
    pub vendor_root: PathBuf,
    pub namespace_prefix: String,
}

impl RunConfig {
    /// Resolve the configuration from the process environment.
    ///
    /// `prefix` overrides the namespace derived from `GOPATH`; when it is given
    /// the environment is not consulted.
    pub fn from_env(root: &Path, prefix: Option<&str>) -> Result<Self, ConfigError> {
        let project_root = canonical_root(root)?;
        let namespace_prefix = match prefix {
            Some(p) => p.trim_matches('/').to_string(),
            None => {
                let gopath = std::env::var_os(WORKSPACE_ENV)
                    .filter(|v| !v.is_empty())
                    .ok_or(ConfigError::MissingEnv(WORKSPACE_ENV))?;
                namespace_for(&project_root, &gopath)?
            }
        };
        Ok(Self::new(project_root, namespace_prefix))
    }

    pub fn new(project_root: PathBuf, namespace_prefix: String) -> Self {
        let vendor_dir = project_root.join("vendor");
        let vendor_root = vendor_dir.join("src");
        Self {
            project_root,
            vendor_dir,
            vendor_root,
            namespace_prefix,
        }
    }

    /// Import path a vendored package is reachable under.
    pub fn vendored_import(&self, location: &str) -> String {
        vendored_import(&self.namespace_prefix, location)
    }

    pub fn package_path(&self, location: &str) -> PathBuf {
        self.vendor_root.join(location)
    }
}

pub fn vendored_import(prefix: &str, location: &str) -> String {
    if prefix.is_empty() {
        format!("vendor/src/{}", location)
    } else {
        format!("{}/vendor/src/{}", prefix, location)
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf, ConfigError> {
    root.canonicalize().map_err(|source| ConfigError::ProjectRoot {
        path: root.to_path_buf(),
        source,
    })
}

/// Derive the namespace prefix from a (possibly multi-entry) `GOPATH` value.
///
/// The first workspace whose `src` directory contains `project_root` wins.
pub fn namespace_for(project_root: &Path, gopath: &OsStr) -> Result<String, ConfigError> {
    let mut tried = Vec::new();

    for entry in std::env::split_paths(gopath) {
        if entry.as_os_str().is_empty() {
            continue;
        }
        let src = expand_home(&entry).join("src");
        tried.push(src.display().to_string());

        // Workspaces that do not exist cannot contain the project.
        let Ok(src) = src.canonicalize() else {
            continue;
        };
        if let Ok(relative) = project_root.strip_prefix(&src) {
            return Ok(slash_path(relative));
        }
    }

    Err(ConfigError::OutsideWorkspace {
        root: project_root.to_path_buf(),
        var: WORKSPACE_ENV,
        workspaces: tried.join(", "),
    })
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
