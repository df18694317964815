//! Error types for the vendoring pipeline.
//!
//! Each stage has its own error kind so callers can tell a bad configuration
//! from a network failure from a broken vendored file:
//!
//! - [`ConfigError`] - detected before any fetch starts
//! - [`FetchError`] - a package could not be materialized
//! - [`RewriteError`] - a vendored file could not be read, written or removed
//!
//! All of them are terminal for the run.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("cannot resolve project root {}: {source}", path.display())]
    ProjectRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("project root {} is not inside any {var} workspace ({workspaces})", root.display())]
    OutsideWorkspace {
        root: PathBuf,
        var: &'static str,
        workspaces: String,
    },

    #[error("cannot read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("package location '{0}' is declared more than once")]
    DuplicateLocation(String),

    #[error("invalid package location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("package '{0}' has an empty revision")]
    EmptyRevision(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("destination {} already exists and is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    #[error("failed to clone {location} from {url}: {source}")]
    Clone {
        location: String,
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("revision {revision} not found in {location}: {source}")]
    UnknownRevision {
        location: String,
        revision: String,
        #[source]
        source: git2::Error,
    },

    #[error("failed to check out {revision} of {location}: {source}")]
    Checkout {
        location: String,
        revision: String,
        #[source]
        source: git2::Error,
    },

    #[error("command failed ({status}): `{command}`")]
    Command { command: String, status: String },

    #[error("filesystem error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot remove test file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot walk vendor tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Any failure of a full vendoring run.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}
