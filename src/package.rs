//! Package declarations.
//!
//! The packages to vendor are a fixed, ordered table. The built-in table is
//! compiled into the binary; a `vendor.toml` next to the project replaces it:
//!
//! ```toml
//! [[package]]
//! kind = "git"
//! location = "github.com/coreos/go-etcd"
//! revision = "6aa2da5a7a905609c93036b9307185a04a5a84a5"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path};

pub const MANIFEST_FILE: &str = "vendor.toml";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    Git,
    Hg,
}

impl VcsKind {
    /// Bookkeeping directory left in a fresh checkout.
    pub fn metadata_dir(self) -> &'static str {
        match self {
            VcsKind::Git => ".git",
            VcsKind::Hg => ".hg",
        }
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcsKind::Git => write!(f, "git"),
            VcsKind::Hg => write!(f, "hg"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub kind: VcsKind,
    pub location: String,
    pub revision: String,
    /// Clone source. Defaults to `https://<location>`.
    #[serde(default)]
    pub url: Option<String>,
}

impl PackageSpec {
    pub fn new(kind: VcsKind, location: &str, revision: &str) -> Self {
        Self {
            kind,
            location: location.to_string(),
            revision: revision.to_string(),
            url: None,
        }
    }

    pub fn source_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("https://{}", self.location),
        }
    }

    pub fn short_revision(&self) -> &str {
        self.revision.get(..12).unwrap_or(&self.revision)
    }
}

#[derive(Deserialize, Debug, Default)]
struct Manifest {
    #[serde(default, rename = "package")]
    packages: Vec<PackageSpec>,
}

/// The packages this project vendors when no manifest is present.
pub fn builtin_packages() -> Vec<PackageSpec> {
    vec![
        PackageSpec::new(
            VcsKind::Git,
            "github.com/coreos/go-etcd",
            "6aa2da5a7a905609c93036b9307185a04a5a84a5",
        ),
        PackageSpec::new(
            VcsKind::Git,
            "github.com/Sirupsen/logrus",
            "c0f7e35ed2e48f188c37581b4b743cf7383f85c6",
        ),
    ]
}

pub fn parse_manifest(content: &str, path: &Path) -> Result<Vec<PackageSpec>, ConfigError> {
    let manifest: Manifest = toml::from_str(content).map_err(|source| ConfigError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_packages(&manifest.packages)?;
    Ok(manifest.packages)
}

/// Load the package table.
///
/// An explicit manifest must exist. Otherwise `<root>/vendor.toml` is used if
/// present, falling back to [`builtin_packages`].
pub fn load_packages(root: &Path, manifest: Option<&Path>) -> Result<Vec<PackageSpec>, ConfigError> {
    let path = match manifest {
        Some(p) => p.to_path_buf(),
        None => {
            let default = root.join(MANIFEST_FILE);
            if !default.is_file() {
                let packages = builtin_packages();
                validate_packages(&packages)?;
                return Ok(packages);
            }
            default
        }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::ManifestRead {
        path: path.clone(),
        source,
    })?;
    parse_manifest(&content, &path)
}

/// Reject duplicate or malformed locations and empty revisions.
pub fn validate_packages(packages: &[PackageSpec]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for pkg in packages {
        check_location(&pkg.location)?;
        if pkg.revision.trim().is_empty() {
            return Err(ConfigError::EmptyRevision(pkg.location.clone()));
        }
        if !seen.insert(pkg.location.as_str()) {
            return Err(ConfigError::DuplicateLocation(pkg.location.clone()));
        }
    }
    Ok(())
}

fn check_location(location: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidLocation {
        location: location.to_string(),
        reason: reason.to_string(),
    };

    if location.is_empty() {
        return Err(invalid("location is empty"));
    }
    if location.starts_with('/') || location.ends_with('/') {
        return Err(invalid("leading or trailing '/'"));
    }
    if location.split('/').any(|seg| seg.is_empty()) {
        return Err(invalid("empty path segment"));
    }
    if !is_plain_relative(location) {
        return Err(invalid("must be a relative path without '.' or '..' segments"));
    }
    Ok(())
}

/// True when every component of `location` is a normal path segment.
pub(crate) fn is_plain_relative(location: &str) -> bool {
    !location.is_empty()
        && !location.split('/').any(|seg| seg == "." || seg == "..")
        && Path::new(location)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_packages_are_valid() {
        let packages = builtin_packages();
        assert_eq!(packages.len(), 2);
        assert!(validate_packages(&packages).is_ok());
        assert_eq!(packages[0].location, "github.com/coreos/go-etcd");
        assert_eq!(packages[1].kind, VcsKind::Git);
    }

    #[test]
    fn test_parse_manifest() {
        let toml_str = r#"
[[package]]
kind = "git"
location = "github.com/coreos/go-etcd"
revision = "6aa2da5a7a905609c93036b9307185a04a5a84a5"

[[package]]
kind = "hg"
location = "code.google.com/p/go.net"
revision = "84a4013f96e0"
url = "https://hg.example.org/go.net"
"#;
        let packages = parse_manifest(toml_str, Path::new("vendor.toml")).unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1].kind, VcsKind::Hg);
        assert_eq!(packages[1].source_url(), "https://hg.example.org/go.net");
        assert_eq!(
            packages[0].source_url(),
            "https://github.com/coreos/go-etcd"
        );
    }

    #[test]
    fn test_parse_manifest_rejects_unknown_kind() {
        let toml_str = r#"
[[package]]
kind = "svn"
location = "example.com/x"
revision = "1"
"#;
        let err = parse_manifest(toml_str, Path::new("vendor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ManifestParse { .. }));
    }

    #[test]
    fn test_duplicate_location_rejected() {
        let packages = vec![
            PackageSpec::new(VcsKind::Git, "host/a/pkg", "1"),
            PackageSpec::new(VcsKind::Hg, "host/a/pkg", "2"),
        ];
        let err = validate_packages(&packages).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateLocation(loc) if loc == "host/a/pkg"));
    }

    #[test]
    fn test_malformed_locations_rejected() {
        for location in ["", "/abs/path", "host/../etc", "host//a", "./host/a", "host/a/"] {
            let packages = vec![PackageSpec::new(VcsKind::Git, location, "1")];
            assert!(
                validate_packages(&packages).is_err(),
                "location {:?} should be rejected",
                location
            );
        }
    }

    #[test]
    fn test_empty_revision_rejected() {
        let packages = vec![PackageSpec::new(VcsKind::Git, "host/a/pkg", "  ")];
        assert!(matches!(
            validate_packages(&packages),
            Err(ConfigError::EmptyRevision(_))
        ));
    }

    #[test]
    fn test_load_packages_falls_back_to_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let packages = load_packages(dir.path(), None).unwrap();
        assert_eq!(packages, builtin_packages());
    }

    #[test]
    fn test_load_packages_reads_project_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(MANIFEST_FILE),
            "[[package]]\nkind = \"git\"\nlocation = \"host/x/one\"\nrevision = \"rev1\"\n",
        )
        .unwrap();
        let packages = load_packages(dir.path(), None).unwrap();
        assert_eq!(packages, vec![PackageSpec::new(VcsKind::Git, "host/x/one", "rev1")]);
    }

    #[test]
    fn test_load_packages_missing_explicit_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            load_packages(dir.path(), Some(&missing)),
            Err(ConfigError::ManifestRead { .. })
        ));
    }

    #[test]
    fn test_short_revision() {
        let pkg = PackageSpec::new(VcsKind::Git, "h/a", "6aa2da5a7a905609c93036b9307185a04a5a84a5");
        assert_eq!(pkg.short_revision(), "6aa2da5a7a90");
        let pkg = PackageSpec::new(VcsKind::Hg, "h/a", "abc");
        assert_eq!(pkg.short_revision(), "abc");
    }
}
