//! # gopin - pinned Go package vendoring
//!
//! gopin clones a fixed list of Go packages at exact revisions into
//! `vendor/src/<location>` and rewrites the imports between them so they
//! resolve through the project's own import path.
//!
//! ## Quick Start
//!
//! ```bash
//! # Inside $GOPATH/src/github.com/acme/proxy
//! gopin sync
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Run configuration and namespace prefix (`GOPATH`)
//! - [`package`] - Package table and `vendor.toml`
//! - [`deps`] - Fetching and the vendoring pipeline
//! - [`rewrite`] - Import rewriting of vendored sources

/// Run configuration resolved from the environment.
pub mod config;

/// Package declarations and manifest loading.
pub mod package;

/// Package fetching and the vendoring pipeline.
pub mod deps;

/// Import rewriting.
pub mod rewrite;

/// Error types.
pub mod error;

/// Terminal UI utilities (tables, colors).
pub mod ui;
