//! Package fetching and the vendoring pipeline.
//!
//! - **Fetching**: materialize pinned git/hg revisions under `vendor/src`
//! - **Vendoring**: clear, fetch, then rewrite imports
//!
//! ## Commands
//!
//! - `gopin sync` - Rebuild `vendor/` from the package table
//! - `gopin rewrite` - Re-run the import rewrite on an existing tree
//! - `gopin clean` - Remove `vendor/`

mod fetch;
mod vendor;

pub use fetch::{Fetcher, VcsFetcher, fetch_all, strip_metadata};
pub use vendor::{VendorSummary, clear_vendor_dir, print_report, rewrite, sync};
