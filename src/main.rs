//! # gopin CLI Entry Point
//!
//! Parses arguments with clap and routes to the vendoring pipeline.
//!
//! ## Commands
//!
//! - `sync` (default) - clear `vendor/`, fetch every package, rewrite imports
//! - `rewrite` - rewrite imports in an existing `vendor/` tree
//! - `list` - show the package table
//! - `clean` - remove `vendor/`
//! - `completions` - print shell completions

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::path::PathBuf;

use gopin::config::RunConfig;
use gopin::deps::{self, VcsFetcher};
use gopin::package;
use gopin::ui;

#[derive(Parser)]
#[command(name = "gopin")]
#[command(about = "Vendor pinned Go packages into your project", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone)]
struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args, Clone, Default)]
struct ManifestArgs {
    /// Package manifest (defaults to <root>/vendor.toml, then the built-in table)
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild vendor/ from the package table
    Sync {
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        manifest: ManifestArgs,
        /// Import namespace to use instead of the one derived from GOPATH
        #[arg(long)]
        prefix: Option<String>,
        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
        /// List every rewritten file
        #[arg(short, long)]
        verbose: bool,
    },
    /// Rewrite imports in the existing vendor/ tree
    Rewrite {
        #[command(flatten)]
        project: ProjectArgs,
        /// Import namespace to use instead of the one derived from GOPATH
        #[arg(long)]
        prefix: Option<String>,
        /// List every rewritten file
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show the packages that would be vendored
    List {
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// Remove the vendor/ directory
    Clean {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Sync {
        project: ProjectArgs {
            root: PathBuf::from("."),
        },
        manifest: ManifestArgs::default(),
        prefix: None,
        quiet: false,
        verbose: false,
    });

    match command {
        Commands::Sync {
            project,
            manifest,
            prefix,
            quiet,
            verbose,
        } => {
            let config = RunConfig::from_env(&project.root, prefix.as_deref())?;
            let packages = package::load_packages(&config.project_root, manifest.manifest.as_deref())?;

            let summary = deps::sync(&config, &packages, &VcsFetcher::new(quiet), quiet)
                .context("Vendoring failed")?;

            if !quiet {
                deps::print_report(&config, &summary.report, verbose);
                println!(
                    "{} Vendored {} packages.",
                    "✓".green(),
                    summary.packages.len()
                );
            }
            Ok(())
        }
        Commands::Rewrite {
            project,
            prefix,
            verbose,
        } => {
            let config = RunConfig::from_env(&project.root, prefix.as_deref())?;
            if !config.vendor_root.is_dir() {
                anyhow::bail!(
                    "No vendor tree at {}. Run 'gopin sync' first.",
                    config.vendor_root.display()
                );
            }
            let report = deps::rewrite(&config, false).context("Rewrite failed")?;
            deps::print_report(&config, &report, verbose);
            Ok(())
        }
        Commands::List { project, manifest } => {
            let packages = package::load_packages(&project.root, manifest.manifest.as_deref())?;
            ui::print_packages(&packages);
            Ok(())
        }
        Commands::Clean { project } => {
            let root = project
                .root
                .canonicalize()
                .with_context(|| format!("Cannot resolve {}", project.root.display()))?;
            let config = RunConfig::new(root, String::new());
            if deps::clear_vendor_dir(&config)? {
                println!("{} Removed {}", "🗑️".red(), config.vendor_dir.display());
            } else {
                println!("{} Nothing to clean", "!".yellow());
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
    }
}
