//! CLI argument definitions for Wheelhouse.
//!
//! Uses `clap` derive macros to define the full command surface. Each
//! command corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wheelhouse",
    version,
    about = "Build offline PyPI mirrors for Windows and Linux targets",
    long_about = "Wheelhouse resolves a requirements.txt transitively against the PyPI JSON API \
                  and downloads a deduplicated set of wheels and source archives into one \
                  offline-installable directory per target platform."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Options shared by the resolving commands.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Requirements file (default: requirements.txt in the current or a
    /// parent directory)
    #[arg(short, long)]
    pub requirements_path: Option<PathBuf>,

    /// Target interpreter version as major.minor
    #[arg(short, long, default_value = wheelhouse_core::DEFAULT_PYTHON_VERSION)]
    pub python_version: String,

    /// Package index base URL
    #[arg(long, default_value = wheelhouse_pypi::registry::PYPI_BASE_URL)]
    pub index_url: String,

    /// Number of root packages to resolve in parallel (max 5)
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve and download packages into per-platform mirror directories
    Mirror {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Directory to create the mirror directories under (default:
        /// current directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Resolve and print the dependency tree and download plan without
    /// downloading
    Plan {
        #[command(flatten)]
        resolve: ResolveArgs,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
