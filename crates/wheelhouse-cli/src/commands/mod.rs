//! Command dispatch and handler modules.

mod mirror;
mod plan;

use miette::Result;

use crate::cli::{Cli, Command, ResolveArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Mirror {
            resolve,
            output_dir,
        } => mirror::exec(resolve, output_dir, cli.verbose).await,
        Command::Plan { resolve } => plan::exec(resolve, cli.verbose).await,
    }
}

/// Build the shared operation options from the parsed arguments.
pub(crate) fn mirror_options(
    resolve: ResolveArgs,
    output_root: std::path::PathBuf,
    verbose: bool,
) -> wheelhouse_ops::MirrorOptions {
    wheelhouse_ops::MirrorOptions {
        requirements_path: resolve.requirements_path,
        python_version: resolve.python_version,
        index_url: resolve.index_url,
        output_root,
        jobs: resolve.jobs,
        verbose,
    }
}
