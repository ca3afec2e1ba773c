//! Handler for `wheelhouse mirror`.

use std::path::PathBuf;

use miette::Result;

use crate::cli::ResolveArgs;

pub async fn exec(resolve: ResolveArgs, output_dir: Option<PathBuf>, verbose: bool) -> Result<()> {
    let output_root = match output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(wheelhouse_util::errors::WheelhouseError::Io)?,
    };

    let opts = super::mirror_options(resolve, output_root, verbose);
    wheelhouse_ops::ops_mirror::mirror(&opts).await?;
    Ok(())
}
