//! Handler for `wheelhouse plan`.

use miette::Result;

use crate::cli::ResolveArgs;

pub async fn exec(resolve: ResolveArgs, verbose: bool) -> Result<()> {
    let output_root =
        std::env::current_dir().map_err(wheelhouse_util::errors::WheelhouseError::Io)?;

    let opts = super::mirror_options(resolve, output_root, verbose);
    wheelhouse_ops::ops_plan::plan(&opts).await
}
