//! Dry-run resolution: print the dependency tree and the per-platform
//! download plan without touching the filesystem or fetching artifacts.

use std::sync::Arc;

use wheelhouse_core::target::{ArtifactTarget, Platform};
use wheelhouse_resolver::provider::{PackageProvider, PypiProvider};
use wheelhouse_resolver::resolver::{DownloadPlan, Resolver};
use wheelhouse_util::progress::{spinner, status, status_info};

use crate::{display_rel, load_requirements, target_interpreter, MirrorOptions};

/// Resolve and print the plan against the live package index.
pub async fn plan(opts: &MirrorOptions) -> miette::Result<()> {
    let client = wheelhouse_pypi::registry::build_client()?;
    let provider = Arc::new(PypiProvider::new(&opts.index_url, client));
    let plan = plan_with(provider, opts).await?;
    print_plan(&plan, opts);
    Ok(())
}

/// Resolve the requirements file without downloading anything.
pub async fn plan_with<P: PackageProvider>(
    provider: Arc<P>,
    opts: &MirrorOptions,
) -> miette::Result<DownloadPlan> {
    let (requirements_path, roots) = load_requirements(opts)?;
    let interpreter = target_interpreter(opts)?;

    status(
        "Planning",
        &format!(
            "{} (python {})",
            display_rel(&requirements_path, &opts.output_root),
            interpreter
        ),
    );

    let resolver = Resolver::new(provider, interpreter);
    let progress = spinner("resolving dependencies");
    let plan = resolver.resolve_parallel(&roots, opts.jobs).await;
    progress.finish_and_clear();
    Ok(plan)
}

/// Print the dependency tree, the per-platform artifact lists, and any
/// resolution warnings.
pub fn print_plan(plan: &DownloadPlan, opts: &MirrorOptions) {
    println!("{}", plan.graph.print_tree());

    let interpreter = match target_interpreter(opts) {
        Ok(interpreter) => interpreter,
        // Unreachable after a successful resolve; fall back to printing
        // nothing platform-specific.
        Err(_) => return,
    };

    for (platform, target) in [
        (Platform::WindowsX64, ArtifactTarget::Windows),
        (Platform::LinuxX64, ArtifactTarget::Linux),
    ] {
        let downloads = plan.downloads_for(target);
        println!(
            "{} ({} artifact{}):",
            platform.dir_name(&interpreter),
            downloads.len(),
            if downloads.len() == 1 { "" } else { "s" }
        );
        for download in downloads {
            println!("  {} {}  {}", download.name, download.version, download.filename);
        }
        println!();
    }

    status_info(
        "Planned",
        &format!(
            "{} package{}, {} distinct artifact{}",
            plan.graph.node_count(),
            if plan.graph.node_count() == 1 { "" } else { "s" },
            plan.downloads.len(),
            if plan.downloads.len() == 1 { "" } else { "s" }
        ),
    );

    if !plan.report.is_empty() {
        eprintln!("{}", plan.report);
    }
}
