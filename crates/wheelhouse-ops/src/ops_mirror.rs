//! End-to-end mirror run: resolve the requirements file and populate one
//! offline directory per target platform.
//!
//! Per-package failures are reported and skipped; the run keeps going and
//! exits successfully as long as the requirements file itself could be
//! read.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use wheelhouse_core::target::Platform;
use wheelhouse_resolver::provider::{PackageProvider, PypiProvider};
use wheelhouse_resolver::resolver::{DownloadPlan, Resolver};
use wheelhouse_util::progress::{spinner, status, status_warn};

use crate::script::write_install_script;
use crate::{display_rel, load_requirements, target_interpreter, MirrorOptions};

/// What a mirror run accomplished.
#[derive(Debug, Default)]
pub struct MirrorSummary {
    pub downloaded: usize,
    pub reused: usize,
    pub failed: usize,
    pub warnings: usize,
    pub directories: Vec<PathBuf>,
}

/// Run a mirror against the live package index.
pub async fn mirror(opts: &MirrorOptions) -> miette::Result<MirrorSummary> {
    let client = wheelhouse_pypi::registry::build_client()?;
    let provider = Arc::new(PypiProvider::new(&opts.index_url, client));
    mirror_with(provider, opts).await
}

/// Run a mirror against an arbitrary provider.
pub async fn mirror_with<P: PackageProvider>(
    provider: Arc<P>,
    opts: &MirrorOptions,
) -> miette::Result<MirrorSummary> {
    let (requirements_path, roots) = load_requirements(opts)?;
    let interpreter = target_interpreter(opts)?;

    status(
        "Mirroring",
        &format!(
            "{} ({} root package{}, python {})",
            display_rel(&requirements_path, &opts.output_root),
            roots.len(),
            if roots.len() == 1 { "" } else { "s" },
            interpreter
        ),
    );

    let mut summary = MirrorSummary::default();
    let mut directories = Vec::new();
    for platform in Platform::ALL {
        let dir = opts.output_root.join(platform.dir_name(&interpreter));
        wheelhouse_util::fs::recreate_dir(&dir)
            .map_err(wheelhouse_util::errors::WheelhouseError::Io)?;
        directories.push(dir);
    }

    let resolver = Resolver::new(provider.clone(), interpreter);
    let progress = spinner("resolving dependencies");
    let plan = resolver.resolve_parallel(&roots, opts.jobs).await;
    progress.finish_and_clear();
    debug!(
        packages = plan.graph.node_count(),
        artifacts = plan.downloads.len(),
        "resolution finished"
    );

    download_plan(provider.as_ref(), &plan, &directories, &mut summary).await;
    finalize_directories(&requirements_path, &directories, &mut summary);
    report(&plan, opts.verbose, &mut summary);
    summary.directories = directories;

    status(
        "Mirrored",
        &format!(
            "{} package{}, {} artifact{} ({} downloaded, {} reused, {} failed)",
            plan.graph.node_count(),
            if plan.graph.node_count() == 1 { "" } else { "s" },
            plan.downloads.len(),
            if plan.downloads.len() == 1 { "" } else { "s" },
            summary.downloaded,
            summary.reused,
            summary.failed
        ),
    );
    Ok(summary)
}

/// Fetch every planned artifact into its target directory (Common fans out
/// to both). Failures are counted and reported, never propagated.
async fn download_plan<P: PackageProvider>(
    provider: &P,
    plan: &DownloadPlan,
    directories: &[PathBuf],
    summary: &mut MirrorSummary,
) {
    for planned in &plan.downloads {
        for platform in planned.target.platforms() {
            let dir = match Platform::ALL.iter().position(|p| p == platform) {
                Some(i) => &directories[i],
                None => continue,
            };
            let dest = dir.join(&planned.filename);
            let label = format!("{} {}", planned.name, planned.version);
            match provider
                .fetch_artifact(&planned.url, &dest, &label, true)
                .await
            {
                Ok(0) => summary.reused += 1,
                Ok(_) => summary.downloaded += 1,
                Err(err) => {
                    status_warn(
                        "Failed",
                        &format!("{} ({}): {err}", label, planned.filename),
                    );
                    summary.failed += 1;
                }
            }
        }
    }
}

/// Copy the requirements file and write the install script into each
/// target directory.
fn finalize_directories(
    requirements_path: &std::path::Path,
    directories: &[PathBuf],
    summary: &mut MirrorSummary,
) {
    for (platform, dir) in Platform::ALL.iter().zip(directories) {
        if let Err(err) = std::fs::copy(requirements_path, dir.join("requirements.txt")) {
            status_warn(
                "Warning",
                &format!("failed to copy requirements into {}: {err}", dir.display()),
            );
            summary.warnings += 1;
        }
        if let Err(err) = write_install_script(dir, *platform) {
            status_warn(
                "Warning",
                &format!("failed to write install script in {}: {err}", dir.display()),
            );
            summary.warnings += 1;
        }
    }
}

/// Print the resolution report: full entries when verbose, a one-line
/// count otherwise.
fn report(plan: &DownloadPlan, verbose: bool, summary: &mut MirrorSummary) {
    summary.warnings += plan.report.len();
    if plan.report.is_empty() {
        return;
    }
    if verbose {
        eprintln!("{}", plan.report);
    } else {
        status_warn(
            "Warning",
            &format!(
                "{} resolution warning{} (run with --verbose for details)",
                plan.report.len(),
                if plan.report.len() == 1 { "" } else { "s" }
            ),
        );
    }
}
