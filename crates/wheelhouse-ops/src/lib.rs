//! High-level Wheelhouse operations, one module per CLI command.

pub mod ops_mirror;
pub mod ops_plan;
pub mod script;

use std::path::{Path, PathBuf};

use wheelhouse_core::interpreter::Interpreter;
use wheelhouse_core::requirement::{parse_requirements, Requirement};
use wheelhouse_util::errors::WheelhouseError;

/// Options shared by the mirror and plan operations.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Explicit requirements file; when absent, `requirements.txt` is
    /// looked for in `output_root` and its parent.
    pub requirements_path: Option<PathBuf>,
    /// Target interpreter as "major.minor".
    pub python_version: String,
    /// Registry base URL.
    pub index_url: String,
    /// Directory the per-platform mirror directories are created under.
    pub output_root: PathBuf,
    /// Worker-pool width for root-level parallel resolution (1 = baseline
    /// sequential traversal).
    pub jobs: usize,
    pub verbose: bool,
}

/// Locate and parse the root requirements file.
///
/// A missing or unreadable file is the one fatal condition of a run.
pub fn load_requirements(opts: &MirrorOptions) -> miette::Result<(PathBuf, Vec<Requirement>)> {
    let path = match &opts.requirements_path {
        Some(path) => {
            if !path.is_file() {
                return Err(WheelhouseError::Requirements {
                    message: format!("{} not found", path.display()),
                }
                .into());
            }
            path.clone()
        }
        None => wheelhouse_util::fs::find_in_dir_or_parent(&opts.output_root, "requirements.txt")
            .ok_or_else(|| WheelhouseError::Requirements {
                message: "requirements.txt not found in the current or parent directory"
                    .to_string(),
            })?,
    };

    let text = std::fs::read_to_string(&path).map_err(|e| WheelhouseError::Requirements {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    Ok((path, parse_requirements(&text)))
}

/// Parse the target interpreter version from the options.
pub fn target_interpreter(opts: &MirrorOptions) -> miette::Result<Interpreter> {
    Interpreter::parse(&opts.python_version).ok_or_else(|| {
        WheelhouseError::Generic {
            message: format!(
                "invalid python version {:?}, expected major.minor like \"3.12\"",
                opts.python_version
            ),
        }
        .into()
    })
}

/// Path relative to `root` for status output, falling back to the full path.
pub(crate) fn display_rel(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
