//! Dependency extraction for a resolved (name, version).
//!
//! The registry's `requires_dist` summary only describes the latest
//! version, so for older resolved versions the extractor falls back to the
//! chosen wheel's embedded METADATA. Malformed entries are skipped, never
//! fatal.

use tracing::{debug, warn};

use wheelhouse_core::interpreter::{evaluate_marker, Interpreter, MarkerVerdict};
use wheelhouse_core::requirement::Requirement;
use wheelhouse_pypi::release::ProjectIndex;
use wheelhouse_pypi::wheel::requires_dist_from_wheel;

use crate::provider::PackageProvider;
use crate::select::SelectedArtifact;

/// Obtain and filter the declared dependencies of a resolved release.
///
/// Returns child requirements in declared order after environment-marker
/// filtering, plus the raw entries that could not be parsed (skipped, but
/// surfaced for the audit report).
pub async fn extract_dependencies<P: PackageProvider>(
    provider: &P,
    index: &ProjectIndex,
    version: &str,
    selected: &[SelectedArtifact],
    interpreter: &Interpreter,
) -> (Vec<Requirement>, Vec<String>) {
    let declared = match index.summary_requires_dist(version) {
        Some(list) => list.to_vec(),
        None => requires_dist_from_selected_wheel(provider, index, selected).await,
    };

    let mut children = Vec::new();
    let mut malformed = Vec::new();
    for entry in &declared {
        match parse_dependency(entry, interpreter) {
            DependencyEntry::Keep(req) => children.push(req),
            DependencyEntry::Filtered => {}
            DependencyEntry::Malformed => {
                warn!(
                    package = %index.info.name,
                    entry = %entry,
                    "skipping malformed dependency entry"
                );
                malformed.push(entry.clone());
            }
        }
    }
    (children, malformed)
}

/// Wheel METADATA fallback: download the first selected wheel and scan its
/// `Requires-Dist:` headers. Sdist-only selections yield no dependencies
/// here; building from source is out of scope.
async fn requires_dist_from_selected_wheel<P: PackageProvider>(
    provider: &P,
    index: &ProjectIndex,
    selected: &[SelectedArtifact],
) -> Vec<String> {
    let wheel = match selected.iter().find(|a| a.filename.ends_with(".whl")) {
        Some(wheel) => wheel,
        None => {
            debug!(package = %index.info.name, "no wheel to read dependencies from");
            return Vec::new();
        }
    };

    match provider.artifact_bytes(&wheel.url).await {
        Ok(Some(bytes)) => match requires_dist_from_wheel(&bytes) {
            Ok(deps) => deps,
            Err(e) => {
                warn!(
                    package = %index.info.name,
                    wheel = %wheel.filename,
                    error = %e,
                    "failed to read wheel METADATA"
                );
                Vec::new()
            }
        },
        Ok(None) => {
            warn!(
                package = %index.info.name,
                wheel = %wheel.filename,
                "wheel vanished from the index"
            );
            Vec::new()
        }
        Err(e) => {
            warn!(
                package = %index.info.name,
                wheel = %wheel.filename,
                error = %e,
                "failed to download wheel for METADATA"
            );
            Vec::new()
        }
    }
}

enum DependencyEntry {
    Keep(Requirement),
    Filtered,
    Malformed,
}

/// Parse one `Requires-Dist` style entry: split off the marker, evaluate
/// it, strip extras, split at the first comparator.
fn parse_dependency(entry: &str, interpreter: &Interpreter) -> DependencyEntry {
    let (spec, marker) = match entry.split_once(';') {
        Some((spec, marker)) => (spec, Some(marker)),
        None => (entry, None),
    };

    if let Some(marker) = marker {
        if evaluate_marker(marker, interpreter) == MarkerVerdict::Drop {
            return DependencyEntry::Filtered;
        }
    }

    match Requirement::parse_spec(spec) {
        Some(req) => DependencyEntry::Keep(req),
        None => DependencyEntry::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn py(version: &str) -> Interpreter {
        Interpreter::parse(version).unwrap()
    }

    fn keep(entry: &str, interp: &Interpreter) -> Option<Requirement> {
        match parse_dependency(entry, interp) {
            DependencyEntry::Keep(req) => Some(req),
            _ => None,
        }
    }

    #[test]
    fn plain_entry_parsed() {
        let req = keep("charset-normalizer (>=2,<4)", &py("3.12")).unwrap();
        assert_eq!(req.name, "charset-normalizer");
        assert_eq!(req.constraint.as_deref(), Some(">=2,<4"));
    }

    #[test]
    fn interpreter_marker_filters_by_target() {
        let entry = "foo (>=1.0); python_version < \"3.8\"";
        assert!(keep(entry, &py("3.12")).is_none());

        let kept = keep(entry, &py("3.7")).unwrap();
        assert_eq!(kept.name, "foo");
        assert_eq!(kept.constraint.as_deref(), Some(">=1.0"));
    }

    #[test]
    fn extra_marker_always_filtered() {
        let entry = "pytest (>=7); extra == \"test\"";
        assert!(keep(entry, &py("3.12")).is_none());
        assert!(keep(entry, &py("3.7")).is_none());
    }

    #[test]
    fn platform_marker_stripped_and_kept() {
        let entry = "colorama; sys_platform == \"win32\"";
        let req = keep(entry, &py("3.12")).unwrap();
        assert_eq!(req.name, "colorama");
        assert!(req.constraint.is_none());
    }

    #[test]
    fn extras_in_dependency_stripped() {
        let req = keep("httpx[http2] (>=0.24)", &py("3.12")).unwrap();
        assert_eq!(req.name, "httpx");
        assert_eq!(req.constraint.as_deref(), Some(">=0.24"));
    }

    #[test]
    fn malformed_entry_flagged() {
        assert!(matches!(
            parse_dependency(">=1.0", &py("3.12")),
            DependencyEntry::Malformed
        ));
    }
}
