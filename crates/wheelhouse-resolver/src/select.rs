//! Version selection and artifact compatibility selection.
//!
//! Version selection is greedy: one constraint per node, maximum matching
//! version, with a logged fallback to the unconstrained maximum instead of
//! a hard failure. Artifact selection maps wheel compatibility tags onto
//! the two fixed mirror targets, with the source archive as the shared
//! fallback.

use wheelhouse_core::interpreter::Interpreter;
use wheelhouse_core::target::ArtifactTarget;
use wheelhouse_core::version::{PyVersion, VersionSpec};
use wheelhouse_pypi::release::{ArtifactEntry, ArtifactKind};
use wheelhouse_pypi::wheel::WheelTags;

/// The version chosen for a package.
#[derive(Debug, Clone)]
pub struct SelectedVersion {
    pub version: PyVersion,
    /// True if the constraint was unsatisfiable or unparsable and the
    /// unconstrained maximum was substituted.
    pub substituted: bool,
}

/// No release of the package has a parseable version with artifacts.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct NoVersionsAvailable;

/// Select a version per the greedy policy.
///
/// - no constraint: maximum by version ordering
/// - constraint: maximum version satisfying every clause
/// - unsatisfiable or unparsable constraint: unconstrained maximum, flagged
///   as a substitution
pub fn select_version<'a>(
    constraint: Option<&str>,
    versions: impl Iterator<Item = &'a str>,
) -> Result<SelectedVersion, NoVersionsAvailable> {
    let parsed: Vec<PyVersion> = versions.filter_map(PyVersion::parse).collect();
    let max = parsed.iter().max().cloned().ok_or(NoVersionsAvailable)?;

    let spec = match constraint {
        None => {
            return Ok(SelectedVersion {
                version: max,
                substituted: false,
            })
        }
        Some(raw) => VersionSpec::parse(raw),
    };

    match spec {
        Some(spec) => match parsed.iter().filter(|v| spec.matches(v)).max() {
            Some(best) => Ok(SelectedVersion {
                version: best.clone(),
                substituted: false,
            }),
            None => Ok(SelectedVersion {
                version: max,
                substituted: true,
            }),
        },
        // Constraint did not parse; same fallback, same warning path.
        None => Ok(SelectedVersion {
            version: max,
            substituted: true,
        }),
    }
}

/// One artifact of the download plan, tagged with its mirror target.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SelectedArtifact {
    pub url: String,
    pub filename: String,
    pub target: ArtifactTarget,
}

/// Where a single platform tag may be installed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum TagPlatform {
    Windows,
    Linux,
    Any,
    Excluded,
}

/// Canonical platform-tag policy for the two fixed targets.
///
/// Excluded outright: 32-bit Windows, musl Linux, any Linux that is not
/// x86_64 (aarch64, armv7l, i686, ppc64le, s390x), and everything else
/// (macOS, BSDs).
fn classify_platform_tag(tag: &str) -> TagPlatform {
    if tag == "any" {
        return TagPlatform::Any;
    }
    if tag == "win_amd64" {
        return TagPlatform::Windows;
    }
    if tag.starts_with("musllinux") {
        return TagPlatform::Excluded;
    }
    if (tag.starts_with("manylinux") || tag.starts_with("linux")) && tag.ends_with("_x86_64") {
        return TagPlatform::Linux;
    }
    TagPlatform::Excluded
}

/// Whether a wheel's interpreter tag is usable with the target interpreter:
/// a generic `py3*` tag, or exactly the target's compact `cp` tag.
fn python_tag_eligible(tags: &WheelTags, interpreter: &Interpreter) -> bool {
    let cp = interpreter.cp_tag();
    tags.python_tags()
        .any(|t| t.starts_with("py3") || t == cp)
}

/// Select compatible download artifacts for a release.
///
/// Wheels are mapped to Windows/Linux/Common per their tags; if either
/// platform ends up without a wheel, the source archive (when present)
/// backs both as a Common artifact. An empty result means the package is
/// unresolved for this run; the caller records it and continues.
pub fn select_artifacts(
    artifacts: &[ArtifactEntry],
    interpreter: &Interpreter,
) -> Vec<SelectedArtifact> {
    let mut selected: Vec<SelectedArtifact> = Vec::new();
    let mut windows_covered = false;
    let mut linux_covered = false;

    for entry in artifacts {
        if entry.kind() != ArtifactKind::Wheel {
            continue;
        }
        let tags = match WheelTags::parse(&entry.filename) {
            Some(tags) => tags,
            None => continue,
        };
        if !python_tag_eligible(&tags, interpreter) {
            continue;
        }

        let mut target: Option<ArtifactTarget> = None;
        for tag in tags.platform_tags() {
            match classify_platform_tag(tag) {
                TagPlatform::Any => target = Some(ArtifactTarget::Common),
                TagPlatform::Windows => target = Some(ArtifactTarget::Windows),
                TagPlatform::Linux => target = Some(ArtifactTarget::Linux),
                TagPlatform::Excluded => {}
            }
            if target.is_some() {
                break;
            }
        }

        if let Some(target) = target {
            match target {
                ArtifactTarget::Windows => windows_covered = true,
                ArtifactTarget::Linux => linux_covered = true,
                ArtifactTarget::Common => {
                    windows_covered = true;
                    linux_covered = true;
                }
            }
            push_unique(
                &mut selected,
                SelectedArtifact {
                    url: entry.url.clone(),
                    filename: entry.filename.clone(),
                    target,
                },
            );
        }
    }

    if !(windows_covered && linux_covered) {
        if let Some(sdist) = artifacts
            .iter()
            .find(|e| e.kind() == ArtifactKind::SourceArchive)
        {
            push_unique(
                &mut selected,
                SelectedArtifact {
                    url: sdist.url.clone(),
                    filename: sdist.filename.clone(),
                    target: ArtifactTarget::Common,
                },
            );
        }
    }

    selected
}

fn push_unique(selected: &mut Vec<SelectedArtifact>, artifact: SelectedArtifact) {
    if !selected
        .iter()
        .any(|a| a.filename == artifact.filename && a.target == artifact.target)
    {
        selected.push(artifact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel(filename: &str) -> ArtifactEntry {
        ArtifactEntry {
            filename: filename.to_string(),
            url: format!("https://files.example/{filename}"),
            packagetype: "bdist_wheel".to_string(),
        }
    }

    fn sdist(filename: &str) -> ArtifactEntry {
        ArtifactEntry {
            filename: filename.to_string(),
            url: format!("https://files.example/{filename}"),
            packagetype: "sdist".to_string(),
        }
    }

    fn py312() -> Interpreter {
        Interpreter::parse("3.12").unwrap()
    }

    #[test]
    fn unconstrained_picks_maximum() {
        let selected =
            select_version(None, ["1.9", "2.0", "2.5"].into_iter()).unwrap();
        assert_eq!(selected.version.original, "2.5");
        assert!(!selected.substituted);
    }

    #[test]
    fn range_constraint_picks_max_match() {
        let selected =
            select_version(Some(">=2.0,<3.0"), ["1.9", "2.0", "2.5", "3.0"].into_iter()).unwrap();
        assert_eq!(selected.version.original, "2.5");
        assert!(!selected.substituted);
    }

    #[test]
    fn unsatisfiable_constraint_substitutes_max() {
        let selected = select_version(Some(">=9.9"), ["1.0", "2.0"].into_iter()).unwrap();
        assert_eq!(selected.version.original, "2.0");
        assert!(selected.substituted);
    }

    #[test]
    fn unparsable_constraint_substitutes_max() {
        let selected = select_version(Some(">=banana"), ["1.0", "2.0"].into_iter()).unwrap();
        assert_eq!(selected.version.original, "2.0");
        assert!(selected.substituted);
    }

    #[test]
    fn no_versions_is_signaled() {
        assert_eq!(
            select_version(None, [].into_iter()).unwrap_err(),
            NoVersionsAvailable
        );
        // Unparsable versions count as unavailable too.
        assert_eq!(
            select_version(None, ["latest"].into_iter()).unwrap_err(),
            NoVersionsAvailable
        );
    }

    #[test]
    fn prerelease_sorts_below_final() {
        let selected = select_version(None, ["2.0rc1", "1.9"].into_iter()).unwrap();
        // 2.0rc1 is still the maximum; pre-release ordering only matters
        // within the same release number.
        assert_eq!(selected.version.original, "2.0rc1");

        let same = select_version(None, ["2.0rc1", "2.0"].into_iter()).unwrap();
        assert_eq!(same.version.original, "2.0");
    }

    #[test]
    fn three_wheels_map_to_three_targets() {
        let artifacts = vec![
            wheel("pkg-1.0-cp312-cp312-win_amd64.whl"),
            wheel("pkg-1.0-cp312-cp312-manylinux_2_17_x86_64.whl"),
            wheel("pkg-1.0-py3-none-any.whl"),
        ];
        let selected = select_artifacts(&artifacts, &py312());
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].target, ArtifactTarget::Windows);
        assert_eq!(selected[1].target, ArtifactTarget::Linux);
        assert_eq!(selected[2].target, ArtifactTarget::Common);
    }

    #[test]
    fn musllinux_and_wrong_interpreter_excluded() {
        let artifacts = vec![
            wheel("pkg-1.0-cp312-cp312-musllinux_1_1_x86_64.whl"),
            wheel("pkg-1.0-cp39-cp39-win_amd64.whl"),
        ];
        assert!(select_artifacts(&artifacts, &py312()).is_empty());
    }

    #[test]
    fn win32_and_non_x86_64_linux_excluded() {
        let artifacts = vec![
            wheel("pkg-1.0-cp312-cp312-win32.whl"),
            wheel("pkg-1.0-cp312-cp312-manylinux_2_17_aarch64.whl"),
            wheel("pkg-1.0-cp312-cp312-manylinux_2_17_armv7l.whl"),
            wheel("pkg-1.0-cp312-cp312-macosx_11_0_arm64.whl"),
        ];
        assert!(select_artifacts(&artifacts, &py312()).is_empty());
    }

    #[test]
    fn compound_manylinux_tag_accepted() {
        let artifacts = vec![wheel(
            "pkg-1.0-cp312-cp312-manylinux_2_17_x86_64.manylinux2014_x86_64.whl",
        )];
        let selected = select_artifacts(&artifacts, &py312());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].target, ArtifactTarget::Linux);
    }

    #[test]
    fn sdist_fallback_when_no_wheel_at_all() {
        let artifacts = vec![sdist("pkg-1.0.tar.gz")];
        let selected = select_artifacts(&artifacts, &py312());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].target, ArtifactTarget::Common);
    }

    #[test]
    fn sdist_backs_the_uncovered_platform() {
        // Windows wheel exists, Linux has none: the sdist joins the plan as
        // the shared fallback.
        let artifacts = vec![
            wheel("pkg-1.0-cp312-cp312-win_amd64.whl"),
            sdist("pkg-1.0.tar.gz"),
        ];
        let selected = select_artifacts(&artifacts, &py312());
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].target, ArtifactTarget::Windows);
        assert_eq!(selected[1].target, ArtifactTarget::Common);
    }

    #[test]
    fn any_wheel_suppresses_sdist_fallback() {
        let artifacts = vec![
            wheel("pkg-1.0-py3-none-any.whl"),
            sdist("pkg-1.0.tar.gz"),
        ];
        let selected = select_artifacts(&artifacts, &py312());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].target, ArtifactTarget::Common);
    }

    #[test]
    fn nothing_compatible_returns_empty() {
        let artifacts = vec![wheel("pkg-1.0-cp39-cp39-win_amd64.whl")];
        assert!(select_artifacts(&artifacts, &py312()).is_empty());
    }
}
