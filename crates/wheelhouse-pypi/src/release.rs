//! serde model of the `GET /pypi/{name}/json` payload.
//!
//! Only the fields the resolver needs are deserialized; everything else in
//! the (large) payload is ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A package's full project document: version → artifact list, plus the
/// summary metadata block. Immutable once fetched; cached per name for the
/// lifetime of a run.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectIndex {
    pub info: ProjectInfo,
    /// Version string → artifacts published for that version. BTreeMap for
    /// deterministic iteration; selection orders by parsed version anyway.
    #[serde(default)]
    pub releases: BTreeMap<String, Vec<ArtifactEntry>>,
}

/// The `info` block of the project document.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
    /// Latest version; `requires_dist` below describes this version only.
    pub version: String,
    #[serde(default)]
    pub requires_dist: Option<Vec<String>>,
}

/// One downloadable file of a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactEntry {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub packagetype: String,
}

/// Artifact kind derived from the registry's `packagetype` field.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ArtifactKind {
    Wheel,
    SourceArchive,
    Other,
}

impl ArtifactEntry {
    pub fn kind(&self) -> ArtifactKind {
        match self.packagetype.as_str() {
            "bdist_wheel" => ArtifactKind::Wheel,
            "sdist" => ArtifactKind::SourceArchive,
            // Older uploads sometimes lack packagetype; fall back to the
            // filename extension.
            "" if self.filename.ends_with(".whl") => ArtifactKind::Wheel,
            "" if self.filename.ends_with(".tar.gz") || self.filename.ends_with(".zip") => {
                ArtifactKind::SourceArchive
            }
            _ => ArtifactKind::Other,
        }
    }
}

impl ProjectIndex {
    /// Artifacts published for `version`, in upload order.
    pub fn artifacts(&self, version: &str) -> &[ArtifactEntry] {
        self.releases.get(version).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All version strings that have at least one artifact.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.releases
            .iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(v, _)| v.as_str())
    }

    /// `requires_dist` from the summary block, valid for `info.version` only.
    pub fn summary_requires_dist(&self, version: &str) -> Option<&[String]> {
        if self.info.version == version {
            self.info.requires_dist.as_deref()
        } else {
            None
        }
    }
}
