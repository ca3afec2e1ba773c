//! Wheel filename compatibility tags and embedded METADATA extraction.

use std::io::{Cursor, Read};

use tracing::debug;

use wheelhouse_util::errors::WheelhouseError;

/// The trailing interpreter/ABI/platform tag triple of a wheel filename.
///
/// `pkg-1.0-cp312-cp312-win_amd64.whl` → (`cp312`, `cp312`, `win_amd64`).
/// Compound tags (`py2.py3`, `manylinux_2_17_x86_64.manylinux2014_x86_64`)
/// are kept whole; eligibility checks split on `.`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WheelTags {
    pub python: String,
    pub abi: String,
    pub platform: String,
}

impl WheelTags {
    /// Parse the tag triple from a wheel filename.
    ///
    /// Wheel filenames are `name-version(-build)?-python-abi-platform.whl`;
    /// name and version may themselves contain hyphens only in escaped
    /// form, so the last three hyphen-delimited fields of the stem are
    /// always the tag triple. Returns `None` for filenames with too few
    /// fields.
    pub fn parse(filename: &str) -> Option<Self> {
        let stem = filename.strip_suffix(".whl")?;
        let fields: Vec<&str> = stem.split('-').collect();
        if fields.len() < 5 {
            return None;
        }
        Some(Self {
            python: fields[fields.len() - 3].to_string(),
            abi: fields[fields.len() - 2].to_string(),
            platform: fields[fields.len() - 1].to_string(),
        })
    }

    /// Individual dot-separated python tags (`py2.py3` → [`py2`, `py3`]).
    pub fn python_tags(&self) -> impl Iterator<Item = &str> {
        self.python.split('.')
    }

    /// Individual dot-separated platform tags.
    pub fn platform_tags(&self) -> impl Iterator<Item = &str> {
        self.platform.split('.')
    }
}

/// Extract `Requires-Dist:` entries from a wheel's embedded METADATA.
///
/// Opens the wheel as a zip archive and scans the header block of the
/// `*.dist-info/METADATA` entry. Scanning stops at the first blank line so
/// the long-description body cannot contribute false positives.
pub fn requires_dist_from_wheel(bytes: &[u8]) -> miette::Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        WheelhouseError::Decode {
            message: format!("Not a readable wheel archive: {e}"),
        }
    })?;

    let metadata_name = archive
        .file_names()
        .find(|name| name.ends_with(".dist-info/METADATA"))
        .map(str::to_string)
        .ok_or_else(|| WheelhouseError::Decode {
            message: "Wheel has no .dist-info/METADATA entry".to_string(),
        })?;

    let mut entry = archive
        .by_name(&metadata_name)
        .map_err(|e| WheelhouseError::Decode {
            message: format!("Failed to open {metadata_name}: {e}"),
        })?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| WheelhouseError::Decode {
            message: format!("Failed to read {metadata_name}: {e}"),
        })?;

    Ok(parse_requires_dist(&text))
}

/// Scan METADATA header lines for `Requires-Dist:` values.
pub fn parse_requires_dist(metadata: &str) -> Vec<String> {
    let mut deps = Vec::new();
    for line in metadata.lines() {
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Requires-Dist:") {
            let value = value.trim();
            if !value.is_empty() {
                deps.push(value.to_string());
            }
        }
    }
    debug!(count = deps.len(), "parsed Requires-Dist entries");
    deps
}
