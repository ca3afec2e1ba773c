//! Target interpreter version and environment-marker evaluation.

use std::fmt;

use crate::version::{Comparator, PyVersion, COMPARATORS};

/// The interpreter version artifacts are selected for, as "major.minor".
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Interpreter {
    pub major: u32,
    pub minor: u32,
}

impl Interpreter {
    /// Parse a "major.minor" string such as "3.12".
    pub fn parse(version: &str) -> Option<Self> {
        let (major, minor) = version.trim().split_once('.')?;
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Compact wheel tag: `cp312` for 3.12.
    pub fn cp_tag(&self) -> String {
        format!("cp{}{}", self.major, self.minor)
    }

    /// Version with dots replaced by underscores, used in output directory
    /// names: `3_12`.
    pub fn dir_suffix(&self) -> String {
        format!("{}_{}", self.major, self.minor)
    }

    /// The `python_version` marker value for this interpreter.
    fn as_version(&self) -> PyVersion {
        PyVersion::parse(&format!("{}.{}", self.major, self.minor))
            .expect("major.minor always parses")
    }
}

impl fmt::Display for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Verdict for a dependency's environment marker.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MarkerVerdict {
    /// Marker evaluated true, or is irrelevant to mirror selection.
    Keep,
    /// Marker evaluated false, or gates an optional extra.
    Drop,
}

/// Evaluate the marker text after `;` in a dependency string.
///
/// Only simple interpreter-version comparisons are evaluated:
/// `python_version < "3.8"` and `python_full_version >= "3.8.1"`. Markers
/// mentioning `extra` drop the dependency (extras are never requested).
/// Every other marker is irrelevant here, since both mirror targets must be
/// covered regardless of the host platform.
pub fn evaluate_marker(marker: &str, interpreter: &Interpreter) -> MarkerVerdict {
    let marker = marker.trim();
    if marker.is_empty() {
        return MarkerVerdict::Keep;
    }
    if marker.contains("extra") {
        return MarkerVerdict::Drop;
    }
    // Compound markers are not a simple comparison; keep conservatively.
    if marker.contains(" and ") || marker.contains(" or ") {
        return MarkerVerdict::Keep;
    }

    match parse_version_comparison(marker) {
        Some((op, literal)) => {
            let target = interpreter.as_version();
            let clause = crate::version::Clause {
                op,
                version: literal,
            };
            if clause.matches(&target) {
                MarkerVerdict::Keep
            } else {
                MarkerVerdict::Drop
            }
        }
        None => MarkerVerdict::Keep,
    }
}

/// Parse `python_version <op> "X.Y"` into its comparator and literal.
fn parse_version_comparison(marker: &str) -> Option<(Comparator, PyVersion)> {
    let rest = marker
        .strip_prefix("python_full_version")
        .or_else(|| marker.strip_prefix("python_version"))?
        .trim_start();
    let op_str = COMPARATORS.iter().find(|op| rest.starts_with(**op))?;
    let op = match *op_str {
        "==" => Comparator::Eq,
        "!=" => Comparator::Ne,
        ">=" => Comparator::Ge,
        "<=" => Comparator::Le,
        ">" => Comparator::Gt,
        "<" => Comparator::Lt,
        _ => return None,
    };
    let literal = rest[op_str.len()..].trim().trim_matches(['"', '\'']);
    Some((op, PyVersion::parse(literal)?))
}
