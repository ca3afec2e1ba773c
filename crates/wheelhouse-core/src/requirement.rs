//! Requirement line parsing.
//!
//! One grammar covers both requirements-file lines and dependency strings
//! from package metadata:
//!
//! ```text
//! requirement := name ('[' extras ']')? (comparator version (',' comparator version)*)?
//! ```
//!
//! Extras are stripped (the mirror never requests optional extras), and the
//! constraint expression is kept verbatim so unparsable constraints can
//! still be reported in substitution warnings.

use std::fmt;

use crate::version::{VersionSpec, COMPARATORS};

/// A parsed top-level or transitive requirement.
///
/// Immutable once parsed. Identity is the normalized name plus the raw
/// constraint expression (see [`Requirement::key`]).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Requirement {
    /// Package name as written (extras stripped).
    pub name: String,
    /// Raw constraint expression, e.g. `>=2.0,<3.0`. `None` when the line
    /// names a package without pinning it.
    pub constraint: Option<String>,
}

impl Requirement {
    /// Parse one requirements-file line.
    ///
    /// Returns `None` for blank lines and `#` comments, which callers skip
    /// without error. Trailing comments and editable/URL lines are not part
    /// of the grammar; lines starting with an option flag (`-r`, `--hash`,
    /// ...) are also skipped.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('-') {
            return None;
        }
        Self::parse_spec(line)
    }

    /// Parse a bare requirement specifier (no comments, marker already
    /// removed by the caller).
    ///
    /// Splits at the first recognized comparator; strips bracketed extras
    /// and the parentheses some metadata wraps around constraints
    /// (`foo (>=1.0)`). Returns `None` if no package name remains.
    pub fn parse_spec(spec: &str) -> Option<Self> {
        let spec = spec.trim();

        let (head, constraint) = match split_at_comparator(spec) {
            Some((head, rest)) => {
                let rest = rest.trim().trim_end_matches(')').trim();
                (head, (!rest.is_empty()).then(|| rest.to_string()))
            }
            None => (spec, None),
        };

        let name = head
            .split('[')
            .next()
            .unwrap_or("")
            .trim()
            .trim_end_matches('(')
            .trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            constraint,
        })
    }

    /// Parsed form of the constraint, if it parses at all.
    pub fn version_spec(&self) -> Option<VersionSpec> {
        self.constraint.as_deref().and_then(VersionSpec::parse)
    }

    /// PEP 503 normalized name: lowercase, runs of `-`, `_`, `.` collapsed
    /// to a single `-`. `Flask_SQLAlchemy` and `flask-sqlalchemy` are the
    /// same package.
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

}

/// Parse a whole requirements file, skipping blank and comment lines, in
/// declared order.
pub fn parse_requirements(text: &str) -> Vec<Requirement> {
    text.lines().filter_map(Requirement::parse_line).collect()
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(c) => write!(f, "{}{c}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Split `spec` at the first recognized comparator, returning
/// `(name-part, constraint-part)`. The constraint part keeps the comparator.
fn split_at_comparator(spec: &str) -> Option<(&str, &str)> {
    let idx = spec.char_indices().find_map(|(i, _)| {
        COMPARATORS
            .iter()
            .any(|op| spec[i..].starts_with(*op))
            .then_some(i)
    })?;
    Some((&spec[..idx], &spec[idx..]))
}

/// PEP 503 name normalization.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_sep = false;
    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | '.') {
            if !prev_sep {
                out.push('-');
            }
            prev_sep = true;
        } else {
            out.push(ch.to_ascii_lowercase());
            prev_sep = false;
        }
    }
    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_line() {
        let req = Requirement::parse_line("requests==2.31.0").unwrap();
        assert_eq!(req.name, "requests");
        assert_eq!(req.constraint.as_deref(), Some("==2.31.0"));
    }

    #[test]
    fn splits_at_first_comparator() {
        let req = Requirement::parse_line("pkg>=1.0,<2.0").unwrap();
        assert_eq!(req.name, "pkg");
        assert_eq!(req.constraint.as_deref(), Some(">=1.0,<2.0"));
    }

    #[test]
    fn bare_name_has_null_constraint() {
        let req = Requirement::parse_line("flask").unwrap();
        assert_eq!(req.name, "flask");
        assert!(req.constraint.is_none());
    }

    #[test]
    fn blank_and_comment_lines_skipped() {
        assert!(Requirement::parse_line("").is_none());
        assert!(Requirement::parse_line("   ").is_none());
        assert!(Requirement::parse_line("# a comment").is_none());
        assert!(Requirement::parse_line("-r other.txt").is_none());
    }

    #[test]
    fn trailing_comment_stripped() {
        let req = Requirement::parse_line("numpy==1.26.4  # pinned for ABI").unwrap();
        assert_eq!(req.name, "numpy");
        assert_eq!(req.constraint.as_deref(), Some("==1.26.4"));
    }

    #[test]
    fn extras_stripped() {
        let req = Requirement::parse_line("uvicorn[standard]>=0.23").unwrap();
        assert_eq!(req.name, "uvicorn");
        assert_eq!(req.constraint.as_deref(), Some(">=0.23"));

        let multi = Requirement::parse_line("celery[redis,tblib]").unwrap();
        assert_eq!(multi.name, "celery");
        assert!(multi.constraint.is_none());
    }

    #[test]
    fn parenthesized_metadata_constraint() {
        let req = Requirement::parse_spec("charset-normalizer (>=2,<4)").unwrap();
        assert_eq!(req.name, "charset-normalizer");
        assert_eq!(req.constraint.as_deref(), Some(">=2,<4"));
    }

    #[test]
    fn compatible_release_operator() {
        let req = Requirement::parse_line("django~=4.2.0").unwrap();
        assert_eq!(req.constraint.as_deref(), Some("~=4.2.0"));
        assert!(req.version_spec().is_some());
    }

    #[test]
    fn name_normalization() {
        assert_eq!(normalize_name("Flask_SQLAlchemy"), "flask-sqlalchemy");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("ruamel.yaml.clib"), "ruamel-yaml-clib");
    }

    #[test]
    fn unparsable_constraint_kept_verbatim() {
        let req = Requirement::parse_spec("pkg>=banana").unwrap();
        assert_eq!(req.constraint.as_deref(), Some(">=banana"));
        assert!(req.version_spec().is_none());
    }
}
