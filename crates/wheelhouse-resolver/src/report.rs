//! Audit report of every local recovery taken during a run.
//!
//! The engine never fails hard on a bad package; instead each substitution
//! or skip is recorded here with the package name, the requested
//! constraint, and the reason, so silent substitutions can be audited.

use std::fmt;

/// Why a package was skipped or substituted.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RecoveryKind {
    /// Registry answered 404 for the package name.
    NotFound,
    /// Registry or artifact endpoint unreachable.
    NetworkError,
    /// The package has no release with a parseable version.
    NoVersionsAvailable,
    /// No wheel or source archive compatible with the targets.
    NoCompatibleArtifact,
    /// Constraint unsatisfiable or unparsable; unconstrained maximum used.
    SubstitutedVersion,
    /// A dependency string could not be parsed and was skipped.
    MalformedEntry,
    /// Traversal depth guard tripped; subtree skipped.
    DepthLimit,
}

impl fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecoveryKind::NotFound => "not found",
            RecoveryKind::NetworkError => "network error",
            RecoveryKind::NoVersionsAvailable => "no versions available",
            RecoveryKind::NoCompatibleArtifact => "no compatible artifact",
            RecoveryKind::SubstitutedVersion => "version substituted",
            RecoveryKind::MalformedEntry => "malformed entry",
            RecoveryKind::DepthLimit => "depth limit reached",
        };
        f.write_str(s)
    }
}

/// One recorded recovery.
#[derive(Debug, Clone)]
pub struct Recovery {
    pub package: String,
    pub constraint: Option<String>,
    pub kind: RecoveryKind,
    pub detail: String,
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.package)?;
        if let Some(ref c) = self.constraint {
            write!(f, "({c}) ")?;
        }
        write!(f, "- {}", self.kind)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// All recoveries of one resolution run.
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    entries: Vec<Recovery>,
}

impl ResolutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, recovery: Recovery) {
        self.entries.push(recovery);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// All recoveries in insertion order.
    pub fn entries(&self) -> &[Recovery] {
        &self.entries
    }

    /// Packages left without any planned artifact.
    pub fn unresolved(&self) -> impl Iterator<Item = &Recovery> {
        self.entries.iter().filter(|r| {
            matches!(
                r.kind,
                RecoveryKind::NotFound
                    | RecoveryKind::NetworkError
                    | RecoveryKind::NoVersionsAvailable
                    | RecoveryKind::NoCompatibleArtifact
            )
        })
    }

    /// Substitution warnings only.
    pub fn substitutions(&self) -> impl Iterator<Item = &Recovery> {
        self.entries
            .iter()
            .filter(|r| r.kind == RecoveryKind::SubstitutedVersion)
    }

}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return writeln!(f, "No resolution warnings.");
        }
        writeln!(f, "Resolution warnings ({}):", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}
