//! PEP 440-style version parsing, comparison, and specifier matching.
//!
//! This is a deliberately reduced reading of PEP 440, covering what actually
//! appears in release indexes:
//! - dotted numeric release segments, compared numerically with zero-padding
//! - pre-release suffixes (`a`, `b`, `rc`) sorting below the final release
//! - `.post` and `.dev` suffixes (`dev` below pre-releases, `post` above final)
//!
//! Local version labels (`+local`) and epochs (`1!`) are stripped.

use std::cmp::Ordering;
use std::fmt;

/// A parsed package version with total ordering.
#[derive(Debug, Clone)]
pub struct PyVersion {
    pub original: String,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
}

/// Pre-release phases in ascending order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

impl PyVersion {
    /// Parse a version string. Returns `None` for strings that do not look
    /// like a version at all (callers skip those release entries).
    pub fn parse(version: &str) -> Option<Self> {
        let s = version.trim().to_ascii_lowercase();
        // Epoch and local label are irrelevant for mirror selection.
        let s = s.rsplit_once('!').map(|(_, rest)| rest).unwrap_or(&s);
        let s = s.split_once('+').map(|(head, _)| head).unwrap_or(s);
        let s = s.strip_prefix('v').unwrap_or(s);

        let mut release = Vec::new();
        let mut pre = None;
        let mut post = None;
        let mut dev = None;

        let mut rest = s;
        while !rest.is_empty() {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                break;
            }
            release.push(digits.parse().ok()?);
            rest = &rest[digits.len()..];
            match rest.strip_prefix('.') {
                Some(r) if r.starts_with(|c: char| c.is_ascii_digit()) => rest = r,
                _ => break,
            }
        }
        if release.is_empty() {
            return None;
        }

        // Suffix loop: `.dev1`, `.post2`, `a1`, `-rc3`, ...
        while !rest.is_empty() {
            let trimmed = rest.trim_start_matches(['.', '-', '_']);
            let word: String = trimmed
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();
            let after = &trimmed[word.len()..];
            let num_str: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
            let num: u64 = num_str.parse().unwrap_or(0);

            match word.as_str() {
                "a" | "alpha" => pre = Some((PreKind::Alpha, num)),
                "b" | "beta" => pre = Some((PreKind::Beta, num)),
                "c" | "rc" | "pre" | "preview" => pre = Some((PreKind::Rc, num)),
                "post" | "rev" | "r" => post = Some(num),
                "dev" => dev = Some(num),
                _ => return None,
            }
            rest = &after[num_str.len()..];
        }

        Some(Self {
            original: version.trim().to_string(),
            release,
            pre,
            post,
            dev,
        })
    }

    /// Whether this is a pre-release or dev release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segments, without pre/post/dev parts.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Compare release segments only, right-padding the shorter with zeros.
    fn cmp_release(&self, other: &Self) -> Ordering {
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let a = self.release.get(i).copied().unwrap_or(0);
            let b = other.release.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Rank used to order suffix variants within one release number:
    /// dev < pre < final < post.
    fn suffix_rank(&self) -> (u8, u8, u64, u64) {
        let (pre_kind, pre_num) = match self.pre {
            Some((k, n)) => (k as u8, n),
            None => (3, 0),
        };
        let phase = if self.dev.is_some() && self.pre.is_none() {
            0
        } else {
            1
        };
        (phase, pre_kind, pre_num, self.post.map_or(0, |p| p + 1))
    }
}

impl PartialEq for PyVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PyVersion {}

impl Ord for PyVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_release(other)
            .then_with(|| self.suffix_rank().cmp(&other.suffix_rank()))
            .then_with(|| {
                self.dev
                    .map_or((1, 0), |d| (0, d))
                    .cmp(&other.dev.map_or((1, 0), |d| (0, d)))
            })
    }
}

impl PartialOrd for PyVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

/// Version comparators recognized in requirement lines and dependency
/// metadata, longest first so `>=` is never read as `>` + `=`.
pub const COMPARATORS: [&str; 7] = ["==", ">=", "<=", "~=", "!=", ">", "<"];

/// A single comparator applied to a version literal.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Comparator {
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    /// `~=`: compatible release.
    Compatible,
}

impl Comparator {
    fn from_str(op: &str) -> Option<Self> {
        match op {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            "~=" => Some(Self::Compatible),
            _ => None,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Compatible => "~=",
        };
        f.write_str(s)
    }
}

/// One `comparator version` clause.
#[derive(Debug, Clone)]
pub struct Clause {
    pub op: Comparator,
    pub version: PyVersion,
}

impl Clause {
    /// Check whether `candidate` satisfies this clause.
    pub fn matches(&self, candidate: &PyVersion) -> bool {
        match self.op {
            Comparator::Eq => candidate == &self.version,
            Comparator::Ne => candidate != &self.version,
            Comparator::Ge => candidate >= &self.version,
            Comparator::Le => candidate <= &self.version,
            Comparator::Gt => candidate > &self.version,
            Comparator::Lt => candidate < &self.version,
            Comparator::Compatible => {
                // ~= X.Y.Z means >= X.Y.Z with the first len-1 release
                // segments pinned.
                if candidate < &self.version {
                    return false;
                }
                let pinned = self.version.release().len().saturating_sub(1);
                let spec = &self.version.release()[..pinned];
                let cand = candidate.release();
                spec.iter()
                    .enumerate()
                    .all(|(i, seg)| cand.get(i).copied().unwrap_or(0) == *seg)
            }
        }
    }
}

/// A conjunctive version specifier: every clause must hold.
///
/// `>=2.0,<3.0` parses to two clauses; a candidate matches only if it
/// satisfies both.
#[derive(Debug, Clone)]
pub struct VersionSpec {
    pub clauses: Vec<Clause>,
}

impl VersionSpec {
    /// Parse a comma-separated specifier expression.
    ///
    /// Returns `None` if any clause is malformed; callers treat that as an
    /// unparsable constraint and fall back to the unconstrained maximum.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut clauses = Vec::new();
        for part in spec.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            let op_str = COMPARATORS.iter().find(|op| part.starts_with(**op))?;
            let op = Comparator::from_str(op_str)?;
            let version = PyVersion::parse(part[op_str.len()..].trim())?;
            clauses.push(Clause { op, version });
        }
        if clauses.is_empty() {
            return None;
        }
        Some(Self { clauses })
    }

    /// Check whether `candidate` satisfies every clause.
    pub fn matches(&self, candidate: &PyVersion) -> bool {
        self.clauses.iter().all(|c| c.matches(candidate))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}{}", clause.op, clause.version)?;
        }
        Ok(())
    }
}
