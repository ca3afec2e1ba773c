//! Mirror target platforms and output directory layout.
//!
//! The mirror always serves exactly two platforms: 64-bit Windows and
//! x86_64 glibc Linux. Directory names follow the original deployment
//! layout (`pypackage_win_x86_64_py3_12`, `pypackage_linux_amd64_py3_12`).

use std::fmt;

use crate::interpreter::Interpreter;

/// A fixed mirror target platform.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Platform {
    WindowsX64,
    LinuxX64,
}

impl Platform {
    /// Both mirror targets, in output order.
    pub const ALL: [Platform; 2] = [Platform::WindowsX64, Platform::LinuxX64];

    /// Top-level output directory name for this platform.
    pub fn dir_name(&self, interpreter: &Interpreter) -> String {
        match self {
            Platform::WindowsX64 => {
                format!("pypackage_win_x86_64_py{}", interpreter.dir_suffix())
            }
            Platform::LinuxX64 => {
                format!("pypackage_linux_amd64_py{}", interpreter.dir_suffix())
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::WindowsX64 => f.write_str("windows-x64"),
            Platform::LinuxX64 => f.write_str("linux-x64"),
        }
    }
}

/// Where a selected artifact is written.
///
/// `Common` is the source-archive fallback: the one case where a single
/// artifact is copied into both target directories.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ArtifactTarget {
    Windows,
    Linux,
    Common,
}

impl ArtifactTarget {
    /// The platform directories this target fans out to.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            ArtifactTarget::Windows => &[Platform::WindowsX64],
            ArtifactTarget::Linux => &[Platform::LinuxX64],
            ArtifactTarget::Common => &Platform::ALL,
        }
    }
}

impl fmt::Display for ArtifactTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactTarget::Windows => f.write_str("windows"),
            ArtifactTarget::Linux => f.write_str("linux"),
            ArtifactTarget::Common => f.write_str("common"),
        }
    }
}
