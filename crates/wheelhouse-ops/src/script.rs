//! Generated offline install scripts, one per mirror directory.
//!
//! Each target directory receives a copy of the root requirements file and
//! a script that installs it from the mirrored files only, with the index
//! disabled.

use std::path::Path;

use wheelhouse_core::target::Platform;

/// Script filename for a platform.
pub fn script_name(platform: Platform) -> &'static str {
    match platform {
        Platform::WindowsX64 => "install.bat",
        Platform::LinuxX64 => "install.sh",
    }
}

/// Script body for a platform.
pub fn script_body(platform: Platform) -> &'static str {
    match platform {
        Platform::WindowsX64 => {
            "@echo off\r\n\
             rem Offline install of the mirrored packages.\r\n\
             cd /d %~dp0\r\n\
             python -m pip install --no-index --find-links=. -r requirements.txt\r\n"
        }
        Platform::LinuxX64 => {
            "#!/bin/sh\n\
             # Offline install of the mirrored packages.\n\
             set -eu\n\
             cd \"$(dirname \"$0\")\"\n\
             python3 -m pip install --no-index --find-links=. -r requirements.txt\n"
        }
    }
}

/// Write the install script into a mirror directory.
pub fn write_install_script(dir: &Path, platform: Platform) -> std::io::Result<()> {
    let path = dir.join(script_name(platform));
    std::fs::write(&path, script_body(platform))?;

    #[cfg(unix)]
    if platform == Platform::LinuxX64 {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)?;
    }

    Ok(())
}
