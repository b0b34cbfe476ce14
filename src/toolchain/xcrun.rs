//! `xcrun`-backed toolchain path discovery.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;
use xctestrun_core::Sdk;

use super::Toolchain;
use crate::errors::{Result, XctestrunError};

/// Location of the device app cache below `DARWIN_USER_CACHE_DIR`.
const EMBEDDED_APP_DELTAS: &str = "com.apple.DeveloperTools/All/Xcode/EmbeddedAppDeltas";

/// Resolves toolchain paths with `xcrun` from the selected Xcode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xcrun;

impl Toolchain for Xcrun {
    fn sdk_platform_path(&self, sdk: Sdk) -> Result<PathBuf> {
        let output = Command::new("xcrun")
            .arg("--sdk")
            .arg(sdk.to_string())
            .arg("--show-sdk-platform-path")
            .output()
            .map_err(|e| XctestrunError::Toolchain(format!("failed to run xcrun: {e}")))?;
        if !output.status.success() {
            return Err(XctestrunError::Toolchain(format!(
                "xcrun --sdk {sdk} --show-sdk-platform-path exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            return Err(XctestrunError::Toolchain(format!("xcrun printed no platform path for {sdk}")));
        }
        debug!("SDK platform path for {sdk}: {path}");
        Ok(PathBuf::from(path))
    }

    fn test_cache_root(&self) -> Result<Option<PathBuf>> {
        let output = Command::new("getconf")
            .arg("DARWIN_USER_CACHE_DIR")
            .output()
            .map_err(|e| XctestrunError::Toolchain(format!("failed to run getconf: {e}")))?;
        if !output.status.success() {
            return Err(XctestrunError::Toolchain(format!(
                "getconf DARWIN_USER_CACHE_DIR exited with {}",
                output.status
            )));
        }
        Ok(cache_root_from(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn cache_root_from(user_cache_dir: &str) -> Option<PathBuf> {
    let dir = user_cache_dir.trim();
    if dir.is_empty() {
        return None;
    }
    Some(Path::new(dir).join(EMBEDDED_APP_DELTAS))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPlatform;

    impl Toolchain for FixedPlatform {
        fn sdk_platform_path(&self, _sdk: Sdk) -> Result<PathBuf> {
            Ok(PathBuf::from("/Xcode/Platforms/iPhoneSimulator.platform"))
        }
    }

    #[test]
    fn test_derived_paths() {
        let toolchain = FixedPlatform;
        assert_eq!(
            toolchain.xctest_tool_path(Sdk::IphoneSimulator).unwrap(),
            Path::new("/Xcode/Platforms/iPhoneSimulator.platform/Developer/Library/Xcode/Agents/xctest")
        );
        assert_eq!(
            toolchain.developer_frameworks_path(Sdk::IphoneSimulator).unwrap(),
            Path::new("/Xcode/Platforms/iPhoneSimulator.platform/Developer/Library/Frameworks")
        );
    }

    #[test]
    fn test_cache_root_from_user_cache_dir() {
        assert_eq!(
            cache_root_from("/var/folders/ab/xyz/C/\n"),
            Some(PathBuf::from(
                "/var/folders/ab/xyz/C/com.apple.DeveloperTools/All/Xcode/EmbeddedAppDeltas"
            ))
        );
        assert_eq!(cache_root_from("  \n"), None);
    }

    #[test]
    fn test_default_toolchain_has_no_cache_root() {
        assert_eq!(FixedPlatform.test_cache_root().unwrap(), None);
    }
}
