//! Boundaries to the Xcode toolchain.
//!
//! The generator never calls `xcodebuild` or `xcrun` directly. It goes through these traits so tests and dry runs
//! can substitute the toolchain:
//! - [`Toolchain`]: path discovery for SDK platforms, the logic test host, and Xcode's per-run device cache.
//! - [`HarnessBuilder`]: `build-for-testing` of the throwaway harness project.
//!
//! Default implementations shell out to the real tools ([`xcrun::Xcrun`], [`harness::XcodebuildHarness`]).

pub mod bundle;
pub mod executor;
pub mod harness;
pub mod xcrun;

use std::path::{Path, PathBuf};

use xctestrun_core::{Sdk, TestType};

use crate::errors::Result;

pub use executor::XcodebuildTestExecutor;
pub use harness::XcodebuildHarness;
pub use xcrun::Xcrun;

/// Path discovery for an installed Xcode.
pub trait Toolchain {
    /// Platform directory of `sdk`, e.g. `.../Platforms/iPhoneSimulator.platform`.
    fn sdk_platform_path(&self, sdk: Sdk) -> Result<PathBuf>;

    /// The `xctest` executable that hosts logic test bundles.
    fn xctest_tool_path(&self, sdk: Sdk) -> Result<PathBuf> {
        Ok(self.sdk_platform_path(sdk)?.join("Developer/Library/Xcode/Agents/xctest"))
    }

    /// Framework directory the logic test host must load XCTest from.
    fn developer_frameworks_path(&self, sdk: Sdk) -> Result<PathBuf> {
        Ok(self.sdk_platform_path(sdk)?.join("Developer/Library/Frameworks"))
    }

    /// Directory where `xcodebuild` caches apps installed on a device (`EmbeddedAppDeltas`).
    ///
    /// `None` disables the cleanup of that cache after device runs.
    fn test_cache_root(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Inputs of one harness build.
#[derive(Debug, Clone, Copy)]
pub struct HarnessRequest<'a> {
    /// App under test, already relocated into `TEST_ROOT`.
    pub app_under_test: Option<&'a Path>,
    /// Test bundle, already relocated into `TEST_ROOT`.
    pub test_bundle: &'a Path,
    pub sdk: Sdk,
    pub test_type: TestType,
    /// Working directory the harness project may be created in.
    pub work_dir: &'a Path,
    /// Build products directory handed to the build (`TEST_ROOT`).
    pub built_products_dir: &'a Path,
    /// Derived data directory whose `Build/Products` receives the generated xctestrun and runner app.
    pub derived_data_dir: &'a Path,
    /// Provisioning profile for the XCTRunner app, if any.
    pub runner_provisioning_profile: Option<&'a str>,
}

/// Runs `build-for-testing` on a throwaway harness project.
pub trait HarnessBuilder {
    /// Build the harness once. No retry.
    fn build_for_testing(&self, request: &HarnessRequest<'_>) -> Result<()>;
}
