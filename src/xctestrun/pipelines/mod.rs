//! Generation pipelines, one per test type.
//!
//! Every pipeline receives the relocated inputs in a [`PipelineContext`] and must leave a populated document at
//! `TEST_ROOT/xctestrun.plist`. The factory picks the pipeline with one exhaustive match over the test type.
//!
//! Build products of the harness project land in the derived data directory:
//!
//! ```text
//! dummyproject_derived_data/
//!   Build/Products/
//!     Debug-<sdk>/<Name>-Runner.app   (UI tests only)
//!     <Name>.xctestrun
//! ```

pub mod xctest;
pub mod xcuitest;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use xctestrun_core::{Sdk, TestType, XCTESTRUN_FILE_NAME};

use super::XctestRun;
use crate::config::SigningOptions;
use crate::errors::{IoResultExt, Result, XctestrunError};
use crate::fsutil;
use crate::toolchain::{HarnessBuilder, HarnessRequest, Toolchain};

pub use logic_test::LogicTestPipeline;
pub use xctest::XctestPipeline;
pub use xcuitest::XcuitestPipeline;

/// Derived data directory of the harness build, inside the working directory.
pub const HARNESS_DERIVED_DATA_DIR: &str = "dummyproject_derived_data";

/// Produces a populated document and the final artifact layout for one test type.
pub trait Pipeline {
    fn run(&self, ctx: &PipelineContext<'_>) -> Result<XctestRun>;
}

/// Inputs shared by every pipeline. Bundles are already inside `TEST_ROOT`.
pub struct PipelineContext<'a> {
    pub work_dir: &'a Path,
    pub test_root: &'a Path,
    pub app_under_test: Option<&'a Path>,
    pub test_bundle: &'a Path,
    pub sdk: Sdk,
    pub test_type: TestType,
    pub signing_options: &'a SigningOptions,
    pub toolchain: &'a dyn Toolchain,
    pub harness: Option<&'a dyn HarnessBuilder>,
}

impl PipelineContext<'_> {
    pub fn derived_data_dir(&self) -> PathBuf {
        self.work_dir.join(HARNESS_DERIVED_DATA_DIR)
    }

    pub fn build_products_dir(&self) -> PathBuf {
        self.derived_data_dir().join("Build").join("Products")
    }

    /// Final location of the document.
    pub fn xctestrun_path(&self) -> PathBuf {
        self.test_root.join(XCTESTRUN_FILE_NAME)
    }

    /// The app under test; pipelines other than logic tests cannot run without one.
    pub fn require_app_under_test(&self) -> Result<&Path> {
        self.app_under_test.ok_or_else(|| {
            XctestrunError::IllegalArgument(format!("test type {} requires an app under test", self.test_type))
        })
    }

    /// Run `build-for-testing` on the harness, with `TEST_ROOT` as its build products directory.
    pub fn build_harness(&self) -> Result<()> {
        let harness = self.harness.ok_or_else(|| {
            XctestrunError::IllegalArgument(format!("test type {} needs a harness project builder", self.test_type))
        })?;
        let derived_data_dir = self.derived_data_dir();
        harness.build_for_testing(&HarnessRequest {
            app_under_test: self.app_under_test,
            test_bundle: self.test_bundle,
            sdk: self.sdk,
            test_type: self.test_type,
            work_dir: self.work_dir,
            built_products_dir: self.test_root,
            derived_data_dir: &derived_data_dir,
            runner_provisioning_profile: self.signing_options.xctrunner_app_provisioning_profile.as_deref(),
        })
    }

    /// Move the single generated `*.xctestrun` to `TEST_ROOT/xctestrun.plist`.
    pub fn harvest_xctestrun(&self) -> Result<PathBuf> {
        let products = self.build_products_dir();
        let candidates = fsutil::children_matching(&products, |name| name.ends_with(".xctestrun"))?;
        let generated = fsutil::exactly_one(candidates, "xctestrun file", &products)?;
        let dest = self.xctestrun_path();
        fsutil::move_entry(&generated, &dest)?;
        info!("Harvested {}", generated.display());
        Ok(dest)
    }
}

/// Place the test bundle in a `PlugIns` directory.
///
/// A plugin that is a symbolic link breaks app installation, so a symlinked bundle is copied instead of moved.
pub fn install_plugin(test_bundle: &Path, plugins_dir: &Path) -> Result<PathBuf> {
    if !fsutil::is_symlink(test_bundle) {
        return fsutil::move_and_replace(test_bundle, plugins_dir);
    }
    let dest = plugins_dir.join(fsutil::file_name(test_bundle)?);
    if fsutil::entry_exists(&dest) {
        fsutil::remove_entry(&dest)?;
    }
    fsutil::copy_entry(test_bundle, &dest)?;
    Ok(dest)
}

/// Ensure `dir` exists and is empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if fsutil::entry_exists(dir) {
        fsutil::remove_entry(dir)?;
    }
    fs::create_dir_all(dir).with_path(dir)
}
