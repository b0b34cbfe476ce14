//! Generate an xctestrun document from a prebuilt app under test and test bundle.
//!
//! ## Layout
//!
//! Generation relocates every artifact into `<work_dir>/TEST_ROOT`:
//!
//! ```text
//! TEST_ROOT/
//!   xctestrun.plist
//!   <App>.app/                      (xctest: PlugIns/<Tests>.xctest)
//!   <Name>-Runner.app/PlugIns/...   (xcuitest only)
//!   <Tests>.xctest                  (logic_test)
//! ```
//!
//! The bundles are moved into `TEST_ROOT` before the harness build: with `TEST_ROOT` as build products directory
//! the build finds them in place instead of copying them.
//!
//! ## Cleanup
//!
//! A factory without a caller-supplied working directory owns a temporary one. [`XctestRunFactory::close`] (or
//! dropping the factory) deletes it, whether or not generation succeeded. Nothing else is rolled back on failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{info, warn};
use xctestrun_core::{Sdk, TEST_ROOT_DIR_NAME, TestType};

use super::XctestRun;
use super::pipelines::{LogicTestPipeline, Pipeline, PipelineContext, XcuitestPipeline, XctestPipeline};
use super::portable;
use crate::config::FactoryOptions;
use crate::errors::{IoResultExt, Result, XctestrunError};
use crate::fsutil;
use crate::toolchain::{HarnessBuilder, Toolchain, Xcrun};

/// Working directory of one generation.
#[derive(Debug)]
pub enum WorkDir {
    /// Supplied by the caller; left in place.
    Provided(PathBuf),
    /// Private temporary directory, deleted on release.
    Owned(TempDir),
}

impl WorkDir {
    /// Use `requested` (created if absent), or create a private temporary directory.
    pub fn acquire(requested: Option<&Path>) -> Result<Self> {
        match requested {
            Some(dir) => {
                let dir = std::path::absolute(dir).with_path(dir)?;
                fs::create_dir_all(&dir).with_path(&dir)?;
                Ok(WorkDir::Provided(dir))
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("xctestrun-")
                    .tempdir()
                    .with_path(std::env::temp_dir())?;
                Ok(WorkDir::Owned(temp))
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            WorkDir::Provided(dir) => dir,
            WorkDir::Owned(temp) => temp.path(),
        }
    }

    /// Delete an owned directory. A directory that is already gone is not an error.
    pub fn release(self) -> Result<()> {
        match self {
            WorkDir::Provided(_) => Ok(()),
            WorkDir::Owned(temp) => {
                let path = temp.path().to_path_buf();
                match temp.close() {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(XctestrunError::io(path, e)),
                }
            }
        }
    }
}

/// Generates an [`XctestRun`] by building a throwaway harness project around prebuilt bundles.
pub struct XctestRunFactory {
    options: FactoryOptions,
    toolchain: Box<dyn Toolchain>,
    harness: Option<Box<dyn HarnessBuilder>>,
    work_dir: Option<WorkDir>,
    xctestrun: Option<XctestRun>,
}

impl XctestRunFactory {
    /// Validate `options` and create a factory using `xcrun` for toolchain lookups and no harness builder.
    ///
    /// ## Errors
    /// - `IllegalArgument` for a logic test on a device SDK, a missing app under test for UI or unit tests, or a
    ///   missing input bundle. Nothing on disk is touched.
    pub fn new(mut options: FactoryOptions) -> Result<Self> {
        validate(&options)?;
        if options.sdk != Sdk::IphoneOs && !options.signing_options.is_empty() {
            info!(
                "The signing options only work on sdk {}, but current sdk is {}; ignoring them",
                Sdk::IphoneOs,
                options.sdk
            );
            options.signing_options = Default::default();
        }
        Ok(Self {
            options,
            toolchain: Box::new(Xcrun),
            harness: None,
            work_dir: None,
            xctestrun: None,
        })
    }

    /// Use `toolchain` for SDK path discovery.
    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    /// Use `harness` to run `build-for-testing`. Required for `xcuitest` and `xctest`.
    pub fn with_harness(mut self, harness: impl HarnessBuilder + 'static) -> Self {
        self.harness = Some(Box::new(harness));
        self
    }

    pub fn options(&self) -> &FactoryOptions {
        &self.options
    }

    /// Working directory, once generation has acquired it.
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_ref().map(WorkDir::path)
    }

    /// Generate the document, or return the one generated by an earlier call.
    #[tracing::instrument(skip_all, fields(sdk = %self.options.sdk, test_type = %self.options.test_type))]
    pub fn generate(&mut self) -> Result<&mut XctestRun> {
        let run = match self.xctestrun.take() {
            Some(run) => run,
            None => self.generate_uncached()?,
        };
        Ok(self.xctestrun.insert(run))
    }

    /// Acquire the working directory if generation has not done so yet.
    pub fn prepare_work_dir(&mut self) -> Result<&Path> {
        let work_dir = match self.work_dir.take() {
            Some(work_dir) => work_dir,
            None => WorkDir::acquire(self.options.work_dir.as_deref())?,
        };
        Ok(self.work_dir.insert(work_dir).path())
    }

    /// Delete the working directory if this factory created it. Safe to call repeatedly.
    ///
    /// A document generated into a deleted directory is forgotten; the next [`generate`](Self::generate) starts over.
    pub fn close(&mut self) -> Result<()> {
        let Some(work_dir) = self.work_dir.take() else {
            return Ok(());
        };
        if matches!(work_dir, WorkDir::Owned(_)) {
            self.xctestrun = None;
        }
        work_dir.release()
    }

    fn generate_uncached(&mut self) -> Result<XctestRun> {
        info!("Generating xctestrun file");
        let test_type = self.options.test_type;
        if test_type != TestType::LogicTest && self.harness.is_none() {
            return Err(XctestrunError::IllegalArgument(format!(
                "test type {test_type} needs a harness project; pass --harness-template"
            )));
        }

        let work_dir = self.prepare_work_dir()?.to_path_buf();
        let test_root = work_dir.join(TEST_ROOT_DIR_NAME);
        fs::create_dir_all(&test_root).with_path(&test_root)?;

        let app_under_test = match &self.options.app_under_test {
            Some(app) => Some(fsutil::move_and_replace(app, &test_root)?),
            None => None,
        };
        let test_bundle = fsutil::move_and_replace(&self.options.test_bundle, &test_root)?;

        let ctx = PipelineContext {
            work_dir: &work_dir,
            test_root: &test_root,
            app_under_test: app_under_test.as_deref(),
            test_bundle: &test_bundle,
            sdk: self.options.sdk,
            test_type,
            signing_options: &self.options.signing_options,
            toolchain: self.toolchain.as_ref(),
            harness: self.harness.as_deref(),
        };
        let mut run = match test_type {
            TestType::XcUiTest => XcuitestPipeline.run(&ctx)?,
            TestType::XcTest => XctestPipeline.run(&ctx)?,
            TestType::LogicTest => LogicTestPipeline.run(&ctx)?,
        };

        portable::rewrite_test_root(run.path(), &test_root)?;
        run.reload()?;
        info!("Generated {}", run.path().display());
        Ok(run)
    }
}

impl Drop for XctestRunFactory {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to delete working directory: {e}");
        }
    }
}

fn validate(options: &FactoryOptions) -> Result<()> {
    if options.test_type == TestType::LogicTest && options.sdk != Sdk::IphoneSimulator {
        return Err(XctestrunError::IllegalArgument(format!(
            "only support running logic test on sdk {}; current sdk is {}",
            Sdk::IphoneSimulator,
            options.sdk
        )));
    }
    if options.test_type != TestType::LogicTest && options.app_under_test.is_none() {
        return Err(XctestrunError::IllegalArgument(format!(
            "test type {} requires an app under test",
            options.test_type
        )));
    }
    let inputs = options.app_under_test.iter().chain(std::iter::once(&options.test_bundle));
    for input in inputs {
        if !fsutil::entry_exists(input) {
            return Err(XctestrunError::IllegalArgument(format!("{} does not exist", input.display())));
        }
        fsutil::file_name(input)?;
    }
    Ok(())
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
    fn test_owned_work_dir_release_twice_is_safe() {
        let work_dir = WorkDir::acquire(None).unwrap();
        let path = work_dir.path().to_path_buf();
        assert!(path.is_dir());
        fs::remove_dir_all(&path).unwrap();
        work_dir.release().unwrap();
    }

    #[test]
    fn test_provided_work_dir_is_created_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let requested = dir.path().join("nested").join("work");
        let work_dir = WorkDir::acquire(Some(&requested)).unwrap();
        assert_eq!(work_dir.path(), requested);
        work_dir.release().unwrap();
        assert!(requested.is_dir());
    }

    #[test]
    fn test_missing_harness_fails_before_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("App.app");
        let tests = dir.path().join("AppTests.xctest");
        fs::create_dir(&app).unwrap();
        fs::create_dir(&tests).unwrap();
        let work = dir.path().join("work");

        let mut factory = XctestRunFactory::new(
            FactoryOptions::new(&tests)
                .with_app_under_test(&app)
                .with_test_type(TestType::XcTest)
                .with_work_dir(&work),
        )
        .unwrap();

        assert!(matches!(factory.generate(), Err(XctestrunError::IllegalArgument(_))));
        assert!(app.exists());
        assert!(!work.exists());
    }

    #[test]
    fn test_prepared_work_dir_is_reused_by_generate() {
        let dir = tempfile::tempdir().unwrap();
        let tests = dir.path().join("LogicTests.xctest");
        fs::create_dir(&tests).unwrap();
        let mut factory = XctestRunFactory::new(FactoryOptions::new(&tests).with_test_type(TestType::LogicTest))
            .unwrap()
            .with_toolchain(FixedPlatform);

        let prepared = factory.prepare_work_dir().unwrap().to_path_buf();
        assert_eq!(factory.prepare_work_dir().unwrap(), prepared);
        let document = factory.generate().unwrap().path().to_path_buf();
        assert!(document.starts_with(&prepared));

        factory.close().unwrap();
        assert!(!prepared.exists());
    }

    #[test]
    fn test_signing_options_dropped_on_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let tests = dir.path().join("LogicTests.xctest");
        fs::create_dir(&tests).unwrap();
        let signing = crate::config::SigningOptions {
            xctrunner_app_provisioning_profile: Some("profile".to_string()),
            xctrunner_app_enable_ui_file_sharing: true,
        };
        let factory = XctestRunFactory::new(
            FactoryOptions::new(&tests)
                .with_test_type(TestType::LogicTest)
                .with_signing_options(signing),
        )
        .unwrap();
        assert!(factory.options().signing_options.is_empty());
    }
}
