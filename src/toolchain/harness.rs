//! Harness project builder backed by `xcodebuild build-for-testing`.
//!
//! The harness is a minimal Xcode project template with two schemes, `TestProjectXcuitest` and
//! `TestProjectXctest`. Its targets read the bundle names from build settings, so the generator only overrides
//! settings on the command line and never edits the project file:
//!
//! - `APP_UNDER_TEST_NAME`, `TEST_BUNDLE_NAME`: product names of the prebuilt bundles in `BUILT_PRODUCTS_DIR`.
//! - `BUILT_PRODUCTS_DIR`: `TEST_ROOT`, where the prebuilt bundles already are, so the build does not copy them.
//! - `PROVISIONING_PROFILE_SPECIFIER`: only when signing options name a runner profile.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use xctestrun_core::{Sdk, TestType};

use super::{HarnessBuilder, HarnessRequest};
use crate::errors::{IoResultExt, Result, XctestrunError};
use crate::fsutil;

/// Directory name of the copied harness project inside the working directory.
pub const HARNESS_PROJECT_DIR: &str = "harness_project";

/// Number of trailing output lines kept in a build error.
const OUTPUT_TAIL_LINES: usize = 40;

/// Builds a copy of a harness project template with `xcodebuild`.
#[derive(Debug, Clone)]
pub struct XcodebuildHarness {
    template: PathBuf,
}

impl XcodebuildHarness {
    pub fn new(template: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Scheme building the harness for `test_type`.
    pub fn scheme(test_type: TestType) -> Result<&'static str> {
        match test_type {
            TestType::XcUiTest => Ok("TestProjectXcuitest"),
            TestType::XcTest => Ok("TestProjectXctest"),
            TestType::LogicTest => Err(XctestrunError::IllegalArgument(
                "logic tests do not build a harness project".to_string(),
            )),
        }
    }

    /// Copy the template into the working directory and return the `.xcodeproj` inside it.
    fn prepare_project(&self, work_dir: &Path) -> Result<PathBuf> {
        let project_dir = work_dir.join(HARNESS_PROJECT_DIR);
        if fsutil::entry_exists(&project_dir) {
            fsutil::remove_entry(&project_dir)?;
        }
        fsutil::copy_dir_all(&self.template, &project_dir)?;
        let projects = fsutil::children_matching(&project_dir, |name| name.ends_with(".xcodeproj"))?;
        fsutil::exactly_one(projects, "harness .xcodeproj", &project_dir)
    }

    /// Assemble the `xcodebuild build-for-testing` invocation.
    pub fn command(xcodeproj: &Path, request: &HarnessRequest<'_>) -> Result<Command> {
        let mut command = Command::new("xcodebuild");
        command
            .arg("build-for-testing")
            .arg("-project")
            .arg(xcodeproj)
            .arg("-scheme")
            .arg(Self::scheme(request.test_type)?)
            .arg("-sdk")
            .arg(request.sdk.to_string())
            .arg("-derivedDataPath")
            .arg(request.derived_data_dir)
            .arg(build_setting("BUILT_PRODUCTS_DIR", request.built_products_dir));
        if let Some(app) = request.app_under_test {
            command.arg(build_setting("APP_UNDER_TEST_NAME", Path::new(bundle_stem(app)?)));
        }
        command.arg(build_setting("TEST_BUNDLE_NAME", Path::new(bundle_stem(request.test_bundle)?)));
        match (request.sdk, request.runner_provisioning_profile) {
            (Sdk::IphoneOs, Some(profile)) => {
                command
                    .arg("CODE_SIGN_STYLE=Manual")
                    .arg(format!("PROVISIONING_PROFILE_SPECIFIER={profile}"));
            }
            (Sdk::IphoneOs, None) => {}
            (Sdk::IphoneSimulator, _) => {
                command.arg("CODE_SIGNING_REQUIRED=NO");
            }
        }
        Ok(command)
    }
}

impl HarnessBuilder for XcodebuildHarness {
    fn build_for_testing(&self, request: &HarnessRequest<'_>) -> Result<()> {
        let xcodeproj = self.prepare_project(request.work_dir)?;
        let mut command = Self::command(&xcodeproj, request)?;
        info!("Running build-for-testing on the harness project");
        debug!("{command:?}");
        let output = command.output().with_path("xcodebuild")?;
        if output.status.success() {
            return Ok(());
        }
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Err(XctestrunError::Build {
            status: output.status.to_string(),
            output_tail: tail(&combined, OUTPUT_TAIL_LINES),
        })
    }
}

fn build_setting(name: &str, value: &Path) -> String {
    format!("{name}={}", value.display())
}

/// Bundle name without its extension (`MyApp.app` -> `MyApp`).
fn bundle_stem(bundle: &Path) -> Result<&str> {
    bundle
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| XctestrunError::IllegalArgument(format!("{} is not a bundle path", bundle.display())))
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
