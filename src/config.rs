//! Configuration for generating and launching an xctestrun.
//!
//! Two option files are read from JSON: [`SigningOptions`] (how the generated XCTRunner app is prepared) and
//! [`LaunchOptions`] (how the test and app processes are launched). [`FactoryOptions`] collects everything the
//! generator needs.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use xctestrun_core::{Sdk, TestType};

use crate::errors::{IoResultExt, Result, XctestrunError};

/// Environment variable naming the harness project template directory.
pub const HARNESS_TEMPLATE_ENV: &str = "XCTESTRUN_HARNESS_TEMPLATE";

/// Options for preparing the XCTRunner app of a UI test. Only honored on `iphoneos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigningOptions {
    /// Provisioning profile the harness build signs the runner app with.
    pub xctrunner_app_provisioning_profile: Option<String>,
    /// Set `UIFileSharingEnabled` in the runner app's `Info.plist`.
    pub xctrunner_app_enable_ui_file_sharing: bool,
}

impl SigningOptions {
    pub fn is_empty(&self) -> bool {
        self == &SigningOptions::default()
    }
}

/// Patches applied to the document before running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchOptions {
    /// Extra environment variables of the test process.
    pub env_vars: BTreeMap<String, String>,
    /// Arguments of the test process.
    pub args: Vec<String>,
    /// Extra environment variables of the app under test.
    pub app_under_test_env_vars: BTreeMap<String, String>,
    /// Arguments of the app under test.
    pub app_under_test_args: Vec<String>,
    /// `Class[/method]` identifiers to run.
    pub tests_to_run: Vec<String>,
    /// `Class[/method]` identifiers to skip.
    pub skip_tests: Vec<String>,
}

/// Load a JSON options file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_path(path)?;
    serde_json::from_str(&text).map_err(|source| XctestrunError::Options {
        path: path.to_path_buf(),
        source,
    })
}

/// Everything the generator needs to produce an xctestrun.
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
    /// App under test. Required unless the test type is `logic_test`.
    pub app_under_test: Option<PathBuf>,
    /// Test bundle (`*.xctest`).
    pub test_bundle: PathBuf,
    pub sdk: Sdk,
    pub test_type: TestType,
    pub signing_options: SigningOptions,
    /// Working directory. `None` means a private temporary directory, deleted on close.
    pub work_dir: Option<PathBuf>,
}

impl FactoryOptions {
    /// Options for `test_bundle` with defaults: simulator, UI test, no app, temporary working directory.
    pub fn new(test_bundle: impl Into<PathBuf>) -> Self {
        Self {
            app_under_test: None,
            test_bundle: test_bundle.into(),
            sdk: Sdk::default(),
            test_type: TestType::default(),
            signing_options: SigningOptions::default(),
            work_dir: None,
        }
    }

    /// Set the app under test
    pub fn with_app_under_test(mut self, app: impl Into<PathBuf>) -> Self {
        self.app_under_test = Some(app.into());
        self
    }

    /// Set the SDK
    pub fn with_sdk(mut self, sdk: Sdk) -> Self {
        self.sdk = sdk;
        self
    }

    /// Set the test type
    pub fn with_test_type(mut self, test_type: TestType) -> Self {
        self.test_type = test_type;
        self
    }

    /// Set the signing options
    pub fn with_signing_options(mut self, signing_options: SigningOptions) -> Self {
        self.signing_options = signing_options;
        self
    }

    /// Use a caller-owned working directory
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }
}

/// Find the harness project template: the explicit path, else `$XCTESTRUN_HARNESS_TEMPLATE`.
pub fn find_harness_template(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env::var_os(HARNESS_TEMPLATE_ENV)
        .map(PathBuf::from)
        .filter(|path| path.is_dir())
}
