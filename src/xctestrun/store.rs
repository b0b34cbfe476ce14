//! Field access and patching for an existing xctestrun document.
//!
//! An xctestrun document always has exactly one key at its root, the logical name of the test bundle. Every field
//! this module reads or writes lives below that key, so callers address fields relative to it:
//! `TestingEnvironmentVariables:DYLD_LIBRARY_PATH` rather than `MyTests:TestingEnvironmentVariables:...`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use plist::{Dictionary, Value};
use tracing::info;
use xctestrun_core::{RUN_ALL_TESTS, RunnerExitCode, Sdk, TestType, fields, signals};

use crate::config::LaunchOptions;
use crate::errors::{Result, XctestrunError};
use crate::plist_store::PlistDocument;
use crate::toolchain::executor::XcodebuildTestExecutor;

/// An xctestrun document plus the test type it runs.
#[derive(Debug)]
pub struct XctestRun {
    document: PlistDocument,
    root_key: String,
    test_type: Option<TestType>,
}

impl XctestRun {
    /// Load the document at `path`.
    ///
    /// ## Parameters
    /// - `path`: the xctestrun file.
    /// - `test_type`: the test type, or `None` to infer it from the document on first use.
    ///
    /// ## Errors
    /// - `InvalidDocument` unless the root dictionary has exactly one key.
    pub fn open(path: impl AsRef<Path>, test_type: Option<TestType>) -> Result<Self> {
        let document = PlistDocument::open(path)?;
        let mut keys = document.root().keys();
        let root_key = match (keys.next(), keys.next()) {
            (Some(key), None) => key.clone(),
            (None, _) => return Err(invalid(&document, "the root dictionary is empty")),
            (Some(_), Some(_)) => return Err(invalid(&document, "the root dictionary has more than one key")),
        };
        Ok(Self {
            document,
            root_key,
            test_type,
        })
    }

    /// Location of the document on disk.
    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// The single root key (the test bundle's logical name).
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Test type of this run: the explicit one, or inferred from the presence of `UITargetAppPath`.
    pub fn test_type(&mut self) -> TestType {
        if let Some(test_type) = self.test_type {
            return test_type;
        }
        let inferred = if self.has_field(fields::UI_TARGET_APP_PATH) {
            TestType::XcUiTest
        } else {
            TestType::XcTest
        };
        self.test_type = Some(inferred);
        inferred
    }

    /// Resolve a field below the root key.
    pub fn field(&self, field: &str) -> Result<&Value> {
        self.document.get(&self.qualify(field))
    }

    /// Whether a field below the root key exists.
    pub fn has_field(&self, field: &str) -> bool {
        self.field(field).is_ok()
    }

    /// Write a field below the root key. Intermediate dictionaries must already exist.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<()> {
        let qualified = self.qualify(field);
        self.document.set(&qualified, value)
    }

    /// Delete a field below the root key.
    pub fn delete_field(&mut self, field: &str) -> Result<()> {
        let qualified = self.qualify(field);
        self.document.delete(&qualified)
    }

    /// Re-read the document from disk.
    pub fn reload(&mut self) -> Result<()> {
        self.document.reload()
    }

    /// Add environment variables to the test process, keeping existing ones.
    pub fn set_test_env_vars(&mut self, env_vars: &BTreeMap<String, String>) -> Result<()> {
        self.merge_string_dict(fields::ENVIRONMENT_VARIABLES, env_vars)
    }

    /// Replace the arguments of the test process.
    pub fn set_test_args(&mut self, args: &[String]) -> Result<()> {
        if args.is_empty() {
            return Ok(());
        }
        self.set_field(fields::COMMAND_LINE_ARGUMENTS, string_array(args))
    }

    /// Add environment variables to the app under test, keeping existing ones.
    pub fn set_app_under_test_env_vars(&mut self, env_vars: &BTreeMap<String, String>) -> Result<()> {
        let field = fields::app_under_test_env_vars_field(self.test_type());
        self.merge_string_dict(field, env_vars)
    }

    /// Replace the arguments of the app under test.
    pub fn set_app_under_test_args(&mut self, args: &[String]) -> Result<()> {
        if args.is_empty() {
            return Ok(());
        }
        let field = fields::app_under_test_args_field(self.test_type());
        self.set_field(field, string_array(args))
    }

    /// Restrict the run to `Class[/method]` identifiers. `["all"]` or an empty list leaves the document untouched.
    pub fn set_tests_to_run(&mut self, tests: &[String]) -> Result<()> {
        if tests.is_empty() || (tests.len() == 1 && tests[0] == RUN_ALL_TESTS) {
            return Ok(());
        }
        self.set_field(fields::ONLY_TEST_IDENTIFIERS, string_array(tests))
    }

    /// Skip `Class[/method]` identifiers.
    pub fn set_skip_tests(&mut self, tests: &[String]) -> Result<()> {
        if tests.is_empty() {
            return Ok(());
        }
        self.set_field(fields::SKIP_TEST_IDENTIFIERS, string_array(tests))
    }

    /// Apply every patch described by a launch options file.
    pub fn apply_launch_options(&mut self, options: &LaunchOptions) -> Result<()> {
        self.set_test_env_vars(&options.env_vars)?;
        self.set_test_args(&options.args)?;
        self.set_app_under_test_env_vars(&options.app_under_test_env_vars)?;
        self.set_app_under_test_args(&options.app_under_test_args)?;
        self.set_tests_to_run(&options.tests_to_run)?;
        self.set_skip_tests(&options.skip_tests)
    }

    /// Run the tests with `xcodebuild test-without-building` on `device_id`.
    ///
    /// Blocks until `xcodebuild` exits. There is no timeout; callers that need one must kill the process from
    /// outside. On `iphoneos`, the run's directories below `test_cache_root` are deleted afterwards.
    #[tracing::instrument(skip_all, fields(device_id = device_id, sdk = %sdk))]
    pub fn execute(
        &mut self,
        device_id: &str,
        sdk: Sdk,
        derived_data_dir: &Path,
        test_cache_root: Option<&Path>,
    ) -> Result<RunnerExitCode> {
        info!("Running test-without-building with device {device_id}");
        let mut command = Command::new("xcodebuild");
        command
            .arg("test-without-building")
            .arg("-xctestrun")
            .arg(self.path())
            .arg("-destination")
            .arg(format!("id={device_id}"))
            .arg("-derivedDataPath")
            .arg(derived_data_dir);
        XcodebuildTestExecutor::new(command, sdk, self.test_type())
            .with_signals(signals::TEST_EXECUTE_SUCCEEDED, signals::TEST_EXECUTE_FAILED)
            .with_test_cache_root(test_cache_root.map(Path::to_path_buf))
            .execute()
    }

    fn qualify(&self, field: &str) -> String {
        format!("{}:{}", self.root_key, field)
    }

    fn merge_string_dict(&mut self, field: &str, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut merged = match self.field(field) {
            Ok(value) => value.as_dictionary().cloned().unwrap_or_default(),
            Err(e) if e.is_field_not_found() => Dictionary::new(),
            Err(e) => return Err(e),
        };
        for (key, value) in entries {
            merged.insert(key.clone(), Value::String(value.clone()));
        }
        self.set_field(field, Value::Dictionary(merged))
    }
}

/// Build a plist array of strings.
pub fn string_array(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Build a plist string from a path.
pub fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().into_owned())
}

fn invalid(document: &PlistDocument, reason: &str) -> XctestrunError {
    XctestrunError::InvalidDocument {
        path: PathBuf::from(document.path()),
        reason: reason.to_string(),
    }
}
