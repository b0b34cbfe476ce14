//! Field names of the `xctestrun` document.
//!
//! These spellings are the wire contract with `xcodebuild test-without-building`. Nested fields are written as
//! colon-delimited paths relative to the document's root key.

/// Environment variables of the test process (and of the app under test for non-UI tests).
pub const ENVIRONMENT_VARIABLES: &str = "EnvironmentVariables";

/// Arguments of the test process (and of the app under test for non-UI tests).
pub const COMMAND_LINE_ARGUMENTS: &str = "CommandLineArguments";

/// Environment variables of the app under test in a UI test.
pub const UI_TARGET_APP_ENVIRONMENT_VARIABLES: &str = "UITargetAppEnvironmentVariables";

/// Arguments of the app under test in a UI test.
pub const UI_TARGET_APP_COMMAND_LINE_ARGUMENTS: &str = "UITargetAppCommandLineArguments";

/// Test classes/methods to run, as `Class[/method]`.
pub const ONLY_TEST_IDENTIFIERS: &str = "OnlyTestIdentifiers";

/// Test classes/methods to skip, as `Class[/method]`.
pub const SKIP_TEST_IDENTIFIERS: &str = "SkipTestIdentifiers";

/// Path of the process hosting the test bundle.
pub const TEST_HOST_PATH: &str = "TestHostPath";

/// Path of the app under test in a UI test. Its presence marks a document as a UI test.
pub const UI_TARGET_APP_PATH: &str = "UITargetAppPath";

/// Path of the test bundle.
pub const TEST_BUNDLE_PATH: &str = "TestBundlePath";

/// Environment variables applied by the testing infrastructure.
pub const TESTING_ENVIRONMENT_VARIABLES: &str = "TestingEnvironmentVariables";

/// Build-machine specific bundle name; wrong anywhere but the machine that produced it.
pub const IDE_IPHONE_INTERNAL_TEST_BUNDLE_NAME: &str = "TestingEnvironmentVariables:IDEiPhoneInternalTestBundleName";

/// Framework search path for the logic test host.
pub const DYLD_FRAMEWORK_PATH: &str = "DYLD_FRAMEWORK_PATH";

/// Library search path for the logic test host.
pub const DYLD_LIBRARY_PATH: &str = "DYLD_LIBRARY_PATH";

/// `Info.plist` key enabling iTunes/Finder file sharing for an app.
pub const UI_FILE_SHARING_ENABLED: &str = "UIFileSharingEnabled";

/// Field holding environment variables of the app under test for `test_type`.
pub fn app_under_test_env_vars_field(test_type: crate::TestType) -> &'static str {
    match test_type {
        crate::TestType::XcUiTest => UI_TARGET_APP_ENVIRONMENT_VARIABLES,
        crate::TestType::XcTest | crate::TestType::LogicTest => ENVIRONMENT_VARIABLES,
    }
}

/// Field holding arguments of the app under test for `test_type`.
pub fn app_under_test_args_field(test_type: crate::TestType) -> &'static str {
    match test_type {
        crate::TestType::XcUiTest => UI_TARGET_APP_COMMAND_LINE_ARGUMENTS,
        crate::TestType::XcTest | crate::TestType::LogicTest => COMMAND_LINE_ARGUMENTS,
    }
}
