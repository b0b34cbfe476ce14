//! Text markers printed by `xcodebuild` while running tests.
//!
//! The test executor scans the output stream for these to decide the outcome independently of the process exit
//! status.

/// Printed once the first test suite starts.
pub const TEST_STARTED: &str = "Test Suite";

/// Printed by `xcodebuild test-without-building` when every test passed.
pub const TEST_EXECUTE_SUCCEEDED: &str = "** TEST EXECUTE SUCCEEDED **";

/// Printed by `xcodebuild test-without-building` when a test failed.
pub const TEST_EXECUTE_FAILED: &str = "** TEST EXECUTE FAILED **";

/// XCUITest runner failed to move to the background; the simulator must be recreated.
pub const BACKGROUND_TEST_RUNNER_ERROR: &str = "Failed to background test runner";

/// SpringBoard refused to launch the app.
pub const REQUEST_DENIED_ERROR: &str = "The request was denied by service delegate (SBMainWorkspace) for reason";

/// CoreSimulator service could not be reached.
pub const INIT_SIM_SERVICE_ERROR: &str = "Failed to initiate service connection to simulator";

/// Prefix and suffix of `Application "<id>" is unknown to FrontBoard.`
pub const APP_UNKNOWN_TO_FRONTBOARD: (&str, &str) = ("Application \"", "\" is unknown to FrontBoard.");

/// Check whether pre-start output shows a simulator in a state only recreation fixes.
///
/// ## Parameters
/// - `output`: everything printed before the test-started signal.
/// - `is_ui_test`: whether the run is an XCUITest; the background-runner error only applies there.
pub fn needs_recreate_simulator(output: &str, is_ui_test: bool) -> bool {
    if is_ui_test && output.contains(BACKGROUND_TEST_RUNNER_ERROR) {
        return true;
    }
    if output.contains(REQUEST_DENIED_ERROR) || output.contains(INIT_SIM_SERVICE_ERROR) {
        return true;
    }
    let (prefix, suffix) = APP_UNKNOWN_TO_FRONTBOARD;
    output
        .lines()
        .any(|line| line.find(prefix).is_some_and(|start| line[start + prefix.len()..].contains(suffix)))
}
