//! Provide the canonical vocabulary shared by the xctestrun generator, its CLI, and its tests.
//!
//! This crate is intentionally small and dependency-light. It contains stable identifiers and their spellings for:
//! - the SDKs a test can target (`iphonesimulator`, `iphoneos`),
//! - the supported test types (`xcuitest`, `xctest`, `logic_test`),
//! - the field names of the `xctestrun` document consumed by `xcodebuild`,
//! - the textual signals `xcodebuild` prints while running tests, and
//! - the exit codes a test run maps to.
//!
//! ## Notes
//!
//! - This is a vocabulary crate: **no IO**, no global state, no dependency on the plist store.
//! - Callers work with stable IDs (e.g. [`sdk::Sdk`], [`test_type::TestType`]) and look up spellings via the
//!   registry tables instead of comparing strings.

pub mod exit_codes;
pub mod fields;
pub mod registry;
pub mod sdk;
pub mod signals;
pub mod test_type;

pub use exit_codes::RunnerExitCode;
pub use sdk::Sdk;
pub use test_type::TestType;

/// Placeholder written in place of the absolute `TEST_ROOT` path inside a generated document.
pub const TESTROOT_RELATIVE_PATH: &str = "__TESTROOT__";

/// Name of the canonical root directory created inside the working directory.
pub const TEST_ROOT_DIR_NAME: &str = "TEST_ROOT";

/// File name of the generated document inside `TEST_ROOT`.
pub const XCTESTRUN_FILE_NAME: &str = "xctestrun.plist";

/// Sentinel entry in a test selection meaning "run every test".
pub const RUN_ALL_TESTS: &str = "all";

/// Separator between segments of a document field path.
pub const FIELD_PATH_SEPARATOR: char = ':';
