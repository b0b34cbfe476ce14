//! Runner exit code registry.
//!
//! A test run never fails with an error value once `xcodebuild` has been spawned; its outcome is one of these codes.

use std::fmt;

use crate::registry::{self, VocabInfo};

/// Outcome of a `test-without-building` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunnerExitCode {
    Succeeded,
    Failed,
    Error,
    TestNotStart,
    NeedRecreateSim,
    NeedRebootDevice,
}

/// Metadata entry for an exit code.
pub type ExitCodeInfo = VocabInfo<RunnerExitCode>;

/// Registry of runner exit codes, in numeric order.
pub const EXIT_CODES: &[ExitCodeInfo] = &[
    VocabInfo {
        id: RunnerExitCode::Succeeded,
        canonical: "SUCCEEDED",
        aliases: &[],
        description: "All tests passed",
    },
    VocabInfo {
        id: RunnerExitCode::Failed,
        canonical: "FAILED",
        aliases: &[],
        description: "At least one test failed",
    },
    VocabInfo {
        id: RunnerExitCode::Error,
        canonical: "ERROR",
        aliases: &[],
        description: "Tests started but no outcome marker was printed",
    },
    VocabInfo {
        id: RunnerExitCode::TestNotStart,
        canonical: "TEST_NOT_START",
        aliases: &[],
        description: "xcodebuild exited before any test suite started",
    },
    VocabInfo {
        id: RunnerExitCode::NeedRecreateSim,
        canonical: "NEED_RECREATE_SIM",
        aliases: &[],
        description: "The simulator is in a state only recreation fixes",
    },
    VocabInfo {
        id: RunnerExitCode::NeedRebootDevice,
        canonical: "NEED_REBOOT_DEVICE",
        aliases: &[],
        description: "The device must be rebooted before testing again",
    },
];

impl RunnerExitCode {
    /// Process exit status for this outcome.
    pub fn code(self) -> i32 {
        match self {
            RunnerExitCode::Succeeded => 0,
            RunnerExitCode::Failed => 1,
            RunnerExitCode::Error => 2,
            RunnerExitCode::TestNotStart => 3,
            RunnerExitCode::NeedRecreateSim => 4,
            RunnerExitCode::NeedRebootDevice => 5,
        }
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        registry::find(EXIT_CODES, self).map_or("UNKNOWN", |i| i.canonical)
    }
}

impl fmt::Display for RunnerExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}
