//! CLI module for xctestrun
//!
//! ## Commands
//!
//! - `generate` - Generate an xctestrun for prebuilt bundles and print its path
//! - `test` - Generate, patch with launch options, run, and clean up
//! - `run` - Run an existing xctestrun
//! - `field get|delete` - Inspect or remove one field of an xctestrun
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use xctestrun_core::{Sdk, TestType, sdk, test_type};

use crate::errors::XctestrunError;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<XctestrunError> for CliError {
    fn from(err: XctestrunError) -> Self {
        // Debug formatting of a Report renders the diagnostic with its code and help.
        CliError::failure(format!("{:?}", miette::Report::new(err)))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Generate and run xctestrun files for prebuilt iOS tests
#[derive(Parser, Debug)]
#[command(name = "xctestrun")]
#[command(version = VERSION)]
#[command(about = "Generate and run xctestrun files for prebuilt iOS tests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Inputs shared by every command that generates an xctestrun.
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Test bundle (*.xctest)
    #[arg(long, value_name = "PATH")]
    pub test_bundle: PathBuf,

    /// App under test (*.app); required for xcuitest and xctest
    #[arg(long, value_name = "PATH")]
    pub app_under_test: Option<PathBuf>,

    /// SDK of the bundles
    #[arg(long, value_name = "SDK", default_value = "iphonesimulator", value_parser = parse_sdk)]
    pub sdk: Sdk,

    /// Test type
    #[arg(long, value_name = "TYPE", default_value = "xcuitest", value_parser = parse_test_type)]
    pub test_type: TestType,

    /// JSON file with signing options for the XCTRunner app (iphoneos only)
    #[arg(long, value_name = "FILE")]
    pub signing_options: Option<PathBuf>,

    /// Harness project template directory (default: $XCTESTRUN_HARNESS_TEMPLATE)
    #[arg(long, value_name = "DIR")]
    pub harness_template: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate an xctestrun and print its path
    Generate {
        #[command(flatten)]
        generation: GenerationArgs,
        /// Working directory that receives TEST_ROOT
        #[arg(long, value_name = "DIR")]
        work_dir: PathBuf,
    },

    /// Generate an xctestrun, run it, and delete temporary files
    Test {
        #[command(flatten)]
        generation: GenerationArgs,
        /// Device or simulator UDID
        #[arg(long, value_name = "ID")]
        device_id: String,
        /// JSON file with launch options
        #[arg(long, value_name = "FILE")]
        launch_options: Option<PathBuf>,
        /// Working directory (default: a temporary directory deleted afterwards)
        #[arg(long, value_name = "DIR")]
        work_dir: Option<PathBuf>,
    },

    /// Run an existing xctestrun
    Run {
        /// The xctestrun file
        #[arg(long, value_name = "FILE")]
        xctestrun: PathBuf,
        /// Device or simulator UDID
        #[arg(long, value_name = "ID")]
        device_id: String,
        /// SDK of the device
        #[arg(long, value_name = "SDK", default_value = "iphonesimulator", value_parser = parse_sdk)]
        sdk: Sdk,
        /// JSON file with launch options
        #[arg(long, value_name = "FILE")]
        launch_options: Option<PathBuf>,
        /// Derived data directory for xcodebuild (default: a temporary directory)
        #[arg(long, value_name = "DIR")]
        derived_data: Option<PathBuf>,
    },

    /// Inspect or remove a field of an xctestrun
    Field {
        #[command(subcommand)]
        action: FieldCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum FieldCommand {
    /// Print a field's value as a property list
    Get {
        /// The xctestrun file
        #[arg(long, value_name = "FILE")]
        xctestrun: PathBuf,
        /// Colon-separated field path below the root key
        #[arg(value_name = "FIELD")]
        field: String,
    },
    /// Delete a field
    Delete {
        /// The xctestrun file
        #[arg(long, value_name = "FILE")]
        xctestrun: PathBuf,
        /// Colon-separated field path below the root key
        #[arg(value_name = "FIELD")]
        field: String,
    },
}

fn parse_sdk(value: &str) -> Result<Sdk, String> {
    sdk::from_str(value).ok_or_else(|| format!("unsupported sdk `{value}`; supported: {}", sdk::supported()))
}

fn parse_test_type(value: &str) -> Result<TestType, String> {
    test_type::from_str(value)
        .ok_or_else(|| format!("unsupported test type `{value}`; supported: {}", test_type::supported()))
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Generate { generation, work_dir } => commands::generate(&generation, &work_dir),
        Command::Test {
            generation,
            device_id,
            launch_options,
            work_dir,
        } => commands::test(&generation, &device_id, launch_options.as_deref(), work_dir.as_deref()),
        Command::Run {
            xctestrun,
            device_id,
            sdk,
            launch_options,
            derived_data,
        } => commands::run_xctestrun(
            &xctestrun,
            &device_id,
            sdk,
            launch_options.as_deref(),
            derived_data.as_deref(),
        ),
        Command::Field { action } => match action {
            FieldCommand::Get { xctestrun, field } => commands::field_get(&xctestrun, &field),
            FieldCommand::Delete { xctestrun, field } => commands::field_delete(&xctestrun, &field),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
