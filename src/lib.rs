#![forbid(unsafe_code)]
//! Generate, inspect, and patch `xctestrun` documents, and run prebuilt iOS tests with them.
//!
//! An xctestrun is the property list `xcodebuild test-without-building` consumes to run a precompiled test bundle
//! against a precompiled app. This crate provides:
//!
//! - [`XctestRun`]: field access and launch-option patching over one document, plus test execution.
//! - [`XctestRunFactory`]: generation of a document for a UI test, unit test, or logic test from prebuilt bundles,
//!   relocating every artifact into a portable `TEST_ROOT` directory.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fsutil;
pub mod plist_store;
pub mod toolchain;
pub mod xctestrun;

pub use config::{FactoryOptions, LaunchOptions, SigningOptions};
pub use errors::{Result, XctestrunError};
pub use xctestrun::{WorkDir, XctestRun, XctestRunFactory};
pub use xctestrun_core::{RunnerExitCode, Sdk, TestType};
