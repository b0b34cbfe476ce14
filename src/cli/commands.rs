//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::{self, FactoryOptions, LaunchOptions, SigningOptions};
use crate::errors::XctestrunError;
use crate::toolchain::{Toolchain, XcodebuildHarness, Xcrun};
use crate::xctestrun::{XctestRun, XctestRunFactory};

use super::{CliError, CliResult, ExitCode, GenerationArgs};

/// Directory under the working directory that `test` passes to xcodebuild as derived data.
const TEST_DERIVED_DATA_DIR: &str = "test_derived_data";

/// Build a factory from command-line inputs.
///
/// The harness builder is attached only when a template is found; generation of UI and unit tests without one fails
/// before anything is moved.
fn build_factory(args: &GenerationArgs, work_dir: Option<&Path>) -> CliResult<XctestRunFactory> {
    let signing_options: SigningOptions = match &args.signing_options {
        Some(path) => config::load_json(path)?,
        None => SigningOptions::default(),
    };
    let mut options = FactoryOptions::new(&args.test_bundle)
        .with_sdk(args.sdk)
        .with_test_type(args.test_type)
        .with_signing_options(signing_options);
    if let Some(app) = &args.app_under_test {
        options = options.with_app_under_test(app);
    }
    if let Some(dir) = work_dir {
        options = options.with_work_dir(dir);
    }

    let factory = XctestRunFactory::new(options)?;
    Ok(match config::find_harness_template(args.harness_template.as_deref()) {
        Some(template) => {
            info!("Using harness project template {}", template.display());
            factory.with_harness(XcodebuildHarness::new(template))
        }
        None => factory,
    })
}

fn load_launch_options(path: Option<&Path>) -> CliResult<LaunchOptions> {
    match path {
        Some(path) => Ok(config::load_json(path)?),
        None => Ok(LaunchOptions::default()),
    }
}

/// Generate an xctestrun into `work_dir` and print its path.
pub fn generate(args: &GenerationArgs, work_dir: &Path) -> CliResult<ExitCode> {
    let mut factory = build_factory(args, Some(work_dir))?;
    let run = factory.generate()?;
    println!("{}", run.path().display());
    Ok(ExitCode::SUCCESS)
}

/// Generate, patch, and run; the process exits with the runner exit code.
pub fn test(
    args: &GenerationArgs,
    device_id: &str,
    launch_options: Option<&Path>,
    work_dir: Option<&Path>,
) -> CliResult<ExitCode> {
    let launch_options = load_launch_options(launch_options)?;
    let mut factory = build_factory(args, work_dir)?;

    let result = run_generated(&mut factory, args, device_id, &launch_options);
    if let Err(e) = factory.close() {
        warn!("Failed to delete working directory: {e}");
    }
    let exit_code = result?;
    info!("Test result: {exit_code}");
    Ok(ExitCode(exit_code.code()))
}

fn run_generated(
    factory: &mut XctestRunFactory,
    args: &GenerationArgs,
    device_id: &str,
    launch_options: &LaunchOptions,
) -> CliResult<crate::RunnerExitCode> {
    let derived_data = factory.prepare_work_dir()?.join(TEST_DERIVED_DATA_DIR);
    let cache_root = test_cache_root(args.sdk);
    let run = factory.generate()?;
    run.apply_launch_options(launch_options)?;
    Ok(run.execute(device_id, args.sdk, &derived_data, cache_root.as_deref())?)
}

/// Xcode's device app cache, looked up only for device runs. A failed lookup skips the cache cleanup.
fn test_cache_root(sdk: crate::Sdk) -> Option<PathBuf> {
    if sdk != crate::Sdk::IphoneOs {
        return None;
    }
    match Xcrun.test_cache_root() {
        Ok(root) => root,
        Err(e) => {
            warn!("Not cleaning the device app cache: {e}");
            None
        }
    }
}

/// Run an existing xctestrun; the process exits with the runner exit code.
pub fn run_xctestrun(
    xctestrun: &Path,
    device_id: &str,
    sdk: crate::Sdk,
    launch_options: Option<&Path>,
    derived_data: Option<&Path>,
) -> CliResult<ExitCode> {
    let launch_options = load_launch_options(launch_options)?;
    let mut run = XctestRun::open(xctestrun, None)?;
    run.apply_launch_options(&launch_options)?;

    let cache_root = test_cache_root(sdk);
    let exit_code = match derived_data {
        Some(dir) => run.execute(device_id, sdk, dir, cache_root.as_deref())?,
        None => {
            let temp = tempfile::tempdir().map_err(|e| XctestrunError::io(std::env::temp_dir(), e))?;
            run.execute(device_id, sdk, temp.path(), cache_root.as_deref())?
        }
    };
    info!("Test result: {exit_code}");
    Ok(ExitCode(exit_code.code()))
}

/// Print one field as an XML property list.
pub fn field_get(xctestrun: &Path, field: &str) -> CliResult<ExitCode> {
    let run = XctestRun::open(xctestrun, None)?;
    let value = run.field(field)?;
    let mut out = io::stdout().lock();
    value
        .to_writer_xml(&mut out)
        .map_err(|e| XctestrunError::plist(xctestrun, e))?;
    writeln!(out).map_err(|e| CliError::failure(format!("Error writing to stdout: {e}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Delete one field and save the document.
pub fn field_delete(xctestrun: &Path, field: &str) -> CliResult<ExitCode> {
    let mut run = XctestRun::open(xctestrun, None)?;
    run.delete_field(field)?;
    info!("Deleted {field} from {}", xctestrun.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use plist::{Dictionary, Value};

    use super::*;

    fn write_document(path: &Path) {
        let mut fields = Dictionary::new();
        fields.insert("TestBundlePath".to_string(), Value::String("__TESTROOT__/A.xctest".to_string()));
        let mut root = Dictionary::new();
        root.insert("A".to_string(), Value::Dictionary(fields));
        Value::Dictionary(root).to_file_xml(path).unwrap();
    }

    #[test]
    fn test_field_delete_then_get_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xctestrun");
        write_document(&path);

        assert_eq!(field_get(&path, "TestBundlePath").unwrap(), ExitCode::SUCCESS);
        assert_eq!(field_delete(&path, "TestBundlePath").unwrap(), ExitCode::SUCCESS);
        let err = field_get(&path, "TestBundlePath").unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("TestBundlePath"));
    }

    #[test]
    fn test_simulator_runs_skip_device_cache_lookup() {
        assert_eq!(test_cache_root(crate::Sdk::IphoneSimulator), None);
    }

    #[test]
    fn test_missing_launch_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_launch_options(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("missing.json"));
    }
}
