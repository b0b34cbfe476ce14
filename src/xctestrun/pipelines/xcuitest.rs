//! UI test pipeline: an XCTRunner app hosts the test bundle and drives the app under test.
//!
//! The runner app produced by the harness build carries a stub test bundle in `PlugIns` holding only `Info.plist`
//! and `_CodeSignature`. It is replaced by the real, prebuilt test bundle.

use std::path::PathBuf;

use tracing::{info, warn};
use xctestrun_core::fields;

use super::{Pipeline, PipelineContext, install_plugin, recreate_dir};
use crate::errors::Result;
use crate::fsutil;
use crate::toolchain::bundle;
use crate::xctestrun::XctestRun;
use crate::xctestrun::store::path_value;

pub struct XcuitestPipeline;

impl Pipeline for XcuitestPipeline {
    fn run(&self, ctx: &PipelineContext<'_>) -> Result<XctestRun> {
        let app = ctx.require_app_under_test()?;
        ctx.build_harness()?;

        let runner = fsutil::move_and_replace(&find_runner_app(ctx)?, ctx.test_root)?;
        info!("XCTRunner app relocated to {}", runner.display());
        if ctx.signing_options.xctrunner_app_enable_ui_file_sharing {
            if let Err(e) = bundle::enable_ui_file_sharing(&runner) {
                warn!("{e}");
            }
        }

        let plugins_dir = runner.join("PlugIns");
        recreate_dir(&plugins_dir)?;
        let test_bundle = install_plugin(ctx.test_bundle, &plugins_dir)?;

        let path = ctx.harvest_xctestrun()?;
        let mut run = XctestRun::open(&path, Some(ctx.test_type))?;
        run.set_field(fields::TEST_HOST_PATH, path_value(&runner))?;
        run.set_field(fields::UI_TARGET_APP_PATH, path_value(app))?;
        run.set_field(fields::TEST_BUNDLE_PATH, path_value(&test_bundle))?;
        match run.delete_field(fields::IDE_IPHONE_INTERNAL_TEST_BUNDLE_NAME) {
            Err(e) if !e.is_field_not_found() => return Err(e),
            _ => {}
        }
        Ok(run)
    }
}

/// The single `Debug-*/*-Runner.app` in the harness build products.
fn find_runner_app(ctx: &PipelineContext<'_>) -> Result<PathBuf> {
    let products = ctx.build_products_dir();
    let mut runners = Vec::new();
    for config_dir in fsutil::children_matching(&products, |name| name.starts_with("Debug-"))? {
        if config_dir.is_dir() {
            runners.extend(fsutil::children_matching(&config_dir, |name| name.ends_with("-Runner.app"))?);
        }
    }
    fsutil::exactly_one(runners, "XCTRunner app", &products)
}
