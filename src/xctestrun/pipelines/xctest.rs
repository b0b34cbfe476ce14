//! Unit test pipeline: the test bundle is hosted by the app under test.

use tracing::info;
use xctestrun_core::fields;

use super::{Pipeline, PipelineContext, install_plugin};
use crate::errors::{IoResultExt, Result};
use crate::xctestrun::XctestRun;
use crate::xctestrun::store::path_value;

pub struct XctestPipeline;

impl Pipeline for XctestPipeline {
    fn run(&self, ctx: &PipelineContext<'_>) -> Result<XctestRun> {
        let app = ctx.require_app_under_test()?;
        ctx.build_harness()?;

        let plugins_dir = app.join("PlugIns");
        std::fs::create_dir_all(&plugins_dir).with_path(&plugins_dir)?;
        let test_bundle = install_plugin(ctx.test_bundle, &plugins_dir)?;
        info!("Test bundle installed at {}", test_bundle.display());

        let path = ctx.harvest_xctestrun()?;
        let mut run = XctestRun::open(&path, Some(ctx.test_type))?;
        run.set_field(fields::TEST_BUNDLE_PATH, path_value(&test_bundle))?;
        Ok(run)
    }
}
