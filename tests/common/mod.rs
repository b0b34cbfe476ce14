//! Fixtures shared by the integration tests: prebuilt bundles on disk and fakes for the Xcode toolchain.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use plist::{Dictionary, Value};
use xctestrun::errors::Result;
use xctestrun::toolchain::{HarnessBuilder, HarnessRequest, Toolchain};
use xctestrun::{Sdk, TestType};

pub const PLATFORM_PATH: &str = "/Applications/Xcode.app/Contents/Developer/Platforms/iPhoneSimulator.platform";

/// Toolchain answering every SDK with a fixed platform directory.
pub struct FakeToolchain;

impl Toolchain for FakeToolchain {
    fn sdk_platform_path(&self, _sdk: Sdk) -> Result<PathBuf> {
        Ok(PathBuf::from(PLATFORM_PATH))
    }
}

/// What a fake harness build was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBuild {
    pub sdk: Sdk,
    pub test_type: TestType,
    pub provisioning_profile: Option<String>,
}

/// Harness builder that writes the artifacts `xcodebuild build-for-testing` would leave in the build products.
#[derive(Clone)]
pub struct FakeHarness {
    pub xctestrun_files: usize,
    pub runner_apps: usize,
    pub builds: Rc<RefCell<Vec<RecordedBuild>>>,
}

impl FakeHarness {
    pub fn new() -> Self {
        Self {
            xctestrun_files: 1,
            runner_apps: 1,
            builds: Rc::default(),
        }
    }

    pub fn with_xctestrun_files(mut self, count: usize) -> Self {
        self.xctestrun_files = count;
        self
    }

    pub fn with_runner_apps(mut self, count: usize) -> Self {
        self.runner_apps = count;
        self
    }
}

impl HarnessBuilder for FakeHarness {
    fn build_for_testing(&self, request: &HarnessRequest<'_>) -> Result<()> {
        self.builds.borrow_mut().push(RecordedBuild {
            sdk: request.sdk,
            test_type: request.test_type,
            provisioning_profile: request.runner_provisioning_profile.map(str::to_string),
        });

        let products = request.derived_data_dir.join("Build").join("Products");
        fs::create_dir_all(&products).unwrap();
        let name = bundle_stem(request.test_bundle);
        let built = request.built_products_dir;

        for i in 0..self.xctestrun_files {
            let mut testing_env = Dictionary::new();
            testing_env.insert(
                "IDEiPhoneInternalTestBundleName".to_string(),
                Value::String(format!("{name}.xctest")),
            );
            let mut fields = Dictionary::new();
            fields.insert(
                "TestBundlePath".to_string(),
                Value::String(format!("__TESTHOST__/PlugIns/{name}.xctest")),
            );
            fields.insert(
                "TestHostPath".to_string(),
                Value::String(built.join("App.app").to_string_lossy().into_owned()),
            );
            fields.insert(
                "DependentProductPaths".to_string(),
                Value::Array(vec![Value::String(built.join("App.app").to_string_lossy().into_owned())]),
            );
            fields.insert("TestingEnvironmentVariables".to_string(), Value::Dictionary(testing_env));
            let mut root = Dictionary::new();
            root.insert(name.clone(), Value::Dictionary(fields));
            let file = products.join(format!("TestProject_{}_{i}.xctestrun", request.sdk));
            Value::Dictionary(root).to_file_xml(file).unwrap();
        }

        if request.test_type == TestType::XcUiTest {
            let config_dir = products.join(format!("Debug-{}", request.sdk));
            for i in 0..self.runner_apps {
                let runner_name = if i == 0 { format!("{name}-Runner.app") } else { format!("Extra{i}-Runner.app") };
                let runner = config_dir.join(runner_name);
                write_info_plist(&runner, "XCTRunner");
                // Stub plugin the pipeline must replace with the real bundle.
                write_info_plist(&runner.join("PlugIns").join(format!("{name}.xctest")), "stub");
            }
        }
        Ok(())
    }
}

/// Create a bundle directory with an `Info.plist`.
pub fn write_info_plist(bundle: &Path, bundle_name: &str) {
    fs::create_dir_all(bundle).unwrap();
    let mut info = Dictionary::new();
    info.insert("CFBundleName".to_string(), Value::String(bundle_name.to_string()));
    Value::Dictionary(info).to_file_xml(bundle.join("Info.plist")).unwrap();
}

/// Create a prebuilt app bundle.
pub fn make_app(parent: &Path, name: &str) -> PathBuf {
    let app = parent.join(name);
    write_info_plist(&app, &bundle_stem(&app));
    app
}

/// Create a prebuilt test bundle holding only its binary, so it can be told apart from the harness stub.
pub fn make_test_bundle(parent: &Path, name: &str) -> PathBuf {
    let bundle = parent.join(name);
    fs::create_dir_all(&bundle).unwrap();
    fs::write(bundle.join(bundle_stem(&bundle)), "real test binary").unwrap();
    bundle
}

pub fn bundle_stem(bundle: &Path) -> String {
    bundle.file_stem().unwrap().to_string_lossy().into_owned()
}

/// Every entry below `root`, as sorted `/`-joined relative paths.
pub fn layout(root: &Path) -> String {
    fn walk(dir: &Path, prefix: &str, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().into_owned();
            let rel = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };
            let path = entry.path();
            out.push(rel.clone());
            if path.is_dir() && !entry.file_type().unwrap().is_symlink() {
                walk(&path, &rel, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, "", &mut out);
    out.sort();
    out.join("\n")
}
