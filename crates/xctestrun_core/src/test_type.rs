//! Test type vocabulary registry.
//!
//! The test type decides which fields of the document are mandatory, which harness the generator builds, and which
//! generation pipeline runs. The three types are mutually exclusive.

use std::fmt;

use crate::registry::{self, VocabInfo};

/// Stable identifier for supported test types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestType {
    /// UI test driven by a separate runner app through XCUITest.
    #[default]
    XcUiTest,
    /// Test bundle hosted inside the app under test.
    XcTest,
    /// Test bundle hosted by the SDK's standalone `xctest` tool, with no app under test.
    LogicTest,
}

/// Metadata entry for a test type.
pub type TestTypeInfo = VocabInfo<TestType>;

/// Registry of supported test types.
pub const TEST_TYPES: &[TestTypeInfo] = &[
    VocabInfo {
        id: TestType::XcUiTest,
        canonical: "xcuitest",
        aliases: &["ui_test"],
        description: "UI test run by an XCTRunner app against the app under test",
    },
    VocabInfo {
        id: TestType::XcTest,
        canonical: "xctest",
        aliases: &["unit_test"],
        description: "Test bundle injected into the app under test",
    },
    VocabInfo {
        id: TestType::LogicTest,
        canonical: "logic_test",
        aliases: &[],
        description: "Test bundle run by the SDK's xctest tool without an app",
    },
];

/// Resolve a test type name to its stable id.
pub fn from_str(name: &str) -> Option<TestType> {
    registry::lookup(TEST_TYPES, name)
}

/// Return the canonical spelling for a test type.
pub fn as_str(id: TestType) -> &'static str {
    registry::find(TEST_TYPES, id).map_or("unknown", |i| i.canonical)
}

/// Comma-separated canonical spellings, for diagnostics.
pub fn supported() -> String {
    registry::canonical_list(TEST_TYPES)
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(as_str(*self))
    }
}
