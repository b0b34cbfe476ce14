//! SDK vocabulary registry.
//!
//! The SDK decides which destination a test bundle targets. Signing options only apply to [`Sdk::IphoneOs`], and
//! logic tests can only run on [`Sdk::IphoneSimulator`].

use std::fmt;

use crate::registry::{self, VocabInfo};

/// Stable identifier for supported SDKs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sdk {
    #[default]
    IphoneSimulator,
    IphoneOs,
}

/// Metadata entry for an SDK.
pub type SdkInfo = VocabInfo<Sdk>;

/// Registry of supported SDKs.
pub const SDKS: &[SdkInfo] = &[
    VocabInfo {
        id: Sdk::IphoneSimulator,
        canonical: "iphonesimulator",
        aliases: &[],
        description: "iOS simulator",
    },
    VocabInfo {
        id: Sdk::IphoneOs,
        canonical: "iphoneos",
        aliases: &[],
        description: "Physical iOS device",
    },
];

/// Resolve an SDK name to its stable id.
pub fn from_str(name: &str) -> Option<Sdk> {
    registry::lookup(SDKS, name)
}

/// Return the canonical spelling for an SDK.
pub fn as_str(id: Sdk) -> &'static str {
    registry::find(SDKS, id).map_or("unknown", |i| i.canonical)
}

/// Comma-separated canonical spellings, for diagnostics.
pub fn supported() -> String {
    registry::canonical_list(SDKS)
}

impl fmt::Display for Sdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(as_str(*self))
    }
}
