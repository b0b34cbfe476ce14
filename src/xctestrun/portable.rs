//! Path portability pass over a finished xctestrun document.
//!
//! This is a blind text substitution over the serialized file: every literal occurrence of the absolute `TEST_ROOT`
//! path becomes `__TESTROOT__`, which `xcodebuild` expands relative to the document's location. It must run after
//! every path-bearing field has been written.
//!
//! Known limitation: the substitution does not parse the document, so a field whose value happens to contain the
//! `TEST_ROOT` path outside of a path context is rewritten as well.

use std::fs;
use std::path::Path;

use tracing::debug;
use xctestrun_core::TESTROOT_RELATIVE_PATH;

use crate::errors::{IoResultExt, Result};

/// Replace `test_root` with the portable placeholder throughout the file at `document`.
///
/// ## Returns
/// - The number of occurrences replaced.
pub fn rewrite_test_root(document: &Path, test_root: &Path) -> Result<usize> {
    let content = fs::read_to_string(document).with_path(document)?;
    let absolute = test_root.to_string_lossy();
    let count = content.matches(absolute.as_ref()).count();
    if count == 0 {
        return Ok(0);
    }
    fs::write(document, content.replace(absolute.as_ref(), TESTROOT_RELATIVE_PATH)).with_path(document)?;
    debug!("Replaced {count} occurrence(s) of {} in {}", test_root.display(), document.display());
    Ok(count)
}
