//! Edits to built app bundles.

use std::path::Path;

use plist::Value;
use xctestrun_core::fields;

use crate::errors::{Result, XctestrunError};
use crate::plist_store::PlistDocument;

/// Turn on `UIFileSharingEnabled` in the bundle's `Info.plist`.
///
/// The bundle is not re-signed; on `iphoneos` the caller's signing step must run afterwards.
pub fn enable_ui_file_sharing(bundle: &Path) -> Result<()> {
    let info_plist = bundle.join("Info.plist");
    if !info_plist.is_file() {
        return Err(XctestrunError::Bundle {
            path: bundle.to_path_buf(),
            reason: "Info.plist is missing".to_string(),
        });
    }
    PlistDocument::open(&info_plist)
        .and_then(|mut doc| doc.set(fields::UI_FILE_SHARING_ENABLED, Value::Boolean(true)))
        .map_err(|e| XctestrunError::Bundle {
            path: bundle.to_path_buf(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_ui_file_sharing() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("Runner.app");
        std::fs::create_dir(&app).unwrap();
        let mut info = plist::Dictionary::new();
        info.insert("CFBundleName".to_string(), Value::String("Runner".to_string()));
        Value::Dictionary(info).to_file_xml(app.join("Info.plist")).unwrap();

        enable_ui_file_sharing(&app).unwrap();

        let doc = PlistDocument::open(app.join("Info.plist")).unwrap();
        assert_eq!(doc.get(fields::UI_FILE_SHARING_ENABLED).unwrap(), &Value::Boolean(true));
        assert!(doc.get("CFBundleName").is_ok());
    }

    #[test]
    fn test_missing_info_plist() {
        let dir = tempfile::tempdir().unwrap();
        let err = enable_ui_file_sharing(dir.path()).unwrap_err();
        assert!(matches!(err, XctestrunError::Bundle { .. }));
    }
}
