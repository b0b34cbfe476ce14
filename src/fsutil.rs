//! Filesystem helpers for relocating bundles and scanning build products.
//!
//! Bundles (`.app`, `.xctest`) are directories. A bundle passed in by the caller may be a symbolic link; moving it
//! moves the link, copying it copies the link target's contents.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{IoResultExt, Result, XctestrunError};

/// Final path component of `path`.
pub fn file_name(path: &Path) -> Result<&OsStr> {
    path.file_name()
        .ok_or_else(|| XctestrunError::IllegalArgument(format!("{} has no file name", path.display())))
}

/// Whether `path` itself is a symbolic link.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Remove a file, symlink, or directory tree.
pub fn remove_entry(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path).with_path(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).with_path(path)
    } else {
        fs::remove_file(path).with_path(path)
    }
}

/// Move `src` into `target_parent`, replacing an entry of the same name.
///
/// ## Returns
/// - The new location, `target_parent/<file name of src>`.
///
/// ## Notes
/// - Moving an entry onto itself leaves it in place.
pub fn move_and_replace(src: &Path, target_parent: &Path) -> Result<PathBuf> {
    let dest = target_parent.join(file_name(src)?);
    move_entry(src, &dest)?;
    Ok(dest)
}

/// Move `src` to exactly `dest`, replacing whatever is there.
///
/// Falls back to copy-then-delete when the two paths are on different filesystems.
pub fn move_entry(src: &Path, dest: &Path) -> Result<()> {
    if dest == src {
        return Ok(());
    }
    if entry_exists(dest) {
        debug!("Replacing existing {}", dest.display());
        remove_entry(dest)?;
    }
    debug!("Moving {} to {}", src.display(), dest.display());
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_entry(src, dest)?;
            remove_entry(src)
        }
        Err(e) => Err(XctestrunError::io(src, e)),
    }
}

/// Copy a file or directory tree, following symbolic links.
pub fn copy_entry(src: &Path, dest: &Path) -> Result<()> {
    let meta = fs::metadata(src).with_path(src)?;
    if meta.is_dir() {
        copy_dir_all(src, dest)
    } else {
        fs::copy(src, dest).with_path(src).map(|_| ())
    }
}

/// Recursively copy the directory `src` to `dest`, following symbolic links.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_path(dest)?;
    for entry in fs::read_dir(src).with_path(src)? {
        let entry = entry.with_path(src)?;
        let from = entry.path();
        let to = dest.join(entry.file_name());
        copy_entry(&from, &to)?;
    }
    Ok(())
}

/// Sorted children of `dir` whose file name satisfies `matches`. A missing directory has no children.
pub fn children_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(XctestrunError::io(dir, e)),
    };
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.with_path(dir)?;
        if entry.file_name().to_str().is_some_and(&matches) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// The single element of `candidates`.
///
/// ## Errors
/// - `Generation` when there are none or more than one; `what` names the artifact in the message.
pub fn exactly_one(candidates: Vec<PathBuf>, what: &str, searched: &Path) -> Result<PathBuf> {
    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(XctestrunError::Generation(format!(
            "no generated {what} was found in the harness project's build products dir {}",
            searched.display()
        ))),
        (Some(_), Some(_)) => Err(XctestrunError::Generation(format!(
            "more than one generated {what} was found in the harness project's build products dir {}",
            searched.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bundle(parent: &Path, name: &str) -> PathBuf {
        let bundle = parent.join(name);
        fs::create_dir_all(bundle.join("Contents")).unwrap();
        fs::write(bundle.join("Contents/binary"), name).unwrap();
        bundle
    }

    #[test]
    fn test_move_and_replace_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = make_bundle(&dir.path().join("in"), "A.app");
        let target = dir.path().join("out");
        let stale = make_bundle(&target, "A.app");
        fs::write(stale.join("stale"), "x").unwrap();

        let moved = move_and_replace(&src, &target).unwrap();

        assert_eq!(moved, target.join("A.app"));
        assert!(!src.exists());
        assert!(moved.join("Contents/binary").exists());
        assert!(!moved.join("stale").exists());
    }

    #[test]
    fn test_move_onto_itself_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let src = make_bundle(dir.path(), "A.app");
        let moved = move_and_replace(&src, dir.path()).unwrap();
        assert_eq!(moved, src);
        assert!(src.join("Contents/binary").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = make_bundle(dir.path(), "Real.xctest");
        let link = dir.path().join("Link.xctest");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(is_symlink(&link));

        let copy = dir.path().join("Copy.xctest");
        copy_entry(&link, &copy).unwrap();

        assert!(!is_symlink(&copy));
        assert_eq!(fs::read_to_string(copy.join("Contents/binary")).unwrap(), "Real.xctest");
    }

    #[test]
    fn test_children_matching_sorted_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.xctestrun"), "").unwrap();
        fs::write(dir.path().join("a.xctestrun"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let found = children_matching(dir.path(), |n| n.ends_with(".xctestrun")).unwrap();
        assert_eq!(found, vec![dir.path().join("a.xctestrun"), dir.path().join("b.xctestrun")]);
        assert!(children_matching(&dir.path().join("nope"), |_| true).unwrap().is_empty());
    }

    #[test]
    fn test_exactly_one() {
        let here = Path::new("/products");
        assert!(exactly_one(vec![PathBuf::from("/a")], "x", here).is_ok());
        assert!(matches!(
            exactly_one(vec![], "x", here),
            Err(XctestrunError::Generation(_))
        ));
        assert!(matches!(
            exactly_one(vec![PathBuf::from("/a"), PathBuf::from("/b")], "x", here),
            Err(XctestrunError::Generation(_))
        ));
    }
}
