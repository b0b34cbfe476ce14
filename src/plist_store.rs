//! Path-addressed access to a property list file on disk.
//!
//! A field path is a list of dictionary keys joined by `:`. Resolution walks the document segment by segment and
//! never creates intermediate dictionaries: writing `A:B:C` requires `A:B` to already be a dictionary.
//!
//! Every mutation is written back to disk immediately and only takes effect in memory once the write succeeded, so
//! the file always reflects the in-memory document.

use std::path::{Path, PathBuf};

use plist::{Dictionary, Value};
use xctestrun_core::FIELD_PATH_SEPARATOR;

use crate::errors::{Result, XctestrunError};

/// A property list whose root is a dictionary.
#[derive(Debug, Clone)]
pub struct PlistDocument {
    path: PathBuf,
    root: Dictionary,
}

impl PlistDocument {
    /// Load the document at `path`. A missing file is an empty dictionary that will be created on first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let root = if path.exists() { read_root(&path)? } else { Dictionary::new() };
        Ok(Self { path, root })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The root dictionary.
    pub fn root(&self) -> &Dictionary {
        &self.root
    }

    /// Re-read the backing file, discarding the in-memory copy.
    pub fn reload(&mut self) -> Result<()> {
        self.root = read_root(&self.path)?;
        Ok(())
    }

    /// Resolve `field` to its value.
    pub fn get(&self, field: &str) -> Result<&Value> {
        let (parents, leaf) = split_field(field);
        let mut dict = &self.root;
        for segment in parents {
            dict = dict
                .get(segment)
                .and_then(Value::as_dictionary)
                .ok_or_else(|| self.not_found(field))?;
        }
        dict.get(leaf).ok_or_else(|| self.not_found(field))
    }

    /// Write `value` at `field`, replacing any existing value, and persist.
    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let (parents, leaf) = split_field(field);
        let mut next = self.root.clone();
        let Some(dict) = walk_mut(&mut next, &parents) else {
            return Err(self.not_found(field));
        };
        dict.insert(leaf.to_string(), value);
        self.commit(next)
    }

    /// Remove `field` and persist.
    pub fn delete(&mut self, field: &str) -> Result<()> {
        let (parents, leaf) = split_field(field);
        let mut next = self.root.clone();
        let removed = walk_mut(&mut next, &parents).and_then(|dict| dict.remove(leaf));
        if removed.is_none() {
            return Err(self.not_found(field));
        }
        self.commit(next)
    }

    /// Persist `next` and adopt it as the document. On error the document is unchanged.
    fn commit(&mut self, next: Dictionary) -> Result<()> {
        let value = Value::Dictionary(next);
        value
            .to_file_xml(&self.path)
            .map_err(|e| XctestrunError::plist(&self.path, e))?;
        if let Value::Dictionary(next) = value {
            self.root = next;
        }
        Ok(())
    }

    fn not_found(&self, field: &str) -> XctestrunError {
        XctestrunError::FieldNotFound {
            field: field.to_string(),
            path: self.path.clone(),
        }
    }
}

fn read_root(path: &Path) -> Result<Dictionary> {
    let value = Value::from_file(path).map_err(|e| XctestrunError::plist(path, e))?;
    value.into_dictionary().ok_or_else(|| XctestrunError::InvalidDocument {
        path: path.to_path_buf(),
        reason: "the root object is not a dictionary".to_string(),
    })
}

fn split_field(field: &str) -> (Vec<&str>, &str) {
    let mut segments: Vec<&str> = field.split(FIELD_PATH_SEPARATOR).collect();
    // `split` always yields at least one segment.
    let leaf = segments.pop().unwrap_or_default();
    (segments, leaf)
}

fn walk_mut<'a>(root: &'a mut Dictionary, segments: &[&str]) -> Option<&'a mut Dictionary> {
    let mut dict = root;
    for segment in segments {
        dict = dict.get_mut(*segment)?.as_dictionary_mut()?;
    }
    Some(dict)
}
