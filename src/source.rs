// Document sources: literal strings, single files, and directory trees.
//
// Sources only produce raw text plus a name (and, for directory trees, a
// label). Everything after loading belongs to the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name given to documents added as literal strings.
pub const LITERAL_SOURCE_ID: &str = "added_document";

/// Raw text waiting to go through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub content: String,
    pub source_id: String,
    pub label: Option<String>,
}

impl RawDocument {
    /// A document given directly as a string.
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_id: LITERAL_SOURCE_ID.to_string(),
            label: None,
        }
    }

    /// Load a single file. Bytes that aren't valid UTF-8 are replaced.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| Error::Source {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            content: String::from_utf8_lossy(&bytes).into_owned(),
            source_id: path.display().to_string(),
            label: None,
        })
    }
}

/// Load every file under `root`, recursively, in sorted path order.
///
/// Each document is named by its path relative to `root`, and labelled with
/// the first sub-directory it sits under (`root/sports/a.txt` -> `sports`).
/// Files directly in `root` are unlabelled. Hidden entries are skipped.
/// A file that can't be read is logged and skipped; only a failure to list
/// `root` itself is an error.
pub fn load_directory(root: impl AsRef<Path>) -> Result<Vec<RawDocument>> {
    let root = root.as_ref();
    let mut files = Vec::new();
    collect_files(root, &mut files).map_err(|source| Error::Source {
        path: root.to_path_buf(),
        source,
    })?;
    files.sort();

    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        match RawDocument::from_file(&path) {
            Ok(mut doc) => {
                let relative = path.strip_prefix(root).unwrap_or(&path);
                doc.source_id = relative.display().to_string();
                doc.label = directory_label(relative);
                documents.push(doc);
            }
            Err(e) => warn!(error = %e, "Skipping unreadable document"),
        }
    }

    debug!(root = %root.display(), count = documents.len(), "Loaded directory");
    Ok(documents)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn directory_label(relative: &Path) -> Option<String> {
    let mut components = relative.components();
    let first = components.next()?;
    // A bare file name has no directory to label it with
    components.next()?;
    Some(first.as_os_str().to_string_lossy().into_owned())
}
