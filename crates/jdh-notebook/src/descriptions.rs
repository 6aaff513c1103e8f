//! Source description files
//!
//! A source description file is a JSON array that a human curates between the
//! scan and annotate steps. Scanning produces stubs:
//!
//! ```json
//! [{"cell_index": 4, "tag": "figure-tools-1", "source": []}]
//! ```
//!
//! which are completed into records the annotator consumes:
//!
//! ```json
//! [{"tag": "figure-tools-*", "source": ["Frequency of 'tool'."], "type": "image"}]
//! ```

use crate::error::{NotebookError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One curated caption/citation payload, or a scanner stub awaiting one
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceDescription {
    /// Index of the cell the stub was produced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_index: Option<usize>,
    /// Tag, optionally with `*` wildcards
    pub tag: String,
    /// Caption / citation lines
    #[serde(default)]
    pub source: Vec<String>,
    /// Object kind written to `jdh.object.type`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SourceDescription {
    /// Stub for a cell that still needs a source
    #[must_use]
    pub fn stub(cell_index: usize, tag: impl Into<String>) -> Self {
        Self {
            cell_index: Some(cell_index),
            tag: tag.into(),
            source: Vec::new(),
            kind: None,
        }
    }

    /// Record with a source and no type
    #[must_use]
    pub fn new(tag: impl Into<String>, source: Vec<String>) -> Self {
        Self {
            cell_index: None,
            tag: tag.into(),
            source,
            kind: None,
        }
    }

    /// Set the object type
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// True while nobody has filled in a source or type
    #[inline]
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.source.is_empty() && self.kind.is_none()
    }
}

/// Load source descriptions from a JSON file
///
/// # Errors
///
/// Returns `NotebookError::NotFound` if the file is absent and a JSON error if
/// it is not an array of records.
pub fn load_source_descriptions<P: AsRef<Path>>(path: P) -> Result<Vec<SourceDescription>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| NotebookError::io(path, e))?;
    let records: Vec<SourceDescription> = serde_json::from_str(&content)?;
    log::debug!(
        "Loaded {} source descriptions from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Save source descriptions as pretty JSON (four-space indent)
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn save_source_descriptions<P: AsRef<Path>>(
    path: P,
    records: &[SourceDescription],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| NotebookError::io(parent, e))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;

    fs::write(path, buf).map_err(|e| NotebookError::io(path, e))?;
    log::info!(
        "Saved {} source descriptions to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
