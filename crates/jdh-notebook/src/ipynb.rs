use crate::error::{NotebookError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Notebook format major version this crate reads and writes
pub const SUPPORTED_NBFORMAT: u32 = 4;

/// A Jupyter notebook (nbformat 4.x)
///
/// Only the parts this crate edits are typed. Everything else is kept in
/// `extra` maps and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Format major version
    pub nbformat: u32,
    /// Format minor version
    pub nbformat_minor: u32,
    /// Notebook-level metadata (kernelspec, language info, authors, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Cells in document order
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Unrecognized top-level keys
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Individual notebook cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Type of cell (code, markdown, raw)
    pub cell_type: CellType,
    /// Cell source content, joined into a single string
    #[serde(
        default,
        deserialize_with = "deserialize_text",
        serialize_with = "serialize_lines"
    )]
    pub source: String,
    /// Cell metadata
    #[serde(default)]
    pub metadata: CellMetadata,
    /// `id`, `outputs`, `execution_count`, `attachments` and anything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    /// Tags attached to this cell, empty when the cell has none
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.metadata.tags.as_deref().unwrap_or_default()
    }
}

/// Type of notebook cell
///
/// Cell types outside the nbformat 4 set are kept as [`CellType::Other`] and
/// written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    /// Executable code cell
    #[default]
    Code,
    /// Markdown documentation cell
    Markdown,
    /// Raw text cell (no formatting)
    Raw,
    /// Any other `cell_type` value, e.g. the nbformat 3 `heading`
    Other(String),
}

impl CellType {
    /// Value stored in the `cell_type` field
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Raw => "raw",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for CellType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "code" => Self::Code,
            "markdown" => Self::Markdown,
            "raw" => Self::Raw,
            _ => Self::Other(value),
        }
    }
}

impl Serialize for CellType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CellType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl std::fmt::Display for CellType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CellType {
    type Err = std::convert::Infallible;

    /// Lenient parse for user input: case-insensitive, `md` means markdown
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Ok(match lower.as_str() {
            "md" => Self::Markdown,
            "code" | "markdown" | "raw" => Self::from(lower),
            _ => Self::Other(s.to_string()),
        })
    }
}

/// Cell metadata: `tags` and `jdh` are typed, the rest is passed through
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMetadata {
    /// Ordered cell tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Journal annotation namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jdh: Option<JdhAnnotation>,
    /// Other metadata keys (`collapsed`, `jupyter`, `scrolled`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content of `metadata.jdh`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdhAnnotation {
    /// Rendering module, `"object"` for typed figures and tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Citation payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<JdhObject>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content of `metadata.jdh.object`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JdhObject {
    /// Caption / citation lines
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub source: Vec<String>,
    /// Object kind, e.g. `"image"` or `"table"`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// nbformat allows multiline strings either as one string or a list of lines
#[derive(Deserialize)]
#[serde(untagged)]
enum MultilineText {
    Text(String),
    Lines(Vec<String>),
}

fn deserialize_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(match MultilineText::deserialize(deserializer)? {
        MultilineText::Text(text) => text,
        MultilineText::Lines(lines) => lines.concat(),
    })
}

fn deserialize_lines<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match MultilineText::deserialize(deserializer)? {
        MultilineText::Text(text) => vec![text],
        MultilineText::Lines(lines) => lines,
    })
}

// Jupyter stores sources split after every newline.
fn serialize_lines<S: Serializer>(
    text: &str,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(text.split_inclusive('\n'))
}

/// Read a notebook from a file path
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist (`NotebookError::NotFound`) or cannot be read
/// - The notebook JSON is malformed or does not follow the cell schema
/// - The notebook is not nbformat 4
pub fn read_notebook<P: AsRef<Path>>(path: P) -> Result<Notebook> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| NotebookError::io(path, e))?;
    log::debug!("Read notebook {} ({} bytes)", path.display(), content.len());
    parse_notebook_from_str(&content)
}

/// Parse a notebook from a string
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the format version is not 4.x.
pub fn parse_notebook_from_str(content: &str) -> Result<Notebook> {
    let notebook: Notebook = serde_json::from_str(content)?;

    if notebook.nbformat != SUPPORTED_NBFORMAT {
        return Err(NotebookError::UnsupportedVersion {
            major: notebook.nbformat,
            minor: notebook.nbformat_minor,
        });
    }

    Ok(notebook)
}

/// Serialize a notebook the way Jupyter saves it: sorted keys, one-space
/// indentation, trailing newline
///
/// # Errors
///
/// Returns an error if a metadata value cannot be serialized.
pub fn notebook_to_string(notebook: &Notebook) -> Result<String> {
    // serde_json::Map is a BTreeMap here, so converting to a Value sorts every object.
    let value = serde_json::to_value(notebook)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');

    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a notebook back to disk, overwriting the file
///
/// # Errors
///
/// Returns an error if serialization or the write fails. The write is not
/// atomic.
pub fn write_notebook<P: AsRef<Path>>(path: P, notebook: &Notebook) -> Result<()> {
    let path = path.as_ref();
    let content = notebook_to_string(notebook)?;
    fs::write(path, content).map_err(|e| NotebookError::io(path, e))?;
    log::info!(
        "Wrote notebook {} ({} cells)",
        path.display(),
        notebook.cells.len()
    );
    Ok(())
}
