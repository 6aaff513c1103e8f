//! Figure / table / cover cell discovery
//!
//! Produces the stub list a human completes into source descriptions.

use crate::descriptions::{load_source_descriptions, save_source_descriptions, SourceDescription};
use crate::error::Result;
use crate::ipynb::{read_notebook, Notebook};
use std::path::Path;

/// Tag substrings that mark a cell as needing a citation
pub const DEFAULT_KEYWORDS: [&str; 3] = ["figure", "table", "cover"];

/// Options for [`find_figure_cells`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanOptions {
    /// Case-sensitive substrings looked for in every tag
    pub keywords: Vec<String>,
    /// Rescan even when the output file already exists
    pub force_rescan: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect(),
            force_rescan: false,
        }
    }
}

/// Result of [`find_figure_cells`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanOutcome {
    /// Stubs found, or the records loaded from the existing output file
    pub records: Vec<SourceDescription>,
    /// True when the output file was reused instead of rescanning
    pub reused_cache: bool,
}

/// One stub per (cell, tag) whose tag contains any keyword, in document order
#[must_use]
pub fn scan_figure_cells<S: AsRef<str>>(
    notebook: &Notebook,
    keywords: &[S],
) -> Vec<SourceDescription> {
    let mut stubs = Vec::new();

    for (cell_index, cell) in notebook.cells.iter().enumerate() {
        for tag in cell.tags() {
            if keywords.iter().any(|keyword| tag.contains(keyword.as_ref())) {
                log::debug!("Cell {cell_index} tagged '{tag}' needs a source");
                stubs.push(SourceDescription::stub(cell_index, tag.as_str()));
            }
        }
    }

    stubs
}

/// Find cells that need a source and persist the stub list
///
/// An existing `output_path` is treated as the authoritative, hand-edited list
/// and returned as-is unless `options.force_rescan` is set. Otherwise the
/// notebook is scanned and the stubs are written to `output_path`.
///
/// # Errors
///
/// Returns an error if the existing list or the notebook cannot be read, or
/// the stub list cannot be written.
pub fn find_figure_cells<P: AsRef<Path>, Q: AsRef<Path>>(
    notebook_path: P,
    output_path: Q,
    options: &ScanOptions,
) -> Result<ScanOutcome> {
    let output_path = output_path.as_ref();

    if output_path.exists() && !options.force_rescan {
        log::info!(
            "Reusing existing source descriptions at {}",
            output_path.display()
        );
        return Ok(ScanOutcome {
            records: load_source_descriptions(output_path)?,
            reused_cache: true,
        });
    }

    let notebook = read_notebook(notebook_path)?;
    let records = scan_figure_cells(&notebook, &options.keywords);
    save_source_descriptions(output_path, &records)?;

    Ok(ScanOutcome {
        records,
        reused_cache: false,
    })
}
