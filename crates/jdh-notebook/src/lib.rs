//! # jdh-notebook
//!
//! Post-processing for Jupyter notebooks submitted as journal articles.
//!
//! This crate reads and writes notebooks (nbformat 4.x) and provides the
//! three editing passes an article goes through before submission:
//! - **Scan** for cells tagged as figures, tables or covers and write a stub
//!   list of source descriptions for a human to complete
//! - **Annotate** tagged cells with the completed descriptions under
//!   `metadata.jdh`, matching tags with `*` wildcards
//! - **Anonymize** author names in markdown and code cells
//!
//! ## Example
//!
//! ```no_run
//! use jdh_notebook::{
//!     add_metadata_to_notebook, anonymize_notebook, find_figure_cells, Anonymizer, ScanOptions,
//! };
//!
//! let scan = find_figure_cells("article.ipynb", "figure_cells.json", &ScanOptions::default())?;
//! // ... fill in `source` for each stub in figure_cells.json, then:
//! add_metadata_to_notebook("article.ipynb", &scan.records)?;
//! anonymize_notebook("article.ipynb", &Anonymizer::default())?;
//! # Ok::<(), jdh_notebook::NotebookError>(())
//! ```

/// Citation metadata writer
pub mod annotator;
/// Author name redaction
pub mod anonymizer;
/// Source description files
pub mod descriptions;
/// Error types
pub mod error;
/// Notebook model, reader and writer
pub mod ipynb;
/// Wildcard tag matching
pub mod matcher;
/// Figure cell discovery
pub mod scanner;

pub use annotator::{add_metadata_to_notebook, annotate_notebook, annotation_for, AnnotationReport};
pub use anonymizer::{anonymize_notebook, Anonymizer, SubstitutionRule, DEFAULT_AUTHORS};
pub use descriptions::{load_source_descriptions, save_source_descriptions, SourceDescription};
pub use error::{NotebookError, Result};
pub use ipynb::{
    notebook_to_string, parse_notebook_from_str, read_notebook, write_notebook, Cell, CellMetadata,
    CellType, JdhAnnotation, JdhObject, Notebook,
};
pub use matcher::{find_match, tag_matches, TagMatcher, TagPattern};
pub use scanner::{find_figure_cells, scan_figure_cells, ScanOptions, ScanOutcome, DEFAULT_KEYWORDS};
