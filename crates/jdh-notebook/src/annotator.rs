//! Writes citation metadata (`metadata.jdh`) onto tagged cells

use crate::descriptions::SourceDescription;
use crate::error::Result;
use crate::ipynb::{read_notebook, write_notebook, JdhAnnotation, JdhObject, Notebook};
use crate::matcher::TagMatcher;
use serde_json::Map;
use std::path::Path;

/// Module name written next to typed objects
pub const OBJECT_MODULE: &str = "object";

/// What [`annotate_notebook`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AnnotationReport {
    /// Cells in the notebook
    pub cells: usize,
    /// Cells with a `tags` list
    pub tagged_cells: usize,
    /// Cells whose `jdh` metadata was written
    pub annotated_cells: usize,
    /// Tags that matched no record
    pub unmatched_tags: usize,
}

/// Fresh `jdh` content for a matching record
#[must_use]
pub fn annotation_for(record: &SourceDescription) -> JdhAnnotation {
    let object = JdhObject {
        source: record.source.clone(),
        kind: record.kind.clone(),
        extra: Map::new(),
    };
    JdhAnnotation {
        module: record.kind.as_ref().map(|_| OBJECT_MODULE.to_string()),
        object: Some(object),
        extra: Map::new(),
    }
}

/// Annotate every tagged cell whose tags match a record
///
/// Each matching tag replaces the cell's `jdh` wholesale, so the last
/// matching tag on a cell wins and re-running with the same records changes
/// nothing.
pub fn annotate_notebook(notebook: &mut Notebook, matcher: &TagMatcher<'_>) -> AnnotationReport {
    let mut report = AnnotationReport {
        cells: notebook.cells.len(),
        ..AnnotationReport::default()
    };

    for (index, cell) in notebook.cells.iter_mut().enumerate() {
        let Some(tags) = cell.metadata.tags.as_ref() else {
            continue;
        };
        report.tagged_cells += 1;

        let mut annotation = None;
        for tag in tags {
            match matcher.find_match(tag) {
                Some(record) => {
                    log::debug!("Cell {index}: tag '{tag}' matched '{}'", record.tag);
                    annotation = Some(annotation_for(record));
                }
                None => report.unmatched_tags += 1,
            }
        }

        if let Some(annotation) = annotation {
            cell.metadata.jdh = Some(annotation);
            report.annotated_cells += 1;
        }
    }

    report
}

/// Load a notebook, annotate it from `records`, and write it back in place
///
/// # Errors
///
/// Returns an error if the notebook cannot be read or written.
pub fn add_metadata_to_notebook<P: AsRef<Path>>(
    notebook_path: P,
    records: &[SourceDescription],
) -> Result<AnnotationReport> {
    let notebook_path = notebook_path.as_ref();

    let stubs = records.iter().filter(|r| r.is_stub()).count();
    if stubs > 0 {
        log::warn!("{stubs} source descriptions have no source yet; matching cells get an empty one");
    }

    let mut notebook = read_notebook(notebook_path)?;
    let matcher = TagMatcher::compile(records);
    let report = annotate_notebook(&mut notebook, &matcher);
    write_notebook(notebook_path, &notebook)?;

    log::info!(
        "Annotated {}/{} tagged cells in {}",
        report.annotated_cells,
        report.tagged_cells,
        notebook_path.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipynb::parse_notebook_from_str;

    fn notebook(cells: &str) -> Notebook {
        parse_notebook_from_str(&format!(
            r#"{{"nbformat": 4, "nbformat_minor": 5, "metadata": {{}}, "cells": [{cells}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_wildcard_without_type() {
        let mut nb = notebook(
            r#"{"cell_type": "code", "metadata": {"tags": ["figure-tools-1"]}, "source": []}"#,
        );
        let records = vec![SourceDescription::new("figure-tools-*", vec!["caption".into()])];

        let report = annotate_notebook(&mut nb, &TagMatcher::compile(&records));
        assert_eq!(report.annotated_cells, 1);

        let jdh = nb.cells[0].metadata.jdh.as_ref().unwrap();
        let object = jdh.object.as_ref().unwrap();
        assert_eq!(object.source, vec!["caption".to_string()]);
        assert_eq!(object.kind, None);
        assert_eq!(jdh.module, None);

        let value = serde_json::to_value(&nb.cells[0].metadata).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"jdh": {"object": {"source": ["caption"]}}, "tags": ["figure-tools-1"]})
        );
    }

    #[test]
    fn test_typed_record_sets_module() {
        let mut nb = notebook(
            r#"{"cell_type": "code", "metadata": {"tags": ["table-1"]}, "source": []}"#,
        );
        let records = vec![SourceDescription::new("table-1", vec!["Data".into()]).with_kind("table")];

        annotate_notebook(&mut nb, &TagMatcher::compile(&records));
        let jdh = nb.cells[0].metadata.jdh.as_ref().unwrap();
        assert_eq!(jdh.module.as_deref(), Some("object"));
        assert_eq!(jdh.object.as_ref().unwrap().kind.as_deref(), Some("table"));
    }

    #[test]
    fn test_last_matching_tag_wins() {
        let mut nb = notebook(
            r#"{"cell_type": "code", "metadata": {"tags": ["figure-1", "narrative", "cover"]}, "source": []}"#,
        );
        let records = vec![
            SourceDescription::new("figure-1", vec!["Figure".into()]).with_kind("image"),
            SourceDescription::new("cover", vec!["Cover".into()]),
        ];

        let report = annotate_notebook(&mut nb, &TagMatcher::compile(&records));
        assert_eq!(report.unmatched_tags, 1);

        let jdh = nb.cells[0].metadata.jdh.as_ref().unwrap();
        let object = jdh.object.as_ref().unwrap();
        assert_eq!(object.source, vec!["Cover".to_string()]);
        assert_eq!(object.kind, None);
        assert_eq!(jdh.module, None);
    }

    #[test]
    fn test_untagged_and_unmatched_cells_untouched() {
        let mut nb = notebook(
            r#"{"cell_type": "markdown", "metadata": {"jdh": {"module": "custom"}}, "source": ["x"]},
               {"cell_type": "code", "metadata": {"tags": ["narrative"], "jdh": {"object": {"source": ["keep"]}}}, "source": []}"#,
        );
        let before = nb.clone();
        let records = vec![SourceDescription::new("figure-*", vec!["caption".into()])];

        let report = annotate_notebook(&mut nb, &TagMatcher::compile(&records));
        assert_eq!(nb, before);
        assert_eq!(
            report,
            AnnotationReport {
                cells: 2,
                tagged_cells: 1,
                annotated_cells: 0,
                unmatched_tags: 1,
            }
        );
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let mut nb = notebook(
            r#"{"cell_type": "code", "metadata": {"tags": ["figure-a", "table-b"], "jdh": {"module": "old", "extra": 1}}, "source": []},
               {"cell_type": "code", "metadata": {"tags": ["figure-c"]}, "source": []}"#,
        );
        let records = vec![
            SourceDescription::new("figure-*", vec!["Fig".into()]).with_kind("image"),
            SourceDescription::new("table-*", vec!["Tab".into()]),
        ];
        let matcher = TagMatcher::compile(&records);

        annotate_notebook(&mut nb, &matcher);
        let once = nb.clone();
        annotate_notebook(&mut nb, &matcher);
        assert_eq!(nb, once);
    }

    #[test]
    fn test_add_metadata_to_notebook_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("article.ipynb");
        let nb = notebook(
            r#"{"cell_type": "code", "metadata": {"tags": ["figure-tools-1"]}, "source": ["plot()"]}"#,
        );
        crate::ipynb::write_notebook(&path, &nb).unwrap();

        let records = vec![SourceDescription::new("figure-tools-*", vec!["caption".into()])];
        let report = add_metadata_to_notebook(&path, &records).unwrap();
        assert_eq!(report.annotated_cells, 1);

        let reloaded = read_notebook(&path).unwrap();
        assert_eq!(
            reloaded.cells[0].metadata.jdh,
            Some(annotation_for(&records[0]))
        );
        assert_eq!(reloaded.cells[0].source, "plot()");
    }

    #[test]
    fn test_add_metadata_missing_notebook() {
        let dir = tempfile::tempdir().unwrap();
        let result = add_metadata_to_notebook(dir.path().join("gone.ipynb"), &[]);
        assert!(matches!(result, Err(crate::NotebookError::NotFound(_))));
    }
}
