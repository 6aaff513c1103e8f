//! Author name redaction for double-blind review
//!
//! Rules run in order and each one sees the output of the previous one.
//! Two-name phrases come before single names: once a surname has become
//! `Author1` the phrase containing it can no longer be recognized.

use crate::error::{NotebookError, Result};
use crate::ipynb::{read_notebook, write_notebook, CellType, Notebook};
use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::path::Path;

/// Authors redacted when nothing else is configured, in `AuthorN` order
pub const DEFAULT_AUTHORS: [&str; 2] = ["LeBlanc", "Wieringa"];

/// One regex replace-all step. The replacement is literal text.
#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    pattern: Regex,
    replacement: String,
}

impl SubstitutionRule {
    /// Compile a rule
    ///
    /// # Errors
    ///
    /// Returns `NotebookError::InvalidPattern` if `pattern` is not a valid regex.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| NotebookError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    fn literal(text: &str, replacement: impl Into<String>) -> Self {
        Self::literal_with_prefix("", text, replacement)
    }

    fn literal_with_prefix(prefix: &str, text: &str, replacement: impl Into<String>) -> Self {
        let pattern = format!("{prefix}{}", regex::escape(text));
        Self {
            pattern: Regex::new(&pattern).expect("escaped literal is a valid regex"),
            replacement: replacement.into(),
        }
    }

    /// Regex source of this rule
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Replacement text
    #[inline]
    #[must_use]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Apply this rule to `text`
    #[must_use]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, NoExpand(&self.replacement))
    }
}

/// Ordered list of substitution rules
#[derive(Debug, Clone)]
pub struct Anonymizer {
    rules: Vec<SubstitutionRule>,
}

impl Default for Anonymizer {
    fn default() -> Self {
        Self::for_authors(&DEFAULT_AUTHORS)
    }
}

impl Anonymizer {
    /// Anonymizer running `rules` left to right
    #[must_use]
    pub fn new(rules: Vec<SubstitutionRule>) -> Self {
        Self { rules }
    }

    /// Compile `(pattern, replacement)` pairs, keeping their order
    ///
    /// # Errors
    ///
    /// Returns `NotebookError::InvalidPattern` for the first invalid pattern.
    pub fn from_rules<P: AsRef<str>, R: AsRef<str>>(rules: &[(P, R)]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|(pattern, replacement)| {
                SubstitutionRule::new(pattern.as_ref(), replacement.as_ref())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Rules redacting the given authors
    ///
    /// For every ordered pair of distinct authors `a`, `b`:
    /// 1. `. a and b` (sentence start) becomes `. The Authors`
    /// 2. `a and b` anywhere else becomes `the authors`
    ///
    /// then each name becomes `Author1`, `Author2`, ... in the order given.
    /// Blank names are ignored.
    #[must_use]
    pub fn for_authors<S: AsRef<str>>(authors: &[S]) -> Self {
        let names: Vec<&str> = authors
            .iter()
            .map(|a| a.as_ref().trim())
            .filter(|name| !name.is_empty())
            .collect();
        if names.len() < authors.len() {
            log::warn!("Ignoring {} blank author names", authors.len() - names.len());
        }
        let mut pairs = Vec::new();
        for (i, first) in names.iter().enumerate() {
            for (j, second) in names.iter().enumerate() {
                if i != j {
                    pairs.push(format!("{first} and {second}"));
                }
            }
        }

        let mut rules = Vec::with_capacity(pairs.len() * 2 + names.len());
        rules.extend(pairs.iter().map(|phrase| {
            SubstitutionRule::literal_with_prefix(r"\.\s*", phrase, ". The Authors")
        }));
        rules.extend(pairs.iter().map(|phrase| SubstitutionRule::literal(phrase, "the authors")));
        rules.extend(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| SubstitutionRule::literal(name, format!("Author{}", i + 1))),
        );

        Self::new(rules)
    }

    /// Rules in application order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    /// Run every rule over `text`, each on the previous rule's output
    #[must_use]
    pub fn anonymize_text(&self, text: &str) -> String {
        let mut text = text.to_string();
        for rule in &self.rules {
            let replaced = match rule.apply(&text) {
                Cow::Borrowed(_) => None,
                Cow::Owned(replaced) => Some(replaced),
            };
            if let Some(replaced) = replaced {
                text = replaced;
            }
        }
        text
    }

    /// Anonymize markdown and code cells in place, returning how many changed
    pub fn anonymize(&self, notebook: &mut Notebook) -> usize {
        let mut changed = 0;
        for (index, cell) in notebook.cells.iter_mut().enumerate() {
            if !matches!(cell.cell_type, CellType::Markdown | CellType::Code) {
                continue;
            }
            let redacted = self.anonymize_text(&cell.source);
            if redacted != cell.source {
                log::debug!("Redacted author names in cell {index}");
                cell.source = redacted;
                changed += 1;
            }
        }
        changed
    }
}

/// Load a notebook, anonymize it, and write it back in place
///
/// # Errors
///
/// Returns an error if the notebook cannot be read or written.
pub fn anonymize_notebook<P: AsRef<Path>>(
    notebook_path: P,
    anonymizer: &Anonymizer,
) -> Result<usize> {
    let notebook_path = notebook_path.as_ref();
    let mut notebook = read_notebook(notebook_path)?;
    let changed = anonymizer.anonymize(&mut notebook);
    write_notebook(notebook_path, &notebook)?;
    log::info!(
        "Anonymized {changed} cells in {}",
        notebook_path.display()
    );
    Ok(changed)
}
