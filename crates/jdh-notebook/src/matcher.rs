//! Tag pattern matching
//!
//! Descriptor tags are matched against cell tags as whole strings. `*` is the
//! only special character and stands for any run of characters, so
//! `figure-tools-*` covers `figure-tools-1`, `figure-tools-2b` and
//! `figure-tools-` itself. Everything else, regex metacharacters included,
//! matches literally.

use crate::descriptions::SourceDescription;

const WILDCARD: char = '*';

/// A descriptor tag compiled for matching
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagPattern {
    /// No wildcard: tags must be equal
    Exact(String),
    /// Single trailing wildcard: tag must start with the prefix
    Prefix(String),
    /// Wildcards elsewhere: literal segments that must appear in order, the
    /// first anchored at the start and the last at the end
    Glob(Vec<String>),
}

impl TagPattern {
    /// Compile a descriptor tag
    #[must_use]
    pub fn compile(descriptor_tag: &str) -> Self {
        match descriptor_tag.find(WILDCARD) {
            None => Self::Exact(descriptor_tag.to_string()),
            Some(pos) if pos == descriptor_tag.len() - 1 => {
                Self::Prefix(descriptor_tag[..pos].to_string())
            }
            Some(_) => Self::Glob(descriptor_tag.split(WILDCARD).map(str::to_string).collect()),
        }
    }

    /// Whether `tag` matches this pattern in full
    #[must_use]
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Exact(expected) => tag == expected,
            Self::Prefix(prefix) => tag.starts_with(prefix.as_str()),
            Self::Glob(segments) => glob_matches(segments, tag),
        }
    }
}

// `segments` always has at least two entries (it came from a split on a
// string containing the wildcard).
fn glob_matches(segments: &[String], tag: &str) -> bool {
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return false;
    };
    if tag.len() < first.len() + last.len()
        || !tag.starts_with(first.as_str())
        || !tag.ends_with(last.as_str())
    {
        return false;
    }

    let mut rest = &tag[first.len()..tag.len() - last.len()];
    for segment in &segments[1..segments.len() - 1] {
        match rest.find(segment.as_str()) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    true
}

/// Whether `tag` matches `descriptor_tag`
#[must_use]
pub fn tag_matches(tag: &str, descriptor_tag: &str) -> bool {
    TagPattern::compile(descriptor_tag).matches(tag)
}

/// First record, in list order, whose tag matches `tag`
///
/// Compiles every pattern on each call; use [`TagMatcher`] when looking up
/// many tags against the same records.
#[must_use]
pub fn find_match<'a>(
    tag: &str,
    records: &'a [SourceDescription],
) -> Option<&'a SourceDescription> {
    records.iter().find(|record| tag_matches(tag, &record.tag))
}

/// Source descriptions with their tag patterns compiled once
#[derive(Debug, Clone)]
pub struct TagMatcher<'a> {
    entries: Vec<(TagPattern, &'a SourceDescription)>,
}

impl<'a> TagMatcher<'a> {
    /// Compile the tag of every record, keeping list order
    #[must_use]
    pub fn compile(records: &'a [SourceDescription]) -> Self {
        let entries = records
            .iter()
            .map(|record| (TagPattern::compile(&record.tag), record))
            .collect();
        Self { entries }
    }

    /// First record whose pattern matches `tag`. Ties go to the earliest
    /// record, never the most specific one.
    #[must_use]
    pub fn find_match(&self, tag: &str) -> Option<&'a SourceDescription> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(tag))
            .map(|(_, record)| *record)
    }

    /// Number of compiled records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
