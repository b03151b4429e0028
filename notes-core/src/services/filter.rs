//! Note filtering
//!
//! Pure functions computing the visible subset of notes from a tag filter
//! and a search keyword. The view is always recomputed from the full list;
//! nothing here holds state between calls.

use crate::config::ALL_TAGS_FILTER;
use crate::database::Note;
use serde::{Deserialize, Serialize};

/// Filter the notes by tag, then by keyword, preserving input order.
///
/// - `tag_filter == "All"` keeps every note. Any other value keeps notes
///   whose non-empty tag equals it case-insensitively, both sides trimmed.
/// - A non-empty `keyword` must appear case-insensitively in the title,
///   the content or the tag.
pub fn apply_filters(notes: &[Note], tag_filter: &str, keyword: &str) -> Vec<Note> {
    let keyword = keyword.to_lowercase();

    notes
        .iter()
        .filter(|note| matches_tag(note, tag_filter) && matches_keyword(note, &keyword))
        .cloned()
        .collect()
}

fn matches_tag(note: &Note, tag_filter: &str) -> bool {
    if tag_filter == ALL_TAGS_FILTER {
        return true;
    }

    let tag = note.tag.trim();
    !tag.is_empty() && tag.to_lowercase() == tag_filter.trim().to_lowercase()
}

/// `keyword` must already be lowercased
fn matches_keyword(note: &Note, keyword: &str) -> bool {
    keyword.is_empty()
        || note.title.to_lowercase().contains(keyword)
        || note.content.to_lowercase().contains(keyword)
        || note.tag.to_lowercase().contains(keyword)
}

/// The list view's filter state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFilter {
    pub tag: String,
    pub keyword: String,
}

impl Default for NoteFilter {
    fn default() -> Self {
        Self {
            tag: ALL_TAGS_FILTER.to_string(),
            keyword: String::new(),
        }
    }
}

impl NoteFilter {
    pub fn new(tag: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            keyword: keyword.into(),
        }
    }

    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..self
        }
    }

    pub fn with_keyword(self, keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..self
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.tag == ALL_TAGS_FILTER && self.keyword.is_empty()
    }

    pub fn apply(&self, notes: &[Note]) -> Vec<Note> {
        apply_filters(notes, &self.tag, &self.keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, title: &str, content: &str, tag: &str) -> Note {
        Note {
            id,
            ..Note::new(title, content, tag, "Red")
        }
    }

    fn sample() -> Vec<Note> {
        vec![
            note(1, "Standup", "Daily meeting notes", "Work"),
            note(2, "Groceries", "Milk, eggs", "Personal"),
            note(3, "Untagged", "Loose thought", ""),
            note(4, "Budget", "Q3 numbers", " work "),
            note(5, "Team Meeting", "Agenda", "Important"),
        ]
    }

    fn ids(notes: &[Note]) -> Vec<i64> {
        notes.iter().map(|n| n.id).collect()
    }

    #[test]
    fn test_all_with_empty_keyword_returns_input() {
        let notes = sample();
        assert_eq!(apply_filters(&notes, "All", ""), notes);
    }

    #[test]
    fn test_tag_filter_is_case_insensitive_and_trimmed() {
        let notes = sample();
        assert_eq!(ids(&apply_filters(&notes, "Work", "")), vec![1, 4]);
        assert_eq!(ids(&apply_filters(&notes, " WORK", "")), vec![1, 4]);
    }

    #[test]
    fn test_empty_tag_never_matches_specific_filter() {
        let notes = vec![note(1, "a", "b", "Work"), note(2, "c", "d", "Personal"), note(3, "e", "f", "")];
        assert_eq!(ids(&apply_filters(&notes, "Work", "")), vec![1]);
        assert!(apply_filters(&notes, "", "").is_empty());
    }

    #[test]
    fn test_keyword_matches_title_content_or_tag() {
        let notes = sample();
        assert_eq!(ids(&apply_filters(&notes, "All", "meeting")), vec![1, 5]);
        assert_eq!(ids(&apply_filters(&notes, "All", "EGGS")), vec![2]);
        assert_eq!(ids(&apply_filters(&notes, "All", "importa")), vec![5]);
        assert!(apply_filters(&notes, "All", "nothing like this").is_empty());
    }

    #[test]
    fn test_tag_and_keyword_are_combined() {
        let notes = sample();
        assert_eq!(ids(&apply_filters(&notes, "Work", "meeting")), vec![1]);
        assert!(apply_filters(&notes, "Personal", "meeting").is_empty());
    }

    #[test]
    fn test_filter_state_recomputes_from_source() {
        let notes = sample();
        let filter = NoteFilter::default();
        assert!(filter.is_unfiltered());
        assert_eq!(filter.apply(&notes).len(), notes.len());

        let filter = filter.with_tag("Work");
        assert_eq!(ids(&filter.apply(&notes)), vec![1, 4]);

        let filter = filter.with_keyword("budget");
        assert_eq!(ids(&filter.apply(&notes)), vec![4]);

        let filter = filter.with_tag("All").with_keyword("");
        assert_eq!(filter.apply(&notes), notes);
    }
}
