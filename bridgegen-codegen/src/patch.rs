//! Span edits over the skeleton text.
//!
//! Every edit is computed against the original text and applied in a single
//! pass, so offsets taken from the symbol table stay valid no matter how many
//! edits precede them.

use std::ops::Range;

use serde::Serialize;

use crate::error::PatchError;

/// Replace `range` of the original text with `replacement`. An empty range is
/// an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    /// What the edit is for, used in overlap errors and snapshots.
    pub label: String,
}

impl Edit {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Edits against one file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchSet {
    edits: Vec<Edit>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(
        &mut self,
        range: Range<usize>,
        replacement: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.edits.push(Edit {
            start: range.start,
            end: range.end,
            replacement: replacement.into(),
            label: label.into(),
        });
        self
    }

    pub fn insert(
        &mut self,
        at: usize,
        text: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.replace(at..at, text, label)
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every edit to `text`.
    ///
    /// Insertions at the same offset keep the order they were added in. An
    /// insertion at either end of a replaced range does not overlap it.
    pub fn apply(&self, text: &str) -> Result<String, PatchError> {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        // stable: same-offset inserts keep their order and precede a replace
        ordered.sort_by_key(|e| (e.start, !e.is_insertion()));

        for pair in ordered.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.end > b.start {
                return Err(PatchError {
                    first: a.label.clone(),
                    first_start: a.start,
                    first_end: a.end,
                    second: b.label.clone(),
                    second_start: b.start,
                    second_end: b.end,
                });
            }
        }

        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for edit in ordered {
            if edit.end > text.len() {
                return Err(out_of_bounds(edit));
            }
            let Some(kept) = text.get(cursor..edit.start) else {
                return Err(out_of_bounds(edit));
            };
            out.push_str(kept);
            out.push_str(&edit.replacement);
            cursor = edit.end;
        }
        out.push_str(text.get(cursor..).unwrap_or_default());
        Ok(out)
    }
}

fn out_of_bounds(edit: &Edit) -> PatchError {
    PatchError {
        first: edit.label.clone(),
        first_start: edit.start,
        first_end: edit.end,
        second: "end of file".to_string(),
        second_start: edit.end,
        second_end: edit.end,
    }
}

/// Byte offsets at which each line of `text` starts.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    if text.is_empty() {
        return starts;
    }
    starts.push(0);
    starts.extend(
        text.match_indices('\n')
            .map(|(i, _)| i + 1)
            .filter(|&i| i < text.len()),
    );
    starts
}
