// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Text content plus per-range style attributes.
//!
//! [`StyledBuffer`] owns the full text of a document and a run list that maps
//! every byte of it to a [`Style`]. The run list is kept sorted, coalesced,
//! and gap-free: at any point the runs exactly partition `[0, len())`.
//! Mutations emit [`TextEdit`] notifications; attribute writes between
//! [`begin_batch`](StyledBuffer::begin_batch) and
//! [`end_batch`](StyledBuffer::end_batch) coalesce into a single
//! notification so observers see one change per merged highlighting pass.

use crate::buffer::events::TextEdit;
use crate::error::BufferError;
use crate::range::TextRange;
use crate::style::Style;

/// A maximal contiguous range of text sharing one style attribute set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRun {
    pub range: TextRange,
    pub style: Style,
}

impl AttrRun {
    fn new(range: TextRange, style: Style) -> Self {
        Self { range, style }
    }
}

/// A text buffer whose content is fully covered by style attribute runs.
#[derive(Debug, Default)]
pub struct StyledBuffer {
    content: String,
    runs: Vec<AttrRun>,
    batch_depth: u32,
    batch_union: Option<TextRange>,
    events: Vec<TextEdit>,
}

impl StyledBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text` under a single plain-style run.
    pub fn from_text(text: impl Into<String>) -> Self {
        let content = text.into();
        let runs = if content.is_empty() {
            Vec::new()
        } else {
            vec![AttrRun::new(
                TextRange::new(0, content.len()),
                Style::plain(),
            )]
        };
        Self {
            content,
            runs,
            ..Self::default()
        }
    }

    /// The buffer length in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The full current text.
    pub fn text(&self) -> &str {
        &self.content
    }

    /// The current attribute runs, sorted and coalesced.
    pub fn runs(&self) -> &[AttrRun] {
        &self.runs
    }

    /// The live substring addressed by `range`.
    pub fn slice(&self, range: TextRange) -> Result<&str, BufferError> {
        self.check_range(range)?;
        Ok(&self.content[range.location..range.end()])
    }

    /// Replaces the text addressed by `range` with `new_text`.
    ///
    /// The inserted span inherits the style present at the start of the
    /// replaced range, so run coverage stays exact; the scheduler re-covers
    /// the region with real highlighting afterwards. Returns (and queues)
    /// the edit notification describing the change.
    pub fn replace_characters(
        &mut self,
        range: TextRange,
        new_text: &str,
    ) -> Result<TextEdit, BufferError> {
        self.check_range(range)?;

        let inherited = self.style_at_insertion_point(range.location);
        self.content.replace_range(range.location..range.end(), new_text);
        let delta = new_text.len() as isize - range.length as isize;
        let new_range = TextRange::new(range.location, new_text.len());

        let (mut rebuilt, after) = self.carve(range, delta);
        if !new_range.is_empty() {
            rebuilt.push(AttrRun::new(new_range, inherited));
        }
        rebuilt.extend(after);
        self.runs = rebuilt;
        self.coalesce();
        self.debug_check();

        let edit = TextEdit::characters(new_range, delta);
        self.events.push(edit.clone());
        Ok(edit)
    }

    /// Overwrites attribute coverage for `range` with `style`.
    ///
    /// Inside a batch the notification is deferred and coalesced with the
    /// other attribute writes of the batch.
    pub fn set_attributes(
        &mut self,
        style: Style,
        range: TextRange,
    ) -> Result<TextEdit, BufferError> {
        self.check_range(range)?;
        let edit = TextEdit::attributes(range);
        if range.is_empty() {
            return Ok(edit);
        }

        let (mut rebuilt, after) = self.carve(range, 0);
        rebuilt.push(AttrRun::new(range, style));
        rebuilt.extend(after);
        self.runs = rebuilt;
        self.coalesce();
        self.debug_check();

        if self.batch_depth > 0 {
            self.batch_union = Some(match self.batch_union {
                Some(union) => {
                    let location = union.location.min(range.location);
                    let end = union.end().max(range.end());
                    TextRange::new(location, end - location)
                }
                None => range,
            });
        } else {
            self.events.push(edit.clone());
        }
        Ok(edit)
    }

    /// Returns the style at `location` and the maximal run containing it.
    pub fn attributes_at(&self, location: usize) -> Result<(&Style, TextRange), BufferError> {
        let found = self.runs.binary_search_by(|run| {
            if location < run.range.location {
                std::cmp::Ordering::Greater
            } else if location >= run.range.end() {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        });
        match found {
            Ok(index) => Ok((&self.runs[index].style, self.runs[index].range)),
            Err(_) => Err(BufferError::OutOfBounds {
                range: TextRange::empty_at(location),
                len: self.len(),
            }),
        }
    }

    /// Expands `range` to the enclosing paragraph(s): left to the byte after
    /// the previous newline, right through the terminating newline of the
    /// paragraph containing the range end. Out-of-range input is clamped,
    /// never rejected.
    pub fn paragraph_range(&self, range: TextRange) -> TextRange {
        let range = range.clamped_to(self.content.len());
        let bytes = self.content.as_bytes();

        let start = bytes[..range.location]
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);

        // A range whose last byte already is a newline ends its paragraph.
        let end = if !range.is_empty() && bytes[range.end() - 1] == b'\n' {
            range.end()
        } else {
            bytes[range.end()..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(self.content.len(), |i| range.end() + i + 1)
        };

        TextRange::new(start, end - start)
    }

    /// Starts grouping attribute writes into one coalesced notification.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Ends the current batch, emitting the coalesced notification if any
    /// attribute write happened inside it.
    pub fn end_batch(&mut self) {
        debug_assert!(self.batch_depth > 0, "end_batch without begin_batch");
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            if let Some(union) = self.batch_union.take() {
                self.events.push(TextEdit::attributes(union));
            }
        }
    }

    /// Takes all queued edit notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<TextEdit> {
        std::mem::take(&mut self.events)
    }

    fn check_range(&self, range: TextRange) -> Result<(), BufferError> {
        if !range.fits(self.content.len()) {
            return Err(BufferError::OutOfBounds {
                range,
                len: self.content.len(),
            });
        }
        for offset in [range.location, range.end()] {
            if !self.content.is_char_boundary(offset) {
                return Err(BufferError::NotCharBoundary { offset });
            }
        }
        Ok(())
    }

    /// Style inherited by text inserted at `location`, computed against the
    /// pre-splice run list.
    fn style_at_insertion_point(&self, location: usize) -> Style {
        if let Ok((style, _)) = self.attributes_at(location) {
            return style.clone();
        }
        // Appending at the very end: continue the final run's style.
        self.runs
            .last()
            .map(|run| run.style.clone())
            .unwrap_or_default()
    }

    /// Splits the run list around `range`, returning the runs (or run parts)
    /// strictly before it and, shifted by `delta`, those strictly after it.
    fn carve(&self, range: TextRange, delta: isize) -> (Vec<AttrRun>, Vec<AttrRun>) {
        let mut before = Vec::with_capacity(self.runs.len() + 1);
        let mut after = Vec::new();
        for run in &self.runs {
            if run.range.location < range.location {
                let keep = run.range.end().min(range.location) - run.range.location;
                before.push(AttrRun::new(
                    TextRange::new(run.range.location, keep),
                    run.style.clone(),
                ));
            }
            if run.range.end() > range.end() {
                let keep_start = run.range.location.max(range.end());
                let shifted = (keep_start as isize + delta) as usize;
                after.push(AttrRun::new(
                    TextRange::new(shifted, run.range.end() - keep_start),
                    run.style.clone(),
                ));
            }
        }
        (before, after)
    }

    /// Merges adjacent runs with equal styles and drops empty ones.
    fn coalesce(&mut self) {
        let mut coalesced: Vec<AttrRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.range.is_empty() {
                continue;
            }
            match coalesced.last_mut() {
                Some(last) if last.style == run.style && last.range.end() == run.range.location => {
                    last.range.length += run.range.length;
                }
                _ => coalesced.push(run),
            }
        }
        self.runs = coalesced;
    }

    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        self.assert_coverage();
    }

    /// Panics unless the runs exactly partition `[0, len())`.
    #[doc(hidden)]
    pub fn assert_coverage(&self) {
        let mut cursor = 0;
        for run in &self.runs {
            assert_eq!(
                run.range.location, cursor,
                "run coverage gap or overlap at byte {cursor}"
            );
            assert!(!run.range.is_empty(), "empty run at byte {cursor}");
            cursor = run.range.end();
        }
        assert_eq!(cursor, self.content.len(), "runs do not cover the buffer");
    }
}
