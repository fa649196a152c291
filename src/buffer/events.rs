// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Edit notifications emitted by the styled text store.
//!
//! Every mutation of a [`StyledBuffer`](super::StyledBuffer) produces one of
//! these values. Character edits drive incremental re-highlighting; attribute
//! edits exist for rendering hosts that mirror the store's styling.

use crate::range::TextRange;

/// The kind of mutation an edit notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// Text content changed. The scheduler reacts to these.
    Characters,
    /// Only style attributes changed; the text is untouched.
    Attributes,
}

/// Notification of a single mutation to a styled buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub kind: EditKind,
    /// The affected range, in post-edit coordinates. For a character edit
    /// this covers the newly inserted text.
    pub range: TextRange,
    /// Byte-length change: new length minus replaced length. Always zero for
    /// attribute edits.
    pub length_delta: isize,
}

impl TextEdit {
    /// Creates a notification for a character replacement.
    pub fn characters(range: TextRange, length_delta: isize) -> Self {
        Self {
            kind: EditKind::Characters,
            range,
            length_delta,
        }
    }

    /// Creates a notification for an attribute overwrite.
    pub fn attributes(range: TextRange) -> Self {
        Self {
            kind: EditKind::Attributes,
            range,
            length_delta: 0,
        }
    }

    /// Returns true if this edit changed the text content.
    pub fn is_characters(&self) -> bool {
        self.kind == EditKind::Characters
    }
}
