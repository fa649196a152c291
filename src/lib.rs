// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Self-highlighting text buffer core.
//!
//! This crate keeps a mutable text buffer visually styled according to a
//! syntax-highlighting grammar, recomputing styling incrementally as the text
//! changes. Highlighting runs off the interactive path: each character edit
//! expands to the enclosing paragraph, is handed to a [`HighlightEngine`] on a
//! worker thread, and the result is validated against the buffer's live
//! content before it is merged. Results that arrive after the buffer moved on
//! are discarded rather than cancelled; correctness rests entirely on the
//! merge-time content check.
//!
//! [`CodeBuffer`] is the entry point for hosts: a [`StyledBuffer`] wired to a
//! [`HighlightScheduler`], exposing the edit, language, theme, and delegate
//! surfaces in one place.

pub mod buffer;
pub mod code_buffer;
pub mod error;
pub mod range;
pub mod style;
pub mod syntax;

pub use buffer::{AttrRun, EditKind, StyledBuffer, TextEdit};
pub use code_buffer::CodeBuffer;
pub use error::BufferError;
pub use range::TextRange;
pub use style::{Color, Style};
pub use syntax::{
    FragmentRun, HighlightDelegate, HighlightEngine, HighlightScheduler, LanguageDetector,
    SchedulerMetrics, StyledFragment, SynopticEngine, Theme, ThemeSubscription,
};
