// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The styled text store: plain content plus attribute-run coverage.
//!
//! This module owns no background work. It is synchronous bookkeeping plus
//! edit-notification emission; everything asynchronous lives in
//! [`crate::syntax`].

pub mod events;
pub mod styled_buffer;

pub use events::{EditKind, TextEdit};
pub use styled_buffer::{AttrRun, StyledBuffer};
