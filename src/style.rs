// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Style attribute sets applied to runs of text.

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Creates a color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The set of style attributes carried by one attribute run.
///
/// The default value is the "plain" style: no foreground override, no
/// emphasis. A buffer with no highlighting applied is covered by a single
/// run of this style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Style {
    /// Foreground color, or the host's default when unset.
    pub foreground: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    /// The plain style applied to unhighlighted text.
    pub fn plain() -> Self {
        Self::default()
    }

    /// A style with only a foreground color set.
    pub const fn fg(color: Color) -> Self {
        Self {
            foreground: Some(color),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    /// Returns a copy of this style with bold set.
    pub const fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Returns a copy of this style with italic set.
    pub const fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }
}
