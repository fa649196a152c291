// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Maps grammar token kinds to style attribute sets.
//!
//! A theme is a named table from token kind (`"keyword"`, `"string"`, ...)
//! to [`Style`]. Engines hold the active theme; the scheduler only ever sees
//! theme *names* and the change notifications that follow a switch.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::style::{Color, Style};

/// A named token-kind → style table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    name: String,
    styles: HashMap<String, Style>,
    default_style: Style,
}

/// Built-in themes, keyed by name.
static BUILTIN_THEMES: Lazy<HashMap<&'static str, Theme>> = Lazy::new(|| {
    let mut themes = HashMap::new();
    themes.insert("dusk", Theme::dusk());
    themes.insert("daylight", Theme::daylight());
    themes
});

impl Default for Theme {
    fn default() -> Self {
        Self::dusk()
    }
}

impl Theme {
    /// Looks up a built-in theme by name.
    pub fn named(name: &str) -> Option<Theme> {
        BUILTIN_THEMES.get(name).cloned()
    }

    /// The names of all built-in themes.
    pub fn builtin_names() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = BUILTIN_THEMES.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// An empty theme with the given name; every kind resolves to the
    /// default style until entries are added.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            styles: HashMap::new(),
            default_style: Style::plain(),
        }
    }

    /// The dark built-in theme.
    pub fn dusk() -> Self {
        let mut theme = Theme::new("dusk");
        theme.set_style("keyword", Style::fg(Color::rgb(0x56, 0x9c, 0xd6)).with_bold());
        theme.set_style("type", Style::fg(Color::rgb(0x4e, 0xc9, 0xb0)));
        theme.set_style("function", Style::fg(Color::rgb(0xdc, 0xdc, 0xaa)));
        theme.set_style("string", Style::fg(Color::rgb(0xce, 0x91, 0x78)));
        theme.set_style("comment", Style::fg(Color::rgb(0x6a, 0x99, 0x55)).with_italic());
        theme.set_style("number", Style::fg(Color::rgb(0xb5, 0xce, 0xa8)));
        theme.set_style("boolean", Style::fg(Color::rgb(0x56, 0x9c, 0xd6)));
        theme.set_style("operator", Style::fg(Color::rgb(0xd4, 0xd4, 0xd4)));
        theme.set_style("macro", Style::fg(Color::rgb(0xc5, 0x86, 0xc0)));
        theme
    }

    /// The light built-in theme.
    pub fn daylight() -> Self {
        let mut theme = Theme::new("daylight");
        theme.set_style("keyword", Style::fg(Color::rgb(0x00, 0x00, 0xff)).with_bold());
        theme.set_style("type", Style::fg(Color::rgb(0x26, 0x7f, 0x99)));
        theme.set_style("function", Style::fg(Color::rgb(0x79, 0x5e, 0x26)));
        theme.set_style("string", Style::fg(Color::rgb(0xa3, 0x15, 0x15)));
        theme.set_style("comment", Style::fg(Color::rgb(0x00, 0x80, 0x00)).with_italic());
        theme.set_style("number", Style::fg(Color::rgb(0x09, 0x86, 0x58)));
        theme.set_style("boolean", Style::fg(Color::rgb(0x00, 0x00, 0xff)));
        theme.set_style("operator", Style::fg(Color::rgb(0x33, 0x33, 0x33)));
        theme.set_style("macro", Style::fg(Color::rgb(0xaf, 0x00, 0xdb)));
        theme
    }

    /// The theme's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The style for a token kind, falling back to the default style for
    /// kinds the theme does not cover.
    pub fn style_for(&self, kind: &str) -> Style {
        self.styles
            .get(kind)
            .cloned()
            .unwrap_or_else(|| self.default_style.clone())
    }

    /// Sets the style for a token kind.
    pub fn set_style(&mut self, kind: impl Into<String>, style: Style) {
        self.styles.insert(kind.into(), style);
    }

    /// All token kinds this theme covers.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}
