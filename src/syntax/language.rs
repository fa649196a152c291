// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Language identification for syntax highlighting.
//!
//! Maps file paths to the language identifiers the engine understands, with
//! a shebang-line fallback for extensionless scripts and manual per-path
//! overrides on top of both.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// File extensions mapped to language identifiers.
static EXTENSION_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();

    map.insert("rs", "rust");
    map.insert("js", "javascript");
    map.insert("mjs", "javascript");
    map.insert("cjs", "javascript");
    map.insert("jsx", "javascript");
    map.insert("ts", "typescript");
    map.insert("tsx", "typescript");
    map.insert("py", "python");
    map.insert("pyw", "python");
    map.insert("pyi", "python");
    map.insert("json", "json");
    map.insert("jsonc", "json");

    map.insert("html", "html");
    map.insert("htm", "html");
    map.insert("css", "css");
    map.insert("md", "markdown");
    map.insert("markdown", "markdown");
    map.insert("yaml", "yaml");
    map.insert("yml", "yaml");
    map.insert("toml", "toml");
    map.insert("sql", "sql");
    map.insert("sh", "shell");
    map.insert("bash", "shell");

    map
});

/// Interpreter names (as they appear in shebang lines) mapped to language
/// identifiers.
static INTERPRETER_MAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("python", "python");
    map.insert("python3", "python");
    map.insert("node", "javascript");
    map.insert("deno", "typescript");
    map.insert("sh", "shell");
    map.insert("bash", "shell");
    map.insert("zsh", "shell");
    map
});

/// Matches `#!/usr/bin/python3` and `#!/usr/bin/env python3` shebangs,
/// capturing the interpreter name.
static SHEBANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#!\s*\S*/(?:env\s+)?([A-Za-z0-9_.+-]+)").expect("shebang pattern")
});

/// Identifies the language of a file from its path and, when the path is not
/// conclusive, its content.
#[derive(Debug, Default)]
pub struct LanguageDetector {
    overrides: HashMap<String, String>,
}

impl LanguageDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detects the language identifier for a file path.
    ///
    /// Checks manual overrides first, then the extension map. Returns `None`
    /// when nothing matches; callers pass that straight through as
    /// "highlighting disabled".
    pub fn detect<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let path = path.as_ref();
        if let Some(language) = self.overrides.get(path.to_string_lossy().as_ref()) {
            return Some(language.clone());
        }
        let extension = path.extension()?.to_str()?.to_lowercase();
        EXTENSION_MAP.get(extension.as_str()).map(|s| s.to_string())
    }

    /// Like [`detect`](Self::detect), but falls back to the content's
    /// shebang line for extensionless scripts.
    pub fn detect_with_content<P: AsRef<Path>>(&self, path: P, content: &str) -> Option<String> {
        self.detect(path).or_else(|| Self::detect_shebang(content))
    }

    /// Detects a language from a shebang line alone.
    pub fn detect_shebang(content: &str) -> Option<String> {
        let first_line = content.lines().next()?;
        let captures = SHEBANG.captures(first_line)?;
        let interpreter = captures.get(1)?.as_str();
        // `python3.12` and friends: strip trailing version digits.
        let trimmed = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
        INTERPRETER_MAP
            .get(interpreter)
            .or_else(|| INTERPRETER_MAP.get(trimmed))
            .map(|s| s.to_string())
    }

    /// Forces a language for a specific path, bypassing detection.
    pub fn set_override<P: AsRef<Path>>(&mut self, path: P, language: impl Into<String>) {
        self.overrides
            .insert(path.as_ref().to_string_lossy().into_owned(), language.into());
    }

    /// Removes a per-path override, returning the previous value.
    pub fn remove_override<P: AsRef<Path>>(&mut self, path: P) -> Option<String> {
        self.overrides.remove(path.as_ref().to_string_lossy().as_ref())
    }

    /// Clears all per-path overrides.
    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// All language identifiers the extension map can produce.
    pub fn known_languages() -> Vec<&'static str> {
        let mut languages: Vec<&'static str> = EXTENSION_MAP.values().copied().collect();
        languages.sort_unstable();
        languages.dedup();
        languages
    }
}
