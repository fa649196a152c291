// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A [`HighlightEngine`] backed by the Synoptic regex highlighter.
//!
//! Rule sets are compiled per call from the language identifier, so
//! concurrent passes never contend on shared grammar state; the only shared
//! state is the active theme.

use std::sync::Mutex;

use synoptic::{Highlighter, TokOpt};

use crate::range::TextRange;
use crate::style::Style;
use crate::syntax::engine::{
    FragmentRun, HighlightEngine, StyledFragment, ThemeNotifier, ThemeSubscription,
};
use crate::syntax::theme::Theme;

const TAB_WIDTH: usize = 4;

/// Maps language identifiers to the extension Synoptic's bundled rule sets
/// are keyed by.
fn primary_extension(language: &str) -> Option<&'static str> {
    Some(match language {
        "rust" => "rs",
        "javascript" => "js",
        "typescript" => "ts",
        "python" => "py",
        "json" => "json",
        "html" => "html",
        "css" => "css",
        "markdown" => "md",
        "yaml" => "yaml",
        "toml" => "toml",
        "sql" => "sql",
        "shell" => "sh",
        _ => return None,
    })
}

/// Synoptic's bundled rules use a few kind names our themes spell
/// differently.
fn normalize_kind(kind: &str) -> &str {
    match kind {
        "digit" => "number",
        "struct" => "type",
        _ => kind,
    }
}

/// A regex-rule highlighting engine with a named theme.
pub struct SynopticEngine {
    theme: Mutex<Theme>,
    notifier: ThemeNotifier,
}

impl Default for SynopticEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SynopticEngine {
    /// Creates an engine with the default theme.
    pub fn new() -> Self {
        Self::with_theme(Theme::default())
    }

    /// Creates an engine with a specific theme.
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme: Mutex::new(theme),
            notifier: ThemeNotifier::new(),
        }
    }

    /// Builds a rule set for `language`: Synoptic's bundled rules when it
    /// knows the language, otherwise a minimal keyword/string/comment set.
    fn build_highlighter(language: &str) -> Option<Highlighter> {
        if let Some(extension) = primary_extension(language) {
            if let Some(highlighter) = synoptic::from_extension(extension, TAB_WIDTH) {
                return Some(highlighter);
            }
        }

        let mut highlighter = Highlighter::new(TAB_WIDTH);
        match language {
            "rust" => {
                highlighter.keyword(
                    "keyword",
                    r"\b(fn|let|mut|pub|struct|enum|impl|trait|use|mod|const|static|if|else|match|for|while|loop|break|continue|return)\b",
                );
                highlighter.keyword("string", r#""[^"]*""#);
                highlighter.keyword("comment", r"//.*$");
                highlighter.bounded("comment", r"/\*", r"\*/", false);
            }
            "javascript" | "typescript" => {
                highlighter.keyword(
                    "keyword",
                    r"\b(function|var|let|const|if|else|for|while|do|switch|case|break|continue|return|class|extends|import|export|from|default)\b",
                );
                highlighter.keyword("string", r#""[^"]*"|'[^']*'|`[^`]*`"#);
                highlighter.keyword("comment", r"//.*$");
                highlighter.bounded("comment", r"/\*", r"\*/", false);
            }
            "python" => {
                highlighter.keyword(
                    "keyword",
                    r"\b(def|class|if|elif|else|for|while|try|except|finally|with|import|from|as|return|yield|lambda|pass|break|continue)\b",
                );
                highlighter.keyword("string", r#""[^"]*"|'[^']*'"#);
                highlighter.keyword("comment", r"#.*$");
                highlighter.keyword("number", r"\b\d+(\.\d+)?\b");
            }
            "json" => {
                highlighter.keyword("string", r#""[^"]*""#);
                highlighter.keyword("number", r"\b\d+(\.\d+)?\b");
                highlighter.keyword("boolean", r"\b(true|false|null)\b");
            }
            "shell" => {
                highlighter.keyword(
                    "keyword",
                    r"\b(if|then|else|elif|fi|for|in|do|done|while|case|esac|function|return|exit|export|local)\b",
                );
                highlighter.keyword("string", r#""[^"]*"|'[^']*'"#);
                highlighter.keyword("comment", r"#.*$");
            }
            _ => return None,
        }
        Some(highlighter)
    }

    /// Turns per-line Synoptic tokens into fragment runs covering `text`
    /// exactly, styling token kinds through `theme`.
    fn assemble_fragment(text: &str, highlighter: &mut Highlighter, theme: &Theme) -> StyledFragment {
        let lines: Vec<String> = text.split('\n').map(String::from).collect();
        highlighter.run(&lines);

        let mut runs: Vec<FragmentRun> = Vec::new();
        let push = |runs: &mut Vec<FragmentRun>, start: usize, length: usize, style: Style| {
            if length == 0 {
                return;
            }
            match runs.last_mut() {
                Some(last) if last.style == style && last.range.end() == start => {
                    last.range.length += length;
                }
                _ => runs.push(FragmentRun::new(TextRange::new(start, length), style)),
            }
        };

        let mut offset = 0;
        for (y, line) in lines.iter().enumerate() {
            let line_end = offset + line.len();
            let mut cursor = offset;
            for token in highlighter.line(y, line) {
                // Tab expansion can make token text longer than the source
                // line; stay inside it so runs keep partitioning the text.
                if cursor >= line_end {
                    break;
                }
                let (token_len, style) = match &token {
                    TokOpt::Some(text, kind) => (
                        text.len(),
                        theme.style_for(normalize_kind(kind)),
                    ),
                    TokOpt::None(text) => (text.len(), Style::plain()),
                };
                let length = token_len.min(line_end - cursor);
                push(&mut runs, cursor, length, style);
                cursor += length;
            }
            if cursor < line_end {
                push(&mut runs, cursor, line_end - cursor, Style::plain());
            }
            // The newline separator the split removed.
            if line_end < text.len() {
                push(&mut runs, line_end, 1, Style::plain());
            }
            offset = line_end + 1;
        }

        StyledFragment {
            text: text.to_string(),
            runs,
        }
    }
}

impl HighlightEngine for SynopticEngine {
    fn highlight(&self, text: &str, language: Option<&str>) -> Option<StyledFragment> {
        let language = language?;
        let mut highlighter = Self::build_highlighter(language)?;
        let theme = self.theme.lock().unwrap().clone();
        Some(Self::assemble_fragment(text, &mut highlighter, &theme))
    }

    fn set_theme(&self, name: &str) {
        let Some(theme) = Theme::named(name) else {
            log::warn!("unknown theme {name:?}, keeping {:?}", self.theme());
            return;
        };
        {
            let mut active = self.theme.lock().unwrap();
            if active.name() == name {
                return;
            }
            *active = theme;
        }
        self.notifier.notify();
    }

    fn theme(&self) -> String {
        self.theme.lock().unwrap().name().to_string()
    }

    fn subscribe(&self) -> ThemeSubscription {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_partitions(fragment: &StyledFragment) {
        let mut cursor = 0;
        for run in &fragment.runs {
            assert_eq!(run.range.location, cursor, "gap or overlap in fragment runs");
            assert!(run.range.length > 0);
            cursor = run.range.end();
        }
        assert_eq!(cursor, fragment.text.len());
    }

    #[test]
    fn test_no_language_declines() {
        let engine = SynopticEngine::new();
        assert!(engine.highlight("fn main() {}", None).is_none());
        assert!(engine.highlight("text", Some("klingon")).is_none());
    }

    #[test]
    fn test_rust_keywords_styled() {
        let engine = SynopticEngine::new();
        let fragment = engine.highlight("fn main() {}\n", Some("rust")).unwrap();
        assert_eq!(fragment.text, "fn main() {}\n");
        assert_partitions(&fragment);

        let keyword_style = Theme::default().style_for("keyword");
        let styled = fragment
            .runs
            .iter()
            .any(|run| run.style == keyword_style && run.range.location == 0);
        assert!(styled, "expected a keyword run at the start: {:?}", fragment.runs);
    }

    #[test]
    fn test_multiline_fragment_partitions() {
        let engine = SynopticEngine::new();
        let source = "def f():\n    return 'x'  # done\n\nprint(f())\n";
        let fragment = engine.highlight(source, Some("python")).unwrap();
        assert_eq!(fragment.text, source);
        assert_partitions(&fragment);
    }

    #[test]
    fn test_same_input_same_runs() {
        let engine = SynopticEngine::new();
        let source = "let x = \"hi\";\n";
        let first = engine.highlight(source, Some("rust")).unwrap();
        let second = engine.highlight(source, Some("rust")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_theme_switch_changes_output_and_notifies() {
        let engine = SynopticEngine::new();
        let subscription = engine.subscribe();
        let source = "def f():\n";
        let before = engine.highlight(source, Some("python")).unwrap();

        engine.set_theme("daylight");
        assert_eq!(engine.theme(), "daylight");
        assert_eq!(subscription.drain(), 1);

        let after = engine.highlight(source, Some("python")).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_unknown_or_redundant_theme_does_not_notify() {
        let engine = SynopticEngine::new();
        let subscription = engine.subscribe();
        engine.set_theme("no-such-theme");
        engine.set_theme("dusk"); // already active
        assert_eq!(subscription.drain(), 0);
        assert_eq!(engine.theme(), "dusk");
    }

    #[test]
    fn test_empty_text_yields_empty_fragment() {
        let engine = SynopticEngine::new();
        let fragment = engine.highlight("", Some("rust")).unwrap();
        assert!(fragment.runs.is_empty());
        assert_eq!(fragment.text, "");
    }
}
