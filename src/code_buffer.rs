// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! A text buffer that keeps itself syntax highlighted.
//!
//! [`CodeBuffer`] wires a [`StyledBuffer`] to a [`HighlightScheduler`] and is
//! what hosts embed: every character edit routed through it triggers an
//! incremental re-highlighting pass, and completed passes are folded back in
//! whenever the host calls [`pump`](CodeBuffer::pump) from its event loop
//! (or [`wait_idle`](CodeBuffer::wait_idle), in tests and batch tools).

use std::sync::Arc;
use std::time::Duration;

use crate::buffer::events::TextEdit;
use crate::buffer::styled_buffer::{AttrRun, StyledBuffer};
use crate::error::BufferError;
use crate::range::TextRange;
use crate::style::Style;
use crate::syntax::delegate::HighlightDelegate;
use crate::syntax::engine::HighlightEngine;
use crate::syntax::metrics::SchedulerMetrics;
use crate::syntax::scheduler::HighlightScheduler;

/// A styled text store plus the scheduler keeping it highlighted.
pub struct CodeBuffer {
    store: StyledBuffer,
    scheduler: HighlightScheduler,
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBuffer {
    /// Creates an empty buffer with no engine: a plain text store.
    pub fn new() -> Self {
        Self {
            store: StyledBuffer::new(),
            scheduler: HighlightScheduler::new(None),
        }
    }

    /// Creates an empty buffer highlighted by `engine`.
    pub fn with_engine(engine: Arc<dyn HighlightEngine>) -> Self {
        Self {
            store: StyledBuffer::new(),
            scheduler: HighlightScheduler::new(Some(engine)),
        }
    }

    /// Installs or removes the delegate gating and observing passes.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn HighlightDelegate>>) {
        self.scheduler.set_delegate(delegate);
    }

    /// The full current text.
    pub fn text(&self) -> &str {
        self.store.text()
    }

    /// The buffer length in bytes.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the buffer holds no text.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// The current attribute runs.
    pub fn runs(&self) -> &[AttrRun] {
        self.store.runs()
    }

    /// The style at `location` and the maximal run containing it.
    pub fn attributes_at(&self, location: usize) -> Result<(&Style, TextRange), BufferError> {
        self.store.attributes_at(location)
    }

    /// The live substring addressed by `range`.
    pub fn slice(&self, range: TextRange) -> Result<&str, BufferError> {
        self.store.slice(range)
    }

    /// Replaces the text addressed by `range`, triggering a pass over the
    /// enclosing paragraph. This is the keystroke-level entry point; hosts
    /// forward every edit, not just committed ones.
    pub fn replace_characters(
        &mut self,
        range: TextRange,
        new_text: &str,
    ) -> Result<(), BufferError> {
        let edit = self.store.replace_characters(range, new_text)?;
        self.scheduler.handle_edit(&self.store, &edit);
        // Fold in anything that finished while the user was typing.
        self.scheduler.pump(&mut self.store);
        Ok(())
    }

    /// Inserts `text` at `location`.
    pub fn insert(&mut self, location: usize, text: &str) -> Result<(), BufferError> {
        self.replace_characters(TextRange::empty_at(location), text)
    }

    /// Deletes the text addressed by `range`.
    pub fn delete(&mut self, range: TextRange) -> Result<(), BufferError> {
        self.replace_characters(range, "")
    }

    /// Replaces the whole content (initial load, external reload).
    pub fn set_text(&mut self, text: &str) {
        let full = TextRange::new(0, self.store.len());
        // The full range of the live buffer is always addressable.
        let _ = self.replace_characters(full, text);
    }

    /// The active language identifier.
    pub fn language(&self) -> Option<&str> {
        self.scheduler.language()
    }

    /// Sets the language and re-highlights the whole buffer; `None` disables
    /// highlighting and resets to plain styling.
    pub fn set_language(&mut self, language: Option<String>) {
        self.scheduler.set_language(&mut self.store, language);
    }

    /// Switches the engine's theme. The engine's change notification then
    /// drives one full-buffer pass through the normal pipeline.
    pub fn set_theme(&mut self, name: &str) {
        if let Some(engine) = self.scheduler.engine() {
            engine.set_theme(name);
        }
        self.pump();
    }

    /// Drains completed passes and theme events without blocking. Hosts
    /// call this once per event-loop turn.
    pub fn pump(&mut self) {
        self.scheduler.pump(&mut self.store);
    }

    /// Blocks until no pass is outstanding or `timeout` elapses; returns
    /// whether the buffer went idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        self.scheduler.wait_idle(&mut self.store, timeout)
    }

    /// Passes dispatched but not yet validated.
    pub fn passes_in_flight(&self) -> usize {
        self.scheduler.in_flight()
    }

    /// Scheduler counters and timings.
    pub fn metrics(&self) -> &SchedulerMetrics {
        self.scheduler.metrics()
    }

    /// Takes queued change notifications for a rendering host.
    pub fn drain_events(&mut self) -> Vec<TextEdit> {
        self.store.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;

    use crate::style::Color;
    use crate::syntax::engine::{
        FragmentRun, StyledFragment, ThemeNotifier, ThemeSubscription,
    };
    use crate::syntax::synoptic::SynopticEngine;
    use crate::syntax::theme::Theme;

    const WAIT: Duration = Duration::from_secs(5);

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Engine for scenario tests: styles `"x=1"` as two runs, everything
    /// else as one flat run.
    struct TwoRunEngine {
        notifier: ThemeNotifier,
    }

    impl TwoRunEngine {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                notifier: ThemeNotifier::new(),
            })
        }

        fn name_style() -> Style {
            Style::fg(Color::rgb(200, 50, 50))
        }

        fn value_style() -> Style {
            Style::fg(Color::rgb(50, 50, 200))
        }
    }

    impl HighlightEngine for TwoRunEngine {
        fn highlight(&self, text: &str, language: Option<&str>) -> Option<StyledFragment> {
            language?;
            if text == "x=1" {
                return Some(StyledFragment {
                    text: text.to_string(),
                    runs: vec![
                        FragmentRun::new(TextRange::new(0, 1), Self::name_style()),
                        FragmentRun::new(TextRange::new(1, 2), Self::value_style()),
                    ],
                });
            }
            let mut fragment = StyledFragment::plain(text);
            for run in &mut fragment.runs {
                run.style = Style::plain().with_bold();
            }
            Some(fragment)
        }

        fn set_theme(&self, _name: &str) {
            self.notifier.notify();
        }

        fn theme(&self) -> String {
            "dusk".to_string()
        }

        fn subscribe(&self) -> ThemeSubscription {
            self.notifier.subscribe()
        }
    }

    /// Delegate recording every hook invocation.
    #[derive(Default)]
    struct RecordingDelegate {
        allow: Mutex<bool>,
        gated: Mutex<Vec<TextRange>>,
        outcomes: Mutex<Vec<(TextRange, bool)>>,
    }

    impl RecordingDelegate {
        fn allowing() -> Arc<Self> {
            Arc::new(Self {
                allow: Mutex::new(true),
                ..Self::default()
            })
        }

        fn declining() -> Arc<Self> {
            Arc::new(Self {
                allow: Mutex::new(false),
                ..Self::default()
            })
        }
    }

    impl HighlightDelegate for RecordingDelegate {
        fn should_highlight(&self, range: TextRange) -> bool {
            self.gated.lock().unwrap().push(range);
            *self.allow.lock().unwrap()
        }

        fn did_highlight(&self, range: TextRange, success: bool) {
            self.outcomes.lock().unwrap().push((range, success));
        }
    }

    #[test]
    fn test_plain_buffer_without_engine() {
        init_logging();
        let mut buffer = CodeBuffer::new();
        buffer.set_text("hello\nworld\n");
        buffer.set_language(Some("rust".to_string()));
        assert!(buffer.wait_idle(WAIT));

        assert_eq!(buffer.text(), "hello\nworld\n");
        assert_eq!(buffer.metrics().passes_dispatched, 0);
        assert_eq!(buffer.runs().len(), 1);
        assert_eq!(buffer.runs()[0].style, Style::plain());
    }

    #[test]
    fn test_language_unset_skips_dispatch_entirely() {
        // Scenario: content present, language never set.
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_text("def f():\n    pass\n");
        assert!(buffer.wait_idle(WAIT));

        assert_eq!(buffer.metrics().passes_dispatched, 0);
        assert_eq!(buffer.runs().len(), 1);
        assert_eq!(buffer.runs()[0].range, TextRange::new(0, buffer.len()));
        assert_eq!(buffer.runs()[0].style, Style::plain());
    }

    #[test]
    fn test_two_run_merge_lands_distinct_attributes() {
        // Scenario: engine splits "x=1" into [0,1) and [1,3).
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_text("x=1");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));

        let (name, name_range) = buffer.attributes_at(0).unwrap();
        assert_eq!(name, &TwoRunEngine::name_style());
        assert_eq!(name_range, TextRange::new(0, 1));

        let (value, value_range) = buffer.attributes_at(1).unwrap();
        assert_eq!(value, &TwoRunEngine::value_style());
        assert_eq!(value_range, TextRange::new(1, 2));
    }

    #[test]
    fn test_truncation_below_pending_range_discards() {
        // Scenario: pass over [0,10) outlives a truncation to length 5.
        init_logging();
        let delegate = RecordingDelegate::allowing();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_text("0123456789");
        buffer.set_delegate(Some(delegate.clone()));
        buffer.set_language(Some("python".to_string()));
        assert_eq!(buffer.passes_in_flight(), 1);

        // Truncate before draining the pending completion. This edit fires
        // its own pass over the shortened paragraph.
        buffer.delete(TextRange::new(5, 5)).unwrap();
        assert_eq!(buffer.len(), 5);
        assert!(buffer.wait_idle(WAIT));

        let outcomes = delegate.outcomes.lock().unwrap();
        assert!(outcomes.contains(&(TextRange::new(0, 10), false)));
        assert!(outcomes.contains(&(TextRange::new(0, 5), true)));
        assert_eq!(buffer.metrics().passes_discarded, 1);
        assert_eq!(buffer.metrics().passes_merged, 1);
    }

    #[test]
    fn test_disjoint_edits_both_styled() {
        // Scenario: passes over two disjoint paragraphs; completion order
        // must not matter for the final state.
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_text("alpha\nbeta\n");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));

        buffer.replace_characters(TextRange::new(0, 1), "A").unwrap();
        buffer.replace_characters(TextRange::new(6, 1), "B").unwrap();
        assert!(buffer.wait_idle(WAIT));

        assert_eq!(buffer.text(), "Alpha\nBeta\n");
        assert_eq!(
            buffer.attributes_at(0).unwrap().0,
            &Style::plain().with_bold()
        );
        assert_eq!(
            buffer.attributes_at(6).unwrap().0,
            &Style::plain().with_bold()
        );
    }

    #[test]
    fn test_gate_decline_skips_pass_and_observer() {
        init_logging();
        let delegate = RecordingDelegate::declining();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_delegate(Some(delegate.clone()));
        buffer.set_text("x=1");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));

        assert_eq!(
            delegate.gated.lock().unwrap().as_slice(),
            &[TextRange::new(0, 3)]
        );
        assert!(delegate.outcomes.lock().unwrap().is_empty());
        assert_eq!(buffer.metrics().passes_dispatched, 0);
        assert_eq!(buffer.metrics().gate_declined, 1);
        assert_eq!(buffer.attributes_at(0).unwrap().0, &Style::plain());
    }

    #[test]
    fn test_did_highlight_reports_each_dispatched_pass() {
        init_logging();
        let delegate = RecordingDelegate::allowing();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_delegate(Some(delegate.clone()));
        buffer.set_language(Some("python".to_string()));
        buffer.set_text("x=1");
        assert!(buffer.wait_idle(WAIT));

        let outcomes = delegate.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0], (TextRange::new(0, 3), true));
    }

    #[test]
    fn test_theme_change_triggers_exactly_one_full_pass() {
        init_logging();
        let delegate = RecordingDelegate::allowing();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_text("line one\nline two\n");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));
        let dispatched_before = buffer.metrics().passes_dispatched;
        buffer.set_delegate(Some(delegate.clone()));

        buffer.set_theme("daylight");
        assert!(buffer.wait_idle(WAIT));

        assert_eq!(buffer.metrics().passes_dispatched, dispatched_before + 1);
        let outcomes = delegate.outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0], (TextRange::new(0, buffer.len()), true));
    }

    #[test]
    fn test_clearing_language_resets_to_plain() {
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_language(Some("python".to_string()));
        buffer.set_text("x=1");
        assert!(buffer.wait_idle(WAIT));
        assert_ne!(buffer.attributes_at(0).unwrap().0, &Style::plain());

        buffer.set_language(None);
        assert_eq!(buffer.runs().len(), 1);
        assert_eq!(buffer.runs()[0].style, Style::plain());
        assert_eq!(buffer.metrics().skipped_unconfigured, 0);
    }

    #[test]
    fn test_idempotent_rehighlight_same_coverage() {
        init_logging();
        let engine: Arc<dyn HighlightEngine> = Arc::new(SynopticEngine::new());
        let mut buffer = CodeBuffer::with_engine(engine);
        buffer.set_text("def f():\n    return 1\n");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));
        let first: Vec<AttrRun> = buffer.runs().to_vec();

        // A second full pass over unchanged text.
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));
        assert_eq!(buffer.runs(), first.as_slice());
    }

    #[test]
    fn test_synoptic_end_to_end_incremental_edit() {
        init_logging();
        let engine: Arc<dyn HighlightEngine> = Arc::new(SynopticEngine::new());
        let mut buffer = CodeBuffer::with_engine(engine);
        buffer.set_text("def f():\n    return 1\n");
        buffer.set_language(Some("python".to_string()));
        assert!(buffer.wait_idle(WAIT));

        let keyword = Theme::default().style_for("keyword");
        assert_eq!(buffer.attributes_at(0).unwrap().0, &keyword);

        // Keep typing; the new keyword gets picked up incrementally.
        buffer.insert(buffer.len(), "while True:\n").unwrap();
        assert!(buffer.wait_idle(WAIT));
        let (style, _) = buffer.attributes_at(22).unwrap();
        assert_eq!(style, &keyword);
    }

    #[test]
    fn test_rapid_edit_burst_converges() {
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_language(Some("python".to_string()));
        for chunk in ["a", "b", "c", "d", "e"] {
            buffer.insert(buffer.len(), chunk).unwrap();
        }
        assert!(buffer.wait_idle(WAIT));

        // Every pass completed one way or the other, and whatever merged
        // last left exact coverage.
        assert_eq!(
            buffer.metrics().passes_completed(),
            buffer.metrics().passes_dispatched
        );
        assert_eq!(buffer.text(), "abcde");
        assert_eq!(buffer.runs().len(), 1);
        assert_eq!(buffer.runs()[0].range, TextRange::new(0, 5));
    }

    #[test]
    fn test_pass_timing_recorded() {
        init_logging();
        let mut buffer = CodeBuffer::with_engine(TwoRunEngine::new());
        buffer.set_language(Some("python".to_string()));
        let started = Instant::now();
        buffer.set_text("x=1");
        assert!(buffer.wait_idle(WAIT));
        assert!(buffer.metrics().avg_pass_time() <= started.elapsed());
        assert!(buffer.metrics().max_pass_time > Duration::ZERO);
    }
}
