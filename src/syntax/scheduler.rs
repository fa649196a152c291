// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The edit → gate → dispatch → validate → merge protocol.
//!
//! Each character edit expands to the enclosing paragraph and becomes one
//! *pass*: a snapshot of that region is handed to the engine on a worker
//! thread, and the completed result travels back over a channel to be
//! validated against the buffer's live content before anything is written.
//! Passes are never cancelled; a result that no longer matches the buffer is
//! simply discarded. Edits that land while passes are outstanding start new,
//! independent passes.
//!
//! The validation deliberately compares *content*, not a version counter: an
//! undo that restores the exact dispatched text keeps the in-flight result
//! mergeable, and that is the intended behavior.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::buffer::events::{EditKind, TextEdit};
use crate::buffer::styled_buffer::StyledBuffer;
use crate::range::TextRange;
use crate::style::Style;
use crate::syntax::delegate::HighlightDelegate;
use crate::syntax::engine::{HighlightEngine, StyledFragment, ThemeSubscription};
use crate::syntax::metrics::SchedulerMetrics;

/// Snapshot captured when a pass is dispatched; consumed exactly once when
/// its completion is validated.
#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pass: u64,
    /// The safe range the pass covers, in dispatch-time coordinates.
    pub range: TextRange,
    /// Buffer length at dispatch time.
    pub snapshot_len: usize,
    /// The text of `range` at dispatch time.
    pub expected_text: String,
    /// The language the engine was asked to use.
    pub language: String,
    dispatched_at: Instant,
}

/// A finished engine computation travelling back to the mutator context.
struct PassCompletion {
    request: HighlightRequest,
    fragment: Option<StyledFragment>,
}

/// Why a completed pass was not merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiscardReason {
    /// The buffer is now shorter than the pass's range.
    BufferShrunk,
    /// The range's live text no longer matches the dispatch snapshot.
    ContentChanged,
    /// The engine returned no fragment for this language.
    EngineDeclined,
}

/// Schedules asynchronous highlighting passes over a [`StyledBuffer`].
///
/// The scheduler holds no buffer state beyond the lifetime of one request.
/// All of its entry points run on the context that owns the buffer; only the
/// engine computation itself runs elsewhere.
pub struct HighlightScheduler {
    engine: Option<Arc<dyn HighlightEngine>>,
    language: Option<String>,
    delegate: Option<Arc<dyn HighlightDelegate>>,
    completion_tx: Sender<PassCompletion>,
    completion_rx: Receiver<PassCompletion>,
    theme_events: Option<ThemeSubscription>,
    in_flight: usize,
    next_pass: u64,
    metrics: SchedulerMetrics,
}

impl HighlightScheduler {
    /// Creates a scheduler. Without an engine every trigger is a no-op and
    /// the buffer behaves as a plain text store.
    ///
    /// The theme-change subscription is taken here, once; it lives as long
    /// as the scheduler.
    pub fn new(engine: Option<Arc<dyn HighlightEngine>>) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        let theme_events = engine.as_ref().map(|engine| engine.subscribe());
        Self {
            engine,
            language: None,
            delegate: None,
            completion_tx,
            completion_rx,
            theme_events,
            in_flight: 0,
            next_pass: 0,
            metrics: SchedulerMetrics::default(),
        }
    }

    /// The engine this scheduler dispatches to, if any.
    pub fn engine(&self) -> Option<&Arc<dyn HighlightEngine>> {
        self.engine.as_ref()
    }

    /// Installs or removes the delegate consulted around each pass.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn HighlightDelegate>>) {
        self.delegate = delegate;
    }

    /// The active language identifier.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Sets the language and re-highlights the whole buffer under it.
    ///
    /// Clearing the language disables highlighting and resets the buffer to
    /// the plain style.
    pub fn set_language(&mut self, store: &mut StyledBuffer, language: Option<String>) {
        self.language = language;
        match self.language {
            Some(_) => self.request_highlight(store, TextRange::new(0, store.len())),
            None => {
                if !store.is_empty() {
                    let full = TextRange::new(0, store.len());
                    if let Err(err) = store.set_attributes(Style::plain(), full) {
                        log::warn!("failed to reset styling: {err}");
                    }
                }
            }
        }
    }

    /// Reacts to an edit notification from the store. Character edits
    /// trigger a pass over the enclosing paragraph; attribute edits are
    /// ignored.
    pub fn handle_edit(&mut self, store: &StyledBuffer, edit: &TextEdit) {
        if edit.kind != EditKind::Characters {
            return;
        }
        let safe_range = store.paragraph_range(edit.range);
        self.request_highlight(store, safe_range);
    }

    /// Runs one pass over `range`: gate, snapshot, dispatch.
    ///
    /// An empty range (notably the whole of an empty buffer) is a valid
    /// no-op. Missing engine or language are fast paths, not errors.
    pub fn request_highlight(&mut self, store: &StyledBuffer, range: TextRange) {
        let range = range.clamped_to(store.len());
        if range.is_empty() {
            return;
        }
        let Some(engine) = self.engine.clone() else {
            self.metrics.skipped_unconfigured += 1;
            return;
        };
        let Some(language) = self.language.clone() else {
            self.metrics.skipped_unconfigured += 1;
            return;
        };

        if let Some(delegate) = &self.delegate {
            if !delegate.should_highlight(range) {
                self.metrics.gate_declined += 1;
                log::debug!("delegate declined pass over {range:?}");
                return;
            }
        }

        let expected_text = match store.slice(range) {
            Ok(text) => text.to_string(),
            Err(err) => {
                // Safe-range computation landed somewhere unaddressable;
                // abort the pass, a future edit will re-trigger it.
                log::debug!("aborting pass over {range:?}: {err}");
                return;
            }
        };

        let request = HighlightRequest {
            pass: self.next_pass,
            range,
            snapshot_len: store.len(),
            expected_text,
            language,
            dispatched_at: Instant::now(),
        };
        self.next_pass += 1;
        self.dispatch(engine, request);
    }

    /// Hands a request to a worker thread. The worker owns nothing but the
    /// snapshot and the sending half of the completion channel.
    fn dispatch(&mut self, engine: Arc<dyn HighlightEngine>, request: HighlightRequest) {
        let tx = self.completion_tx.clone();
        let name = format!("glint-pass-{}", request.pass);
        let spawned = thread::Builder::new().name(name).spawn(move || {
            let fragment = engine.highlight(&request.expected_text, Some(&request.language));
            // The receiver only goes away when the scheduler does.
            let _ = tx.send(PassCompletion { request, fragment });
        });
        match spawned {
            Ok(_) => {
                self.in_flight += 1;
                self.metrics.passes_dispatched += 1;
            }
            Err(err) => {
                log::warn!("could not spawn highlight worker: {err}");
            }
        }
    }

    /// Drains pending theme-change events and completed passes without
    /// blocking. Hosts call this from their event loop.
    pub fn pump(&mut self, store: &mut StyledBuffer) {
        self.drain_theme_events(store);
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.process_completion(store, completion);
        }
    }

    /// Blocks until every outstanding pass has been validated, or `timeout`
    /// elapses. Returns whether the scheduler went idle.
    pub fn wait_idle(&mut self, store: &mut StyledBuffer, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.drain_theme_events(store);
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.completion_rx.recv_timeout(deadline - now) {
                Ok(completion) => {
                    self.process_completion(store, completion);
                    self.drain_theme_events(store);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return true,
            }
        }
        true
    }

    /// Passes dispatched but not yet validated.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Counters and timings accumulated so far.
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }

    /// A theme change means every styled byte is stale: issue one
    /// full-buffer pass per event, through the normal gate and validation.
    fn drain_theme_events(&mut self, store: &mut StyledBuffer) {
        let fired = self.theme_events.as_ref().map_or(0, |sub| sub.drain());
        for _ in 0..fired {
            self.request_highlight(store, TextRange::new(0, store.len()));
        }
    }

    /// Validates one completion against the live buffer and merges or
    /// discards it, reporting the outcome to the delegate either way.
    fn process_completion(&mut self, store: &mut StyledBuffer, completion: PassCompletion) {
        self.in_flight -= 1;
        let PassCompletion { request, fragment } = completion;
        let elapsed = request.dispatched_at.elapsed();

        let outcome = Self::validate_and_merge(store, &request, fragment);
        match outcome {
            Ok(()) => {
                self.metrics.record_merge(elapsed);
                log::debug!(
                    "pass {} merged over {:?} in {elapsed:?}",
                    request.pass,
                    request.range
                );
            }
            Err(reason) => {
                self.metrics.record_discard(elapsed);
                log::debug!(
                    "pass {} discarded over {:?}: {reason:?}",
                    request.pass,
                    request.range
                );
            }
        }
        if let Some(delegate) = &self.delegate {
            delegate.did_highlight(request.range, outcome.is_ok());
        }
    }

    fn validate_and_merge(
        store: &mut StyledBuffer,
        request: &HighlightRequest,
        fragment: Option<StyledFragment>,
    ) -> Result<(), DiscardReason> {
        let fragment = fragment.ok_or(DiscardReason::EngineDeclined)?;

        if !request.range.fits(store.len()) {
            return Err(DiscardReason::BufferShrunk);
        }
        match store.slice(request.range) {
            Ok(live) if live == request.expected_text => {}
            _ => return Err(DiscardReason::ContentChanged),
        }
        // An engine that rewrote the text cannot be merged positionally.
        if fragment.text != request.expected_text {
            return Err(DiscardReason::ContentChanged);
        }

        store.begin_batch();
        for run in &fragment.runs {
            let start = request.range.location + run.range.location;
            if start >= store.len() {
                break;
            }
            let length = run.range.length.min(store.len() - start);
            if length == 0 {
                continue;
            }
            if let Err(err) = store.set_attributes(run.style.clone(), TextRange::new(start, length))
            {
                log::warn!("skipping unmergeable run at {start}: {err}");
            }
        }
        store.end_batch();
        Ok(())
    }
}
