// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The highlighting engine boundary.
//!
//! An engine is an opaque `(text, language) → styled fragment` function plus
//! theme state. The scheduler never looks inside it: it hands over a snapshot
//! of the text, receives fragment-local style runs back, and subscribes to a
//! notification channel that fires whenever the engine's theme changes.

use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::range::TextRange;
use crate::style::Style;

/// One styled run inside a [`StyledFragment`], in fragment-local byte
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentRun {
    pub range: TextRange,
    pub style: Style,
}

impl FragmentRun {
    pub fn new(range: TextRange, style: Style) -> Self {
        Self { range, style }
    }
}

/// The result of one highlighting computation: the text that was styled and
/// the runs covering it.
///
/// The fragment's `text` should equal the snapshot it was computed from; when
/// the buffer changed concurrently the two diverge and the scheduler discards
/// the fragment at merge time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledFragment {
    pub text: String,
    pub runs: Vec<FragmentRun>,
}

impl StyledFragment {
    /// A fragment covering `text` with a single plain-style run.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let runs = if text.is_empty() {
            Vec::new()
        } else {
            vec![FragmentRun::new(
                TextRange::new(0, text.len()),
                Style::plain(),
            )]
        };
        Self { text, runs }
    }
}

/// Receiver half of an engine's theme-change notifications.
///
/// Dropping the subscription unsubscribes; the engine prunes the dead sender
/// on its next broadcast.
#[derive(Debug)]
pub struct ThemeSubscription {
    rx: Receiver<()>,
}

impl ThemeSubscription {
    pub(crate) fn new(rx: Receiver<()>) -> Self {
        Self { rx }
    }

    /// Drains pending theme-change events without blocking, returning how
    /// many fired since the last drain.
    pub fn drain(&self) -> usize {
        let mut fired = 0;
        while self.rx.try_recv().is_ok() {
            fired += 1;
        }
        fired
    }
}

/// Fan-out helper engines use to broadcast theme changes to their
/// subscribers.
#[derive(Debug, Default)]
pub struct ThemeNotifier {
    senders: Mutex<Vec<Sender<()>>>,
}

impl ThemeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its handle.
    pub fn subscribe(&self) -> ThemeSubscription {
        let (tx, rx) = unbounded();
        self.senders.lock().unwrap().push(tx);
        ThemeSubscription::new(rx)
    }

    /// Notifies every live subscriber, dropping the ones that went away.
    pub fn notify(&self) {
        self.senders
            .lock()
            .unwrap()
            .retain(|tx| tx.send(()).is_ok());
    }
}

/// A syntax-highlighting engine.
///
/// Implementations must be shareable across the worker threads the scheduler
/// spawns; the buffer itself is never reachable from here, only dispatch-time
/// text snapshots.
pub trait HighlightEngine: Send + Sync {
    /// Computes styled runs for `text` under `language`.
    ///
    /// Returning `None` means "no highlighting available" (unknown language,
    /// engine declined) and the pass reports failure; an empty-but-valid
    /// fragment is a normal success.
    fn highlight(&self, text: &str, language: Option<&str>) -> Option<StyledFragment>;

    /// Switches the active theme by name and notifies subscribers when the
    /// theme actually changed.
    fn set_theme(&self, name: &str);

    /// The name of the active theme.
    fn theme(&self) -> String;

    /// Subscribes to theme-change notifications.
    fn subscribe(&self) -> ThemeSubscription;
}
