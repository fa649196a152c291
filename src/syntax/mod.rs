// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Asynchronous incremental highlighting.
//!
//! Everything concurrent lives here: the engine boundary, the scheduler
//! driving the edit → gate → dispatch → validate → merge protocol, and the
//! supporting language detection, theming, and metrics.

pub mod delegate;
pub mod engine;
pub mod language;
pub mod metrics;
pub mod scheduler;
pub mod synoptic;
pub mod theme;

pub use delegate::HighlightDelegate;
pub use engine::{FragmentRun, HighlightEngine, StyledFragment, ThemeNotifier, ThemeSubscription};
pub use language::LanguageDetector;
pub use metrics::SchedulerMetrics;
pub use scheduler::{HighlightRequest, HighlightScheduler};
pub use synoptic::SynopticEngine;
pub use theme::Theme;
