// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Delegate hooks around each highlighting pass.

use crate::range::TextRange;

/// Hooks a host can implement to gate and observe highlighting passes.
///
/// Both methods have default implementations; implement either one or both.
/// They are invoked synchronously on the context that owns the buffer and
/// must not block.
pub trait HighlightDelegate: Send + Sync {
    /// Called before a pass over `range` is dispatched. Returning `false`
    /// skips the pass; the region keeps its previous attributes until a
    /// future edit re-triggers it.
    fn should_highlight(&self, _range: TextRange) -> bool {
        true
    }

    /// Called exactly once per dispatched pass with its outcome. `success`
    /// is `false` when the result was stale, out of bounds, or the engine
    /// returned nothing. Never called for passes the gate declined.
    fn did_highlight(&self, _range: TextRange, _success: bool) {}
}
