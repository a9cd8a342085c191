// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod registry;
mod specs;

pub use registry::{MarkWrapPlan, SchemaRegistry};
pub use specs::{
    AtomHtmlFn, BlockTypePickerEntry, FileHandler, FileHandlerFn,
    FilePayload, InlineNodeSpec, InputRule, KeyBinding, MarkHtmlFn,
    MarkSpec, MarkStyleFn, NodeHtmlFn, NodeSpec, NodeView,
    NodeViewFactory, ParseRule, SanitizeSpec, ToolbarItem,
};

use parking_lot::RwLock;
use std::sync::Arc;

/// The registry handle shared between the editor, its states and plugin
/// contexts. Dispatch is single-threaded; the lock is plumbing for the
/// shared ownership, not a concurrency feature.
pub type SharedRegistry = Arc<RwLock<SchemaRegistry>>;

pub fn shared(registry: SchemaRegistry) -> SharedRegistry {
    Arc::new(RwLock::new(registry))
}
