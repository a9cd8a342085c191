// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Deterministic core of a structured rich-text editor: persistent
//! document model, invertible step algebra, selection algebra, commands,
//! history and the plugin fabric. The whole engine is one pure function
//! from `(state, transaction)` to the next state; rendering, HTML
//! pipelines and feature plugins live with the host.

mod boundary;
mod commands;
mod doc;
mod editor;
mod error;
mod format;
mod history;
pub mod plugin;
mod schema;
mod selection;
mod state;
mod step;
#[cfg(test)]
mod tests;
mod transaction;

pub use crate::boundary::{
    next_grapheme_boundary, next_word_boundary, prev_grapheme_boundary,
    prev_word_boundary,
};
pub use crate::commands::{
    apply_attributed_mark, delete_backward, delete_forward,
    delete_soft_line_backward, delete_soft_line_forward,
    delete_word_backward, delete_word_forward, extend_tx, insert_text,
    is_attributed_mark_active, is_mark_active, mark_attr_at_selection,
    merge_block_backward, merge_block_forward, move_tx, node_sel_tx,
    paste_slice, remove_attributed_mark, select_all, split_block,
    toggle_bold, toggle_italic, toggle_mark, toggle_strike_through,
    toggle_underline, CommandFn, ContentSlice,
};
pub use crate::doc::{
    attr_str, attrs_of, default_rule, kinds, normalize_inline,
    validate_content, AttrMap, BlockId, BlockNode, Children, ContentRule,
    Doc, IdGenerator, InlineAtom, InlineNode, Mark, MarkSet, TextNode,
};
pub use crate::editor::{Editor, EditorConfig, HtmlPipeline};
pub use crate::error::{
    EditorError, InvariantViolation, RegistrationError, StepError,
};
pub use crate::format::InlineFormat;
pub use crate::history::History;
pub use crate::plugin::{
    events, Decoration, DecorationSet, EventBus, EventKey, HostHooks,
    MiddlewareFn, NoopHost, Plugin, PluginContext, PluginSurface,
    Registrations, ServiceKey, StateChangeEvent, StyleSheet,
    Subscription,
};
pub use crate::schema::{
    BlockTypePickerEntry, FileHandler, FileHandlerFn, FilePayload,
    InlineNodeSpec, InputRule, KeyBinding, MarkSpec, MarkWrapPlan,
    NodeSpec, NodeView, NodeViewFactory, ParseRule, SanitizeSpec,
    SchemaRegistry, SharedRegistry, ToolbarItem,
};
pub use crate::selection::{GapSide, Position, SelRange, Selection};
pub use crate::state::{validate_selection, EditorState, StateConfig};
pub use crate::step::{
    apply_all, apply_step, MarkTarget, Step, StepKind,
};
pub use crate::transaction::{
    invert_transaction, HistoryDirection, Metadata, Origin, Transaction,
    TransactionBuilder,
};
