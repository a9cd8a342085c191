// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Commands: pure functions `(state, …) → Option<Transaction>`. A command
//! that fails a precondition (wrong selection kind, missing block)
//! returns `None` and the dispatcher no-ops.

pub mod delete_text;
pub mod format;
pub mod motion;
pub mod new_lines;
pub mod paste;
pub mod replace_text;

pub use delete_text::{
    delete_backward, delete_forward, delete_soft_line_backward,
    delete_soft_line_forward, delete_word_backward, delete_word_forward,
};
pub use format::{
    apply_attributed_mark, is_attributed_mark_active, is_mark_active,
    mark_attr_at_selection, remove_attributed_mark, toggle_bold,
    toggle_italic, toggle_mark, toggle_strike_through, toggle_underline,
};
pub use motion::{extend_tx, move_tx, node_sel_tx, select_all};
pub use new_lines::{
    merge_block_backward, merge_block_forward, split_block,
};
pub use paste::{paste_slice, ContentSlice};
pub use replace_text::insert_text;

use std::sync::Arc;

use crate::doc::inline;
use crate::doc::{BlockId, BlockNode, InlineNode, Mark, TextNode};
use crate::selection::{Position, SelRange};
use crate::state::EditorState;
use crate::step::Step;

/// One leaf-block segment of a (possibly cross-block) text range.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RangeSegment {
    pub block_id: BlockId,
    pub from: usize,
    pub to: usize,
}

/// Decompose a normalized range into per-leaf-block segments in document
/// order. `None` when an endpoint does not resolve to an inline block.
pub(crate) fn range_segments(
    state: &EditorState,
    range: &SelRange,
) -> Option<Vec<RangeSegment>> {
    let from_block = state.block(&range.from.block_id)?;
    if !from_block.is_inline_block() {
        return None;
    }
    if range.from.block_id == range.to.block_id {
        return Some(vec![RangeSegment {
            block_id: range.from.block_id.clone(),
            from: range.from.offset,
            to: range.to.offset,
        }]);
    }
    let to_block = state.block(&range.to.block_id)?;
    if !to_block.is_inline_block() {
        return None;
    }
    let leaves = state.doc().leaf_order();
    let start = leaves.iter().position(|b| b == &range.from.block_id)?;
    let end = leaves.iter().position(|b| b == &range.to.block_id)?;
    if start > end {
        return None;
    }
    let mut segments = vec![RangeSegment {
        block_id: range.from.block_id.clone(),
        from: range.from.offset,
        to: from_block.inline_len(),
    }];
    for id in &leaves[start + 1..end] {
        let len = state.block_len(id)?;
        segments.push(RangeSegment {
            block_id: id.clone(),
            from: 0,
            to: len,
        });
    }
    segments.push(RangeSegment {
        block_id: range.to.block_id.clone(),
        from: 0,
        to: range.to.offset,
    });
    Some(segments)
}

/// Steps removing `from..to` inside one block, decomposed so text runs
/// are captured per-slice and atoms are removed individually. Emitted in
/// descending position order so offsets stay valid while the steps apply.
pub(crate) fn inline_delete_steps(
    block: &BlockNode,
    from: usize,
    to: usize,
) -> Vec<Step> {
    let Some(children) = block.inline_children() else {
        return Vec::new();
    };
    // Contiguous regions of the slice: text runs grouped, atoms alone.
    enum Region {
        Text {
            start: usize,
            end: usize,
            runs: Vec<TextNode>,
        },
        Atom {
            start: usize,
            atom: crate::doc::InlineAtom,
        },
    }
    let mut regions: Vec<Region> = Vec::new();
    let mut pos = from;
    for node in inline::slice_range(children, from, to) {
        let len = node.char_len();
        match node {
            InlineNode::Text(run) => match regions.last_mut() {
                Some(Region::Text { end, runs, .. }) if *end == pos => {
                    *end += len;
                    runs.push(run);
                }
                _ => regions.push(Region::Text {
                    start: pos,
                    end: pos + len,
                    runs: vec![run],
                }),
            },
            InlineNode::Atom(atom) => {
                regions.push(Region::Atom { start: pos, atom })
            }
        }
        pos += len;
    }
    regions
        .into_iter()
        .rev()
        .map(|region| match region {
            Region::Text { start, end, runs } => Step::DeleteText {
                block_id: block.id().clone(),
                from: start,
                to: end,
                captured: runs,
            },
            Region::Atom { start, atom } => Step::RemoveInlineNode {
                block_id: block.id().clone(),
                offset: start,
                captured: atom,
            },
        })
        .collect()
}

/// Steps inserting inline nodes at an offset, ascending so each step's
/// offset accounts for the content the previous one added.
pub(crate) fn inline_insert_steps(
    block_id: &BlockId,
    offset: usize,
    nodes: &[InlineNode],
) -> Vec<Step> {
    let mut steps = Vec::new();
    let mut pos = offset;
    for node in nodes {
        match node {
            InlineNode::Text(run) => {
                if run.is_empty() {
                    continue;
                }
                steps.push(Step::InsertText {
                    block_id: block_id.clone(),
                    offset: pos,
                    segments: vec![run.clone()],
                });
            }
            InlineNode::Atom(atom) => {
                steps.push(Step::InsertInlineNode {
                    block_id: block_id.clone(),
                    offset: pos,
                    atom: atom.clone(),
                });
            }
        }
        pos += node.char_len();
    }
    steps
}

/// Steps deleting a whole (normalized) selection range, plus the caret
/// position left behind.
///
/// Endpoints in the same parent get the full treatment: both edges
/// trimmed, intermediate siblings removed, the right block merged into
/// the left. Endpoints under different parents are trimmed without
/// merging (the view layer prevents most such selections).
pub(crate) fn delete_range_steps(
    state: &EditorState,
    range: &SelRange,
) -> Option<(Vec<Step>, Position)> {
    let caret = range.from.clone();
    if range.from.block_id == range.to.block_id {
        let block = state.block(&range.from.block_id)?;
        if !block.is_inline_block() || range.from.offset > range.to.offset
        {
            return None;
        }
        return Some((
            inline_delete_steps(&block, range.from.offset, range.to.offset),
            caret,
        ));
    }

    let from_block = state.block(&range.from.block_id)?;
    let to_block = state.block(&range.to.block_id)?;
    if !from_block.is_inline_block() || !to_block.is_inline_block() {
        return None;
    }
    let (from_parent, from_index) =
        state.doc().locate(&range.from.block_id)?;
    let (to_parent, to_index) = state.doc().locate(&range.to.block_id)?;

    let mut steps = inline_delete_steps(
        &from_block,
        range.from.offset,
        from_block.inline_len(),
    );
    steps.extend(inline_delete_steps(&to_block, 0, range.to.offset));

    if from_parent == to_parent && from_index < to_index {
        // Intermediate siblings vanish wholesale; each removal shifts the
        // next one down to the same index.
        let siblings = state.doc().child_list(&from_parent)?;
        for middle in &siblings[from_index + 1..to_index] {
            steps.push(Step::RemoveNode {
                parent_path: from_parent.clone(),
                index: from_index + 1,
                captured: middle.as_ref().clone(),
            });
        }
        steps.push(Step::merge_blocks(
            range.from.block_id.clone(),
            range.from.offset,
            &to_block,
        ));
    }
    Some((steps, caret))
}

/// Marks governing a position, preferring stored marks at a collapsed
/// cursor.
pub(crate) fn marks_for_insert(
    state: &EditorState,
    position: &Position,
) -> crate::doc::MarkSet {
    if state.selection().is_collapsed() {
        if let Some(stored) = state.stored_marks() {
            return stored.clone();
        }
    }
    state
        .block(&position.block_id)
        .map(|block| block.marks_at(position.offset))
        .unwrap_or_default()
}

/// Uniform runs of a mark kind within `from..to` of a block: the exact
/// mark value plus the extent it covers. Used to build per-run exact
/// removals.
pub(crate) fn mark_runs(
    block: &BlockNode,
    from: usize,
    to: usize,
    kind: &str,
) -> Vec<(usize, usize, Mark)> {
    let Some(children) = block.inline_children() else {
        return Vec::new();
    };
    let mut runs: Vec<(usize, usize, Mark)> = Vec::new();
    let mut pos = from;
    for node in inline::slice_range(children, from, to) {
        let len = node.char_len();
        if let InlineNode::Text(run) = &node {
            if let Some(mark) = run.marks().get(kind) {
                match runs.last_mut() {
                    Some((_, end, existing))
                        if *end == pos && existing == mark =>
                    {
                        *end += len;
                    }
                    _ => runs.push((pos, pos + len, mark.clone())),
                }
            }
        }
        pos += len;
    }
    runs
}

/// Shared shape for registered commands.
pub type CommandFn =
    Arc<dyn Fn(&EditorState) -> Option<crate::transaction::Transaction>
        + Send
        + Sync>;
