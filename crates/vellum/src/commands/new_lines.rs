// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::commands::delete_range_steps;
use crate::doc::IdGenerator;
use crate::selection::Selection;
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::{Origin, Transaction, TransactionBuilder};

/// Split the current block at the caret (Enter). A range selection is
/// deleted first and the split happens at its start. The new right-hand
/// block takes a fresh id from the caller-supplied generator, keeping
/// tests deterministic.
pub fn split_block(
    state: &EditorState,
    ids: &IdGenerator,
) -> Option<Transaction> {
    let selection = state.selection();
    let range = selection.range(state.block_order())?;

    let mut steps = Vec::new();
    let split_at = if selection.is_collapsed() {
        range.from.clone()
    } else {
        let (delete_steps, caret) = delete_range_steps(state, &range)?;
        steps.extend(delete_steps);
        caret
    };
    let block = state.block(&split_at.block_id)?;
    block.inline_children()?;

    let new_id = ids.next_id();
    steps.push(Step::split_block(&block, split_at.offset, new_id.clone()));

    let mut builder = TransactionBuilder::new(Origin::Input)
        .selection_before(selection.clone())
        .steps(steps)
        .set_selection(Selection::caret(new_id, 0));
    if state.stored_marks().is_some() {
        builder =
            builder.set_stored_marks(None, state.stored_marks().cloned());
    }
    Some(builder.build())
}

/// Merge the caret's block into the previous leaf block.
pub fn merge_block_backward(state: &EditorState) -> Option<Transaction> {
    if !state.selection().is_collapsed() {
        return None;
    }
    let (anchor, _) = state.selection().as_text()?;
    let prev = state.doc().prev_leaf(&anchor.block_id)?;
    let prev_len = state.block_len(&prev)?;
    let source = state.block(&anchor.block_id)?;
    Some(
        TransactionBuilder::new(Origin::Command)
            .selection_before(state.selection().clone())
            .step(Step::merge_blocks(prev.clone(), prev_len, &source))
            .set_selection(Selection::caret(prev, prev_len))
            .build(),
    )
}

/// Merge the next leaf block into the caret's block.
pub fn merge_block_forward(state: &EditorState) -> Option<Transaction> {
    if !state.selection().is_collapsed() {
        return None;
    }
    let (anchor, _) = state.selection().as_text()?;
    let next = state.doc().next_leaf(&anchor.block_id)?;
    let len = state.block_len(&anchor.block_id)?;
    let source = state.block(&next)?;
    Some(
        TransactionBuilder::new(Origin::Command)
            .selection_before(state.selection().clone())
            .step(Step::merge_blocks(
                anchor.block_id.clone(),
                len,
                &source,
            ))
            .set_selection(Selection::caret(
                anchor.block_id.clone(),
                anchor.offset,
            ))
            .build(),
    )
}
