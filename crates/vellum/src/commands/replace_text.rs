// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::commands::{delete_range_steps, marks_for_insert};
use crate::selection::{Position, Selection};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::{Origin, Transaction, TransactionBuilder};

/// Insert text at the selection.
///
/// A range selection (forward or backward, same block or across blocks)
/// is deleted first; the text then lands at the range's `from` position,
/// not at the anchor, which for a backward selection is the wrong end. A
/// collapsed cursor with stored marks spends them on the inserted text.
pub fn insert_text(
    state: &EditorState,
    text: &str,
) -> Option<Transaction> {
    if text.is_empty() {
        return None;
    }
    let selection = state.selection();
    let range = selection.range(state.block_order())?;

    let mut steps = Vec::new();
    let insert_at: Position;
    if selection.is_collapsed() {
        insert_at = range.from.clone();
        state.block(&insert_at.block_id)?;
    } else {
        let (delete_steps, caret) = delete_range_steps(state, &range)?;
        steps.extend(delete_steps);
        insert_at = caret;
    }

    let marks = marks_for_insert(state, &insert_at);
    steps.push(Step::insert_text(
        insert_at.block_id.clone(),
        insert_at.offset,
        text,
        marks,
    ));

    let caret_after = Position::new(
        insert_at.block_id.clone(),
        insert_at.offset + text.chars().count(),
    );
    let mut builder = TransactionBuilder::new(Origin::Input)
        .selection_before(selection.clone())
        .steps(steps)
        .set_selection(Selection::caret(
            caret_after.block_id,
            caret_after.offset,
        ));
    // Typing spends the stored marks.
    if state.stored_marks().is_some() {
        builder =
            builder.set_stored_marks(None, state.stored_marks().cloned());
    }
    Some(builder.build())
}
