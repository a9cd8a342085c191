// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Selection motion. Every motion clears stored marks: marks queued for
//! the next character die the moment the cursor moves away.

use crate::selection::{Position, Selection};
use crate::state::EditorState;
use crate::transaction::{Origin, Transaction, TransactionBuilder};

fn motion_tx(
    state: &EditorState,
    selection: Selection,
) -> Transaction {
    let mut builder = TransactionBuilder::new(Origin::Command)
        .selection_before(state.selection().clone())
        .set_selection(selection);
    if state.stored_marks().is_some() {
        builder = builder
            .set_stored_marks(None, state.stored_marks().cloned());
    }
    builder.build()
}

/// Select from the start of the first leaf block to the end of the last.
pub fn select_all(state: &EditorState) -> Option<Transaction> {
    let first = state.doc().first_leaf_block()?;
    let last = state.doc().last_leaf_block()?;
    let selection = Selection::text(
        Position::new(first.id().clone(), 0),
        Position::new(last.id().clone(), last.inline_len()),
    );
    Some(motion_tx(state, selection))
}

/// Move the caret to a position.
pub fn move_tx(
    state: &EditorState,
    to: Position,
) -> Option<Transaction> {
    let block = state.block(&to.block_id)?;
    if !block.is_inline_block() || to.offset > block.inline_len() {
        return None;
    }
    Some(motion_tx(
        state,
        Selection::caret(to.block_id, to.offset),
    ))
}

/// Keep the anchor, move the head.
pub fn extend_tx(
    state: &EditorState,
    head: Position,
) -> Option<Transaction> {
    let (anchor, _) = state.selection().as_text()?;
    let block = state.block(&head.block_id)?;
    if !block.is_inline_block() || head.offset > block.inline_len() {
        return None;
    }
    Some(motion_tx(
        state,
        Selection::text(anchor.clone(), head),
    ))
}

/// Select a block as an atomic unit.
pub fn node_sel_tx(
    state: &EditorState,
    block_id: impl Into<crate::doc::BlockId>,
) -> Option<Transaction> {
    let block_id = block_id.into();
    let path = state.doc().id_path(&block_id)?;
    Some(motion_tx(state, Selection::node(block_id, path)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{
        BlockNode, Doc, InlineNode, Mark, MarkSet,
    };
    use crate::state::{EditorState, StateConfig};

    fn state() -> EditorState {
        EditorState::create(StateConfig {
            doc: Some(Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ])),
            stored_marks: Some(MarkSet::single(Mark::bold())),
            ..Default::default()
        })
    }

    #[test]
    fn select_all_spans_first_to_last_leaf() {
        let state = state();
        let tr = select_all(&state).unwrap();
        assert_eq!(
            tr.selection_after(),
            Some(&Selection::text(
                Position::new("b1", 0),
                Position::new("b2", 3),
            ))
        );
    }

    #[test]
    fn motion_clears_stored_marks() {
        let state = state();
        let tr = move_tx(&state, Position::new("b2", 1)).unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(next.stored_marks(), None);
        assert_eq!(next.selection(), &Selection::caret("b2", 1));
    }

    #[test]
    fn motion_to_a_missing_block_is_refused() {
        assert!(move_tx(&state(), Position::new("ghost", 0)).is_none());
        assert!(move_tx(&state(), Position::new("b1", 99)).is_none());
    }

    #[test]
    fn extend_keeps_the_anchor() {
        let state = state();
        let tr = extend_tx(&state, Position::new("b2", 2)).unwrap();
        assert_eq!(
            tr.selection_after(),
            Some(&Selection::text(
                Position::new("b1", 0),
                Position::new("b2", 2),
            ))
        );
    }

    #[test]
    fn node_selection_carries_the_breadcrumb() {
        let state = state();
        let tr = node_sel_tx(&state, "b2").unwrap();
        assert_eq!(
            tr.selection_after(),
            Some(&Selection::node("b2", vec!["b2".into()]))
        );
    }
}
