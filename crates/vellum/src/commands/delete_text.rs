// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Deletion commands. All of them capture per-slice marks (via the step
//! decomposition helpers) so an undo restores the exact formatting, and
//! all boundary arithmetic is grapheme-aware.

use crate::boundary;
use crate::commands::{delete_range_steps, inline_delete_steps};
use crate::doc::BlockId;
use crate::selection::{Position, Selection};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::{Origin, Transaction, TransactionBuilder};

fn build(
    state: &EditorState,
    steps: Vec<Step>,
    caret: Selection,
) -> Option<Transaction> {
    if steps.is_empty() {
        return None;
    }
    let mut builder = TransactionBuilder::new(Origin::Input)
        .selection_before(state.selection().clone())
        .steps(steps)
        .set_selection(caret);
    if state.stored_marks().is_some() {
        builder =
            builder.set_stored_marks(None, state.stored_marks().cloned());
    }
    Some(builder.build())
}

/// Delete the selection, or one grapheme cluster (or atom) before the
/// caret. At offset 0 the block merges into the previous leaf block.
pub fn delete_backward(state: &EditorState) -> Option<Transaction> {
    match state.selection() {
        Selection::Text { .. } if !state.selection().is_collapsed() => {
            delete_selection(state)
        }
        Selection::Text { anchor, .. } => {
            let block = state.block(&anchor.block_id)?;
            let children = block.inline_children()?;
            if anchor.offset == 0 {
                return merge_into_previous(state, &anchor.block_id);
            }
            let projected = boundary::project_inline(children);
            let from =
                boundary::prev_grapheme_boundary(&projected, anchor.offset);
            build(
                state,
                inline_delete_steps(&block, from, anchor.offset),
                Selection::caret(anchor.block_id.clone(), from),
            )
        }
        Selection::Node { block_id, .. } => remove_block(state, block_id),
        Selection::Gap { block_id, side, .. } => match side {
            crate::selection::GapSide::After => {
                remove_block(state, block_id)
            }
            crate::selection::GapSide::Before => None,
        },
    }
}

/// Delete the selection, or one grapheme cluster (or atom) after the
/// caret. At the end of a block the next leaf block merges in.
pub fn delete_forward(state: &EditorState) -> Option<Transaction> {
    match state.selection() {
        Selection::Text { .. } if !state.selection().is_collapsed() => {
            delete_selection(state)
        }
        Selection::Text { anchor, .. } => {
            let block = state.block(&anchor.block_id)?;
            let children = block.inline_children()?;
            if anchor.offset == block.inline_len() {
                return merge_next_into(state, &anchor.block_id);
            }
            let projected = boundary::project_inline(children);
            let to =
                boundary::next_grapheme_boundary(&projected, anchor.offset);
            build(
                state,
                inline_delete_steps(&block, anchor.offset, to),
                Selection::caret(anchor.block_id.clone(), anchor.offset),
            )
        }
        Selection::Node { block_id, .. } => remove_block(state, block_id),
        Selection::Gap { block_id, side, .. } => match side {
            crate::selection::GapSide::Before => {
                remove_block(state, block_id)
            }
            crate::selection::GapSide::After => None,
        },
    }
}

/// Delete back to the previous word boundary (whitespace before the
/// caret is consumed along the way).
pub fn delete_word_backward(state: &EditorState) -> Option<Transaction> {
    if !state.selection().is_collapsed() {
        return delete_backward(state);
    }
    let (anchor, _) = state.selection().as_text()?;
    let block = state.block(&anchor.block_id)?;
    let children = block.inline_children()?;
    if anchor.offset == 0 {
        return merge_into_previous(state, &anchor.block_id);
    }
    let projected = boundary::project_inline(children);
    let from = boundary::prev_word_boundary(&projected, anchor.offset);
    build(
        state,
        inline_delete_steps(&block, from, anchor.offset),
        Selection::caret(anchor.block_id.clone(), from),
    )
}

/// Delete forward to the next word boundary.
pub fn delete_word_forward(state: &EditorState) -> Option<Transaction> {
    if !state.selection().is_collapsed() {
        return delete_forward(state);
    }
    let (anchor, _) = state.selection().as_text()?;
    let block = state.block(&anchor.block_id)?;
    let children = block.inline_children()?;
    if anchor.offset == block.inline_len() {
        return merge_next_into(state, &anchor.block_id);
    }
    let projected = boundary::project_inline(children);
    let to = boundary::next_word_boundary(&projected, anchor.offset);
    build(
        state,
        inline_delete_steps(&block, anchor.offset, to),
        Selection::caret(anchor.block_id.clone(), anchor.offset),
    )
}

/// Delete from the start of the block to the caret. Without soft-wrap
/// layout, the block boundary is the soft line boundary.
pub fn delete_soft_line_backward(
    state: &EditorState,
) -> Option<Transaction> {
    let (anchor, _) = state.selection().as_text()?;
    if !state.selection().is_collapsed() {
        return delete_backward(state);
    }
    let block = state.block(&anchor.block_id)?;
    build(
        state,
        inline_delete_steps(&block, 0, anchor.offset),
        Selection::caret(anchor.block_id.clone(), 0),
    )
}

/// Delete from the caret to the end of the block.
pub fn delete_soft_line_forward(
    state: &EditorState,
) -> Option<Transaction> {
    let (anchor, _) = state.selection().as_text()?;
    if !state.selection().is_collapsed() {
        return delete_forward(state);
    }
    let block = state.block(&anchor.block_id)?;
    build(
        state,
        inline_delete_steps(&block, anchor.offset, block.inline_len()),
        Selection::caret(anchor.block_id.clone(), anchor.offset),
    )
}

fn delete_selection(state: &EditorState) -> Option<Transaction> {
    let range = state.selection().range(state.block_order())?;
    let (steps, caret) = delete_range_steps(state, &range)?;
    build(
        state,
        steps,
        Selection::caret(caret.block_id, caret.offset),
    )
}

fn merge_into_previous(
    state: &EditorState,
    block_id: &BlockId,
) -> Option<Transaction> {
    let prev_id = state.doc().prev_leaf(block_id)?;
    let prev_len = state.block_len(&prev_id)?;
    let source = state.block(block_id)?;
    build(
        state,
        vec![Step::merge_blocks(prev_id.clone(), prev_len, &source)],
        Selection::caret(prev_id, prev_len),
    )
}

fn merge_next_into(
    state: &EditorState,
    block_id: &BlockId,
) -> Option<Transaction> {
    let next_id = state.doc().next_leaf(block_id)?;
    let len = state.block_len(block_id)?;
    let source = state.block(&next_id)?;
    build(
        state,
        vec![Step::merge_blocks(block_id.clone(), len, &source)],
        Selection::caret(block_id.clone(), len),
    )
}

fn remove_block(
    state: &EditorState,
    block_id: &BlockId,
) -> Option<Transaction> {
    let (parent_path, index) = state.doc().locate(block_id)?;
    let captured = state.block(block_id)?.as_ref().clone();
    let caret = state
        .doc()
        .prev_leaf(block_id)
        .and_then(|prev| {
            let len = state.block_len(&prev)?;
            Some(Selection::caret(prev, len))
        })
        .or_else(|| {
            let next = state.doc().next_leaf(block_id)?;
            Some(Selection::caret(next, 0))
        })
        .unwrap_or_else(|| state.selection().clone());
    build(
        state,
        vec![Step::RemoveNode {
            parent_path,
            index,
            captured,
        }],
        caret,
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{
        attrs_of, BlockNode, Doc, InlineAtom, InlineNode, Mark, MarkSet,
    };
    use crate::state::{EditorState, StateConfig};

    fn state_with(doc: Doc, selection: Selection) -> EditorState {
        EditorState::create(StateConfig {
            doc: Some(doc),
            selection: Some(selection),
            ..Default::default()
        })
    }

    fn one_block(text: &str, caret: usize) -> EditorState {
        state_with(
            Doc::new(vec![BlockNode::paragraph(
                "b1",
                vec![InlineNode::plain(text)],
            )]),
            Selection::caret("b1", caret),
        )
    }

    #[test]
    fn backspace_deletes_the_character_before_the_caret() {
        let state = one_block("abc", 3);
        let next =
            state.apply(&delete_backward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "ab");
        assert_eq!(next.selection(), &Selection::caret("b1", 2));
    }

    #[test]
    fn backspace_at_the_start_of_the_document_does_nothing() {
        let state = one_block("abc", 0);
        assert!(delete_backward(&state).is_none());
    }

    #[test]
    fn backspace_deletes_a_whole_emoji_family() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}";
        let text = format!("a{family}");
        let len = text.chars().count();
        let state = one_block(&text, len);
        let next =
            state.apply(&delete_backward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "a");
        assert_eq!(next.selection(), &Selection::caret("b1", 1));
    }

    #[test]
    fn backspace_at_offset_zero_merges_with_the_previous_block() {
        let state = state_with(
            Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ]),
            Selection::caret("b2", 0),
        );
        let next =
            state.apply(&delete_backward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "onetwo");
        assert!(!next.doc().contains_block(&"b2".into()));
        assert_eq!(next.selection(), &Selection::caret("b1", 3));
    }

    #[test]
    fn backspace_removes_an_atom_as_one_unit() {
        let state = state_with(
            Doc::new(vec![BlockNode::paragraph(
                "b1",
                vec![
                    InlineNode::plain("ab"),
                    InlineNode::from(InlineAtom::new(
                        "image",
                        attrs_of([("src", "cat.png")]),
                    )),
                ],
            )]),
            Selection::caret("b1", 3),
        );
        let next =
            state.apply(&delete_backward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "ab");
        assert_eq!(next.block(&"b1".into()).unwrap().inline_len(), 2);
    }

    #[test]
    fn delete_forward_takes_the_next_character() {
        let state = one_block("abc", 1);
        let next = state.apply(&delete_forward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "ac");
        assert_eq!(next.selection(), &Selection::caret("b1", 1));
    }

    #[test]
    fn delete_forward_at_the_end_merges_the_next_block_in() {
        let state = state_with(
            Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ]),
            Selection::caret("b1", 3),
        );
        let next = state.apply(&delete_forward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "onetwo");
        assert_eq!(next.selection(), &Selection::caret("b1", 3));
    }

    #[test]
    fn word_backspace_eats_the_word_and_trailing_space() {
        let state = one_block("hello world ", 12);
        let next =
            state.apply(&delete_word_backward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "hello ");
        assert_eq!(next.selection(), &Selection::caret("b1", 6));
    }

    #[test]
    fn word_delete_forward_eats_the_next_word() {
        let state = one_block("hello world", 5);
        let next =
            state.apply(&delete_word_forward(&state).unwrap()).unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "hello");
    }

    #[test]
    fn soft_line_backward_clears_to_the_block_start() {
        let state = one_block("hello world", 6);
        let next = state
            .apply(&delete_soft_line_backward(&state).unwrap())
            .unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "world");
        assert_eq!(next.selection(), &Selection::caret("b1", 0));
    }

    #[test]
    fn soft_line_forward_clears_to_the_block_end() {
        let state = one_block("hello world", 5);
        let next = state
            .apply(&delete_soft_line_forward(&state).unwrap())
            .unwrap();
        assert_eq!(next.block(&"b1".into()).unwrap().text(), "hello");
    }

    #[test]
    fn deleting_a_selection_restores_per_slice_marks_on_undo() {
        let doc = Doc::new(vec![BlockNode::paragraph(
            "b1",
            vec![
                InlineNode::text("bold", MarkSet::single(Mark::bold())),
                InlineNode::plain("normal"),
            ],
        )]);
        let state = state_with(
            doc.clone(),
            Selection::text(
                crate::selection::Position::new("b1", 0),
                crate::selection::Position::new("b1", 10),
            ),
        );
        let tr = delete_backward(&state).unwrap();
        let deleted = state.apply(&tr).unwrap();
        assert_eq!(deleted.block(&"b1".into()).unwrap().text(), "");

        let restored = deleted
            .apply(&crate::transaction::invert_transaction(&tr))
            .unwrap();
        let children = restored
            .block(&"b1".into())
            .unwrap()
            .inline_children()
            .unwrap()
            .to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            InlineNode::text("bold", MarkSet::single(Mark::bold()))
        );
        assert_eq!(children[1], InlineNode::plain("normal"));
    }

    #[test]
    fn node_selection_delete_removes_the_block() {
        let state = state_with(
            Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ]),
            Selection::node("b2", vec!["b2".into()]),
        );
        let next =
            state.apply(&delete_backward(&state).unwrap()).unwrap();
        assert!(!next.doc().contains_block(&"b2".into()));
        assert_eq!(next.selection(), &Selection::caret("b1", 3));
    }
}
