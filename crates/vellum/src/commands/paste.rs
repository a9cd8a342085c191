// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Paste/drop of a portable content fragment.

use crate::commands::{delete_range_steps, inline_insert_steps};
use crate::doc::{
    kinds, BlockId, BlockNode, Children, IdGenerator, InlineNode,
};
use crate::selection::{GapSide, Position, Selection};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::{Origin, Transaction, TransactionBuilder};

/// A portable tree fragment, as produced by copy/cut or a drop payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentSlice {
    pub blocks: Vec<BlockNode>,
}

impl ContentSlice {
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        Self { blocks }
    }

    /// A single-paragraph slice holding inline content.
    pub fn inline(nodes: Vec<InlineNode>) -> Self {
        Self::new(vec![BlockNode::paragraph("slice", nodes)])
    }
}

/// Paste a slice at the selection.
///
/// Three text-selection shapes:
/// - a single paragraph merges its inline content into the current block
/// - a single non-paragraph inline block retypes the current block, then
///   inserts its content
/// - anything else splits the current block at the caret and splices the
///   slice between the halves, merging the first slice block into the
///   left half and the last into the right
///
/// Gap cursors insert the slice's blocks adjacent to the gap; node
/// selections replace the selected block. Every inserted block subtree is
/// re-identified so pasting a slice twice cannot collide.
pub fn paste_slice(
    state: &EditorState,
    slice: &ContentSlice,
    ids: &IdGenerator,
) -> Option<Transaction> {
    if slice.blocks.is_empty() {
        return None;
    }
    match state.selection() {
        Selection::Gap {
            block_id, side, ..
        } => paste_at_gap(state, slice, ids, block_id, *side),
        Selection::Node { block_id, .. } => {
            paste_over_node(state, slice, ids, block_id)
        }
        Selection::Text { .. } => paste_at_text(state, slice, ids),
    }
}

fn paste_at_text(
    state: &EditorState,
    slice: &ContentSlice,
    ids: &IdGenerator,
) -> Option<Transaction> {
    let selection = state.selection();
    let range = selection.range(state.block_order())?;

    let mut steps = Vec::new();
    let caret = if selection.is_collapsed() {
        range.from.clone()
    } else {
        let (delete_steps, caret) = delete_range_steps(state, &range)?;
        steps.extend(delete_steps);
        caret
    };
    let current = state.block(&caret.block_id)?;
    current.inline_children()?;

    // Shape (a)/(b): one inline block pastes without splitting.
    if slice.blocks.len() == 1 {
        if let Some(inline) = slice.blocks[0].inline_children() {
            let pasted = &slice.blocks[0];
            if pasted.kind() != kinds::PARAGRAPH {
                steps.push(Step::SetBlockType {
                    block_id: caret.block_id.clone(),
                    new_kind: pasted.kind().to_owned(),
                    new_attrs: pasted.attrs().clone(),
                    old_kind: current.kind().to_owned(),
                    old_attrs: current.attrs().clone(),
                });
            }
            steps.extend(inline_insert_steps(
                &caret.block_id,
                caret.offset,
                inline,
            ));
            let end = caret.offset + inline_len(inline);
            return Some(finish(
                state,
                steps,
                Selection::caret(caret.block_id.clone(), end),
            ));
        }
    }

    // Shape (c): split at the caret and splice between the halves.
    let (parent_path, index) = state.doc().locate(&caret.block_id)?;
    let right_id = ids.next_id();
    steps.push(Step::split_block(&current, caret.offset, right_id.clone()));

    let mut middles: Vec<&BlockNode> = Vec::new();
    let first = slice.blocks.first()?;
    let last = slice.blocks.last()?;
    let many = slice.blocks.len() > 1;

    let first_merges = many && first.is_inline_block();
    let last_merges = last.is_inline_block();
    if first_merges {
        steps.extend(inline_insert_steps(
            &caret.block_id,
            caret.offset,
            first.inline_children().unwrap_or(&[]),
        ));
    } else {
        middles.push(first);
    }
    if many {
        for block in &slice.blocks[1..slice.blocks.len() - 1] {
            middles.push(block);
        }
    }
    if many {
        if last_merges {
            steps.extend(inline_insert_steps(
                &right_id,
                0,
                last.inline_children().unwrap_or(&[]),
            ));
        } else {
            middles.push(last);
        }
    }

    for (i, block) in middles.iter().enumerate() {
        steps.push(Step::InsertNode {
            parent_path: parent_path.clone(),
            index: index + 1 + i,
            node: reassign_ids(block, ids),
        });
    }

    let caret_after = if many && last_merges {
        Selection::caret(
            right_id,
            inline_len(last.inline_children().unwrap_or(&[])),
        )
    } else {
        Selection::caret(right_id, 0)
    };
    Some(finish(state, steps, caret_after))
}

fn paste_at_gap(
    state: &EditorState,
    slice: &ContentSlice,
    ids: &IdGenerator,
    block_id: &BlockId,
    side: GapSide,
) -> Option<Transaction> {
    let (parent_path, index) = state.doc().locate(block_id)?;
    let insert_at = match side {
        GapSide::Before => index,
        GapSide::After => index + 1,
    };
    let pasted: Vec<BlockNode> = slice
        .blocks
        .iter()
        .map(|block| reassign_ids(block, ids))
        .collect();
    let caret = caret_at_end_of(&pasted)
        .unwrap_or_else(|| state.selection().clone());
    let steps = pasted
        .into_iter()
        .enumerate()
        .map(|(i, node)| Step::InsertNode {
            parent_path: parent_path.clone(),
            index: insert_at + i,
            node,
        })
        .collect();
    Some(finish(state, steps, caret))
}

fn paste_over_node(
    state: &EditorState,
    slice: &ContentSlice,
    ids: &IdGenerator,
    block_id: &BlockId,
) -> Option<Transaction> {
    let (parent_path, index) = state.doc().locate(block_id)?;
    let captured = state.block(block_id)?.as_ref().clone();
    let mut steps = vec![Step::RemoveNode {
        parent_path: parent_path.clone(),
        index,
        captured,
    }];
    let pasted: Vec<BlockNode> = slice
        .blocks
        .iter()
        .map(|block| reassign_ids(block, ids))
        .collect();
    let caret = caret_at_end_of(&pasted)
        .unwrap_or_else(|| state.selection().clone());
    steps.extend(pasted.into_iter().enumerate().map(|(i, node)| {
        Step::InsertNode {
            parent_path: parent_path.clone(),
            index: index + i,
            node,
        }
    }));
    Some(finish(state, steps, caret))
}

fn finish(
    state: &EditorState,
    steps: Vec<Step>,
    selection: Selection,
) -> Transaction {
    let mut builder = TransactionBuilder::new(Origin::External)
        .selection_before(state.selection().clone())
        .steps(steps)
        .set_selection(selection);
    if state.stored_marks().is_some() {
        builder =
            builder.set_stored_marks(None, state.stored_marks().cloned());
    }
    builder.build()
}

/// Deep-copy a subtree with fresh ids everywhere.
fn reassign_ids(node: &BlockNode, ids: &IdGenerator) -> BlockNode {
    let children = match node.children() {
        Children::Inline(inline) => Children::Inline(inline.clone()),
        Children::Blocks(blocks) => Children::Blocks(
            blocks
                .iter()
                .map(|child| {
                    std::sync::Arc::new(reassign_ids(child, ids))
                })
                .collect(),
        ),
    };
    BlockNode::new(
        ids.next_id(),
        node.kind().to_owned(),
        node.attrs().clone(),
        children,
    )
}

fn inline_len(nodes: &[InlineNode]) -> usize {
    nodes.iter().map(InlineNode::char_len).sum()
}

/// A caret at the end of the last leaf of a pasted run of blocks.
fn caret_at_end_of(blocks: &[BlockNode]) -> Option<Selection> {
    fn last_leaf(node: &BlockNode) -> Option<Position> {
        match node.children() {
            Children::Inline(_) => Some(Position::new(
                node.id().clone(),
                node.inline_len(),
            )),
            Children::Blocks(children) => {
                children.iter().rev().find_map(|c| last_leaf(c))
            }
        }
    }
    blocks
        .iter()
        .rev()
        .find_map(last_leaf)
        .map(|pos| Selection::caret(pos.block_id, pos.offset))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{attrs_of, Doc, Mark, MarkSet};
    use crate::state::{EditorState, StateConfig};

    fn state_with(doc: Doc, selection: Selection) -> EditorState {
        EditorState::create(StateConfig {
            doc: Some(doc),
            selection: Some(selection),
            ..Default::default()
        })
    }

    fn base_state() -> EditorState {
        state_with(
            Doc::new(vec![BlockNode::paragraph(
                "b1",
                vec![InlineNode::plain("hello world")],
            )]),
            Selection::caret("b1", 5),
        )
    }

    #[test]
    fn a_single_paragraph_slice_merges_into_the_current_block() {
        let state = base_state();
        let slice = ContentSlice::inline(vec![InlineNode::text(
            " pasted",
            MarkSet::single(Mark::bold()),
        )]);
        let ids = IdGenerator::sequential("p");
        let next = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        assert_eq!(next.doc().blocks().len(), 1);
        assert_eq!(
            next.block(&"b1".into()).unwrap().text(),
            "hello pasted world"
        );
        assert_eq!(next.selection(), &Selection::caret("b1", 12));
    }

    #[test]
    fn a_single_heading_slice_retypes_the_block() {
        let state = base_state();
        let slice = ContentSlice::new(vec![BlockNode::new(
            "h",
            kinds::HEADING,
            attrs_of([("level", "1")]),
            Children::Inline(vec![InlineNode::plain("! ")]),
        )]);
        let ids = IdGenerator::sequential("p");
        let next = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        let block = next.block(&"b1".into()).unwrap();
        assert_eq!(block.kind(), kinds::HEADING);
        assert_eq!(block.attrs(), &attrs_of([("level", "1")]));
        assert_eq!(block.text(), "hello!  world");
    }

    #[test]
    fn a_multi_block_slice_splits_and_splices() {
        let state = base_state();
        let slice = ContentSlice::new(vec![
            BlockNode::paragraph("s1", vec![InlineNode::plain("ONE")]),
            BlockNode::paragraph("s2", vec![InlineNode::plain("TWO")]),
            BlockNode::paragraph("s3", vec![InlineNode::plain("THREE")]),
        ]);
        let ids = IdGenerator::sequential("p");
        let next = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        // Left half took the first block, right half took the last, the
        // middle landed in between.
        let texts: Vec<String> = next
            .doc()
            .blocks()
            .iter()
            .map(|b| b.text())
            .collect();
        assert_eq!(texts, ["helloONE", "TWO", "THREE world"]);
        // Caret at the end of the pasted content in the right half.
        let right = &next.doc().blocks()[2];
        assert_eq!(
            next.selection(),
            &Selection::caret(right.id().clone(), 5)
        );
        next.doc().explicitly_assert_invariants();
    }

    #[test]
    fn pasting_the_same_slice_twice_cannot_collide_ids() {
        let state = base_state();
        let slice = ContentSlice::new(vec![
            BlockNode::container(
                "t",
                kinds::TABLE,
                vec![BlockNode::container(
                    "r",
                    kinds::TABLE_ROW,
                    vec![],
                )],
            ),
        ]);
        let ids = IdGenerator::sequential("p");
        let once = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        let tr = paste_slice(&once, &slice, &ids).unwrap();
        let twice = once.apply(&tr).unwrap();
        twice.doc().explicitly_assert_invariants();
    }

    #[test]
    fn gap_cursor_paste_inserts_adjacent_blocks() {
        let state = state_with(
            Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ]),
            Selection::gap("b2", GapSide::Before, vec!["b2".into()]),
        );
        let slice = ContentSlice::new(vec![BlockNode::paragraph(
            "s1",
            vec![InlineNode::plain("mid")],
        )]);
        let ids = IdGenerator::sequential("p");
        let next = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        let texts: Vec<String> = next
            .doc()
            .blocks()
            .iter()
            .map(|b| b.text())
            .collect();
        assert_eq!(texts, ["one", "mid", "two"]);
        assert_eq!(next.selection(), &Selection::caret("p-1", 3));
    }

    #[test]
    fn node_selection_paste_replaces_the_block() {
        let state = state_with(
            Doc::new(vec![
                BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
                BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            ]),
            Selection::node("b1", vec!["b1".into()]),
        );
        let slice = ContentSlice::new(vec![BlockNode::paragraph(
            "s1",
            vec![InlineNode::plain("new")],
        )]);
        let ids = IdGenerator::sequential("p");
        let next = state
            .apply(&paste_slice(&state, &slice, &ids).unwrap())
            .unwrap();
        let texts: Vec<String> = next
            .doc()
            .blocks()
            .iter()
            .map(|b| b.text())
            .collect();
        assert_eq!(texts, ["new", "two"]);
        assert!(!next.doc().contains_block(&"b1".into()));
    }

    #[test]
    fn an_empty_slice_is_refused() {
        let state = base_state();
        let ids = IdGenerator::sequential("p");
        assert!(
            paste_slice(&state, &ContentSlice::new(vec![]), &ids).is_none()
        );
    }
}
