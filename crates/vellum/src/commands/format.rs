// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Mark commands. Boolean marks toggle; attributed marks always apply
//! with replace semantics (the old value of the same kind is removed
//! before the new one is added, run by run, so inversion restores the
//! exact previous formatting).

use serde_json::Value;

use crate::commands::{mark_runs, range_segments, RangeSegment};
use crate::doc::{AttrMap, Mark, MarkSet};
use crate::format::InlineFormat;
use crate::selection::SelRange;
use crate::state::EditorState;
use crate::step::{MarkTarget, Step};
use crate::transaction::{Origin, Transaction, TransactionBuilder};

pub fn toggle_bold(state: &EditorState) -> Option<Transaction> {
    toggle_mark(state, InlineFormat::Bold.as_ref())
}

pub fn toggle_italic(state: &EditorState) -> Option<Transaction> {
    toggle_mark(state, InlineFormat::Italic.as_ref())
}

pub fn toggle_underline(state: &EditorState) -> Option<Transaction> {
    toggle_mark(state, InlineFormat::Underline.as_ref())
}

pub fn toggle_strike_through(state: &EditorState) -> Option<Transaction> {
    toggle_mark(state, InlineFormat::StrikeThrough.as_ref())
}

/// Toggle a boolean mark over the selection; at a collapsed cursor the
/// toggle lands in the stored marks for the next character instead.
pub fn toggle_mark(state: &EditorState, kind: &str) -> Option<Transaction> {
    let selection = state.selection();
    if selection.is_collapsed() && selection.is_text_selection() {
        let current = cursor_marks(state)?;
        let next = current.toggled(Mark::boolean(kind));
        return Some(
            TransactionBuilder::new(Origin::Command)
                .selection_before(selection.clone())
                .set_selection(selection.clone())
                .set_stored_marks(
                    Some(next),
                    state.stored_marks().cloned(),
                )
                .build(),
        );
    }

    let range = selection.range(state.block_order())?;
    let segments = range_segments(state, &range)?;
    let steps = if is_mark_active(state, kind) {
        removal_steps(state, &segments, kind)
    } else {
        segments
            .iter()
            .filter(|seg| seg.from < seg.to)
            .map(|seg| Step::AddMark {
                block_id: seg.block_id.clone(),
                from: seg.from,
                to: seg.to,
                mark: Mark::boolean(kind),
            })
            .collect()
    };
    if steps.is_empty() {
        return None;
    }
    Some(
        TransactionBuilder::new(Origin::Command)
            .selection_before(selection.clone())
            .steps(steps)
            .set_selection(selection.clone())
            .build(),
    )
}

/// Apply an attributed mark with replace semantics.
pub fn apply_attributed_mark(
    state: &EditorState,
    kind: &str,
    attrs: AttrMap,
) -> Option<Transaction> {
    let selection = state.selection();
    let mark = Mark::new(kind, attrs);
    if selection.is_collapsed() && selection.is_text_selection() {
        let next = cursor_marks(state)?.with(mark);
        return Some(
            TransactionBuilder::new(Origin::Command)
                .selection_before(selection.clone())
                .set_selection(selection.clone())
                .set_stored_marks(
                    Some(next),
                    state.stored_marks().cloned(),
                )
                .build(),
        );
    }

    let range = selection.range(state.block_order())?;
    let segments = range_segments(state, &range)?;
    let mut steps = removal_steps(state, &segments, kind);
    steps.extend(
        segments
            .iter()
            .filter(|seg| seg.from < seg.to)
            .map(|seg| Step::AddMark {
                block_id: seg.block_id.clone(),
                from: seg.from,
                to: seg.to,
                mark: mark.clone(),
            }),
    );
    if steps.is_empty() {
        return None;
    }
    Some(
        TransactionBuilder::new(Origin::Command)
            .selection_before(selection.clone())
            .steps(steps)
            .set_selection(selection.clone())
            .build(),
    )
}

/// Remove every value of an attributed mark kind from the selection.
pub fn remove_attributed_mark(
    state: &EditorState,
    kind: &str,
) -> Option<Transaction> {
    let selection = state.selection();
    if selection.is_collapsed() && selection.is_text_selection() {
        let current = cursor_marks(state)?;
        if !current.contains_kind(kind) {
            return None;
        }
        return Some(
            TransactionBuilder::new(Origin::Command)
                .selection_before(selection.clone())
                .set_selection(selection.clone())
                .set_stored_marks(
                    Some(current.without_kind(kind)),
                    state.stored_marks().cloned(),
                )
                .build(),
        );
    }

    let range = selection.range(state.block_order())?;
    let segments = range_segments(state, &range)?;
    let steps = removal_steps(state, &segments, kind);
    if steps.is_empty() {
        return None;
    }
    Some(
        TransactionBuilder::new(Origin::Command)
            .selection_before(selection.clone())
            .steps(steps)
            .set_selection(selection.clone())
            .build(),
    )
}

/// Whether every text slice in the selection carries the mark kind. At a
/// collapsed cursor: the stored marks, else the marks at the caret.
pub fn is_mark_active(state: &EditorState, kind: &str) -> bool {
    let selection = state.selection();
    if selection.is_collapsed() && selection.is_text_selection() {
        return cursor_marks(state)
            .is_some_and(|marks| marks.contains_kind(kind));
    }
    let Some(range) = selection.range(state.block_order()) else {
        return false;
    };
    let Some(segments) = range_segments(state, &range) else {
        return false;
    };
    let mut saw_text = false;
    for seg in &segments {
        let Some(block) = state.block(&seg.block_id) else {
            return false;
        };
        for run in crate::doc::inline::slice_range(
            block.inline_children().unwrap_or(&[]),
            seg.from,
            seg.to,
        ) {
            if let Some(text) = run.as_text() {
                if text.is_empty() {
                    continue;
                }
                saw_text = true;
                if !text.marks().contains_kind(kind) {
                    return false;
                }
            }
        }
    }
    saw_text
}

pub fn is_attributed_mark_active(state: &EditorState, kind: &str) -> bool {
    is_mark_active(state, kind)
}

/// The value of one attribute of a mark kind at the selection start (or
/// the stored marks at a collapsed cursor). `None` when the mark is
/// absent.
pub fn mark_attr_at_selection(
    state: &EditorState,
    kind: &str,
    attr: &str,
) -> Option<Value> {
    let selection = state.selection();
    let marks = if selection.is_collapsed() {
        cursor_marks(state)?
    } else {
        let range = selection.range(state.block_order())?;
        marks_at_range_start(state, &range)?
    };
    marks.get(kind)?.attrs().get(attr).cloned()
}

fn marks_at_range_start(
    state: &EditorState,
    range: &SelRange,
) -> Option<MarkSet> {
    let block = state.block(&range.from.block_id)?;
    // The character just inside the range, not the one before it.
    Some(block.marks_at(range.from.offset + 1))
}

fn cursor_marks(state: &EditorState) -> Option<MarkSet> {
    if let Some(stored) = state.stored_marks() {
        return Some(stored.clone());
    }
    let (anchor, _) = state.selection().as_text()?;
    let block = state.block(&anchor.block_id)?;
    Some(block.marks_at(anchor.offset))
}

/// One exact `RemoveMark` per uniform run, so inversion re-adds exactly
/// what was there.
fn removal_steps(
    state: &EditorState,
    segments: &[RangeSegment],
    kind: &str,
) -> Vec<Step> {
    let mut steps = Vec::new();
    for seg in segments {
        let Some(block) = state.block(&seg.block_id) else {
            continue;
        };
        for (from, to, mark) in mark_runs(&block, seg.from, seg.to, kind) {
            steps.push(Step::RemoveMark {
                block_id: seg.block_id.clone(),
                from,
                to,
                target: MarkTarget::Exact(mark),
            });
        }
    }
    steps
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{BlockNode, Doc, InlineNode};
    use crate::selection::{Position, Selection};
    use crate::state::{EditorState, StateConfig};

    fn state_with(doc: Doc, selection: Selection) -> EditorState {
        EditorState::create(StateConfig {
            doc: Some(doc),
            selection: Some(selection),
            ..Default::default()
        })
    }

    fn plain_doc(text: &str) -> Doc {
        Doc::new(vec![BlockNode::paragraph(
            "b1",
            vec![InlineNode::plain(text)],
        )])
    }

    #[test]
    fn toggling_bold_over_a_range_adds_the_mark() {
        let state = state_with(
            plain_doc("hello"),
            Selection::text(Position::new("b1", 0), Position::new("b1", 5)),
        );
        let tr = toggle_bold(&state).unwrap();
        let next = state.apply(&tr).unwrap();
        assert!(is_mark_active(&next, "bold"));
    }

    #[test]
    fn toggling_bold_again_removes_it_and_round_trips() {
        let state = state_with(
            plain_doc("hello"),
            Selection::text(Position::new("b1", 0), Position::new("b1", 5)),
        );
        let bolded = state.apply(&toggle_bold(&state).unwrap()).unwrap();
        let tr = toggle_bold(&bolded).unwrap();
        let back = bolded.apply(&tr).unwrap();
        assert!(!is_mark_active(&back, "bold"));
        assert_eq!(back.doc(), state.doc());
    }

    #[test]
    fn toggling_at_a_cursor_stores_marks_for_the_next_character() {
        let state =
            state_with(plain_doc("hello"), Selection::caret("b1", 2));
        let tr = toggle_bold(&state).unwrap();
        let next = state.apply(&tr).unwrap();
        assert_eq!(
            next.stored_marks(),
            Some(&MarkSet::single(Mark::bold()))
        );
        assert!(is_mark_active(&next, "bold"));
    }

    #[test]
    fn applying_an_attributed_mark_replaces_the_old_value() {
        let doc = Doc::new(vec![BlockNode::paragraph(
            "b1",
            vec![InlineNode::text(
                "hello",
                MarkSet::single(Mark::font_size("24px")),
            )],
        )]);
        let state = state_with(
            doc,
            Selection::text(Position::new("b1", 0), Position::new("b1", 5)),
        );
        let tr = apply_attributed_mark(
            &state,
            "fontSize",
            crate::doc::attrs_of([("value", "32px")]),
        )
        .unwrap();
        let next = state.apply(&tr).unwrap();
        let children = next
            .block(&"b1".into())
            .unwrap()
            .inline_children()
            .unwrap()
            .to_vec();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].as_text().unwrap().marks(),
            &MarkSet::single(Mark::font_size("32px"))
        );
        assert_eq!(
            mark_attr_at_selection(&next, "fontSize", "value"),
            Some(Value::String("32px".into()))
        );
    }

    #[test]
    fn replace_semantics_survive_undo() {
        let doc = Doc::new(vec![BlockNode::paragraph(
            "b1",
            vec![InlineNode::text(
                "hello",
                MarkSet::single(Mark::font_size("24px")),
            )],
        )]);
        let state = state_with(
            doc.clone(),
            Selection::text(Position::new("b1", 0), Position::new("b1", 5)),
        );
        let tr = apply_attributed_mark(
            &state,
            "fontSize",
            crate::doc::attrs_of([("value", "32px")]),
        )
        .unwrap();
        let applied = state.apply(&tr).unwrap();
        let inverted = crate::transaction::invert_transaction(&tr);
        let restored = applied.apply(&inverted).unwrap();
        assert_eq!(restored.doc(), &doc);
    }

    #[test]
    fn toggling_across_blocks_marks_every_segment() {
        let doc = Doc::new(vec![
            BlockNode::paragraph("b1", vec![InlineNode::plain("one")]),
            BlockNode::paragraph("b2", vec![InlineNode::plain("two")]),
            BlockNode::paragraph("b3", vec![InlineNode::plain("three")]),
        ]);
        let state = state_with(
            doc,
            Selection::text(Position::new("b1", 1), Position::new("b3", 2)),
        );
        let tr = toggle_bold(&state).unwrap();
        let next = state.apply(&tr).unwrap();
        assert!(is_mark_active(&next, "bold"));
        // Outside the range nothing changed.
        assert_eq!(
            next.block(&"b1".into()).unwrap().marks_at(1),
            MarkSet::new()
        );
    }

    #[test]
    fn removing_a_missing_attributed_mark_is_a_no_op() {
        let state = state_with(
            plain_doc("hello"),
            Selection::text(Position::new("b1", 0), Position::new("b1", 5)),
        );
        assert!(remove_attributed_mark(&state, "fontSize").is_none());
    }
}
