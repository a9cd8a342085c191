// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::doc::nodes::{InlineNode, TextNode};

/// Normalize an inline child sequence.
///
/// Rules:
/// - adjacent text runs with equal mark sets are coalesced
/// - empty text runs are dropped, except that an otherwise-empty sequence
///   keeps exactly one unmarked empty run as placeholder
/// - atoms pass through unchanged
///
/// Every step re-normalizes the inline children of the blocks it touched,
/// so a block in an applied document always satisfies these rules.
pub fn normalize_inline(children: Vec<InlineNode>) -> Vec<InlineNode> {
    let mut out: Vec<InlineNode> = Vec::with_capacity(children.len());
    for node in children {
        match node {
            InlineNode::Text(run) if run.is_empty() => continue,
            InlineNode::Text(run) => match out.last_mut() {
                Some(InlineNode::Text(prev)) if prev.marks() == run.marks() => {
                    let merged = format!("{}{}", prev.text(), run.text());
                    *prev = TextNode::new(merged, run.marks().clone());
                }
                _ => out.push(InlineNode::Text(run)),
            },
            atom @ InlineNode::Atom(_) => out.push(atom),
        }
    }
    if out.is_empty() {
        out.push(InlineNode::Text(TextNode::default()));
    }
    out
}

/// Whether a sequence already satisfies the normalization rules. Used by
/// the invariant assertions; application code calls [`normalize_inline`]
/// unconditionally.
pub fn is_normalized(children: &[InlineNode]) -> bool {
    if children.is_empty() {
        return false;
    }
    let lone_empty = children.len() == 1
        && matches!(
            &children[0],
            InlineNode::Text(t) if t.is_empty() && t.marks().is_empty()
        );
    if lone_empty {
        return true;
    }
    let mut prev: Option<&InlineNode> = None;
    for node in children {
        if let InlineNode::Text(run) = node {
            if run.is_empty() {
                return false;
            }
            if let Some(InlineNode::Text(p)) = prev {
                if p.marks() == run.marks() {
                    return false;
                }
            }
        }
        prev = Some(node);
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::attrs::AttrMap;
    use crate::doc::marks::{Mark, MarkSet};
    use crate::doc::nodes::InlineAtom;

    #[test]
    fn adjacent_runs_with_equal_marks_coalesce() {
        let out = normalize_inline(vec![
            InlineNode::plain("foo"),
            InlineNode::plain("bar"),
        ]);
        assert_eq!(out, vec![InlineNode::plain("foobar")]);
    }

    #[test]
    fn runs_with_different_marks_stay_separate() {
        let children = vec![
            InlineNode::text("foo", MarkSet::single(Mark::bold())),
            InlineNode::plain("bar"),
        ];
        assert_eq!(normalize_inline(children.clone()), children);
    }

    #[test]
    fn atoms_break_coalescing() {
        let children = vec![
            InlineNode::plain("a"),
            InlineNode::from(InlineAtom::new("hardBreak", AttrMap::new())),
            InlineNode::plain("b"),
        ];
        assert_eq!(normalize_inline(children.clone()), children);
    }

    #[test]
    fn empty_runs_are_dropped() {
        let out = normalize_inline(vec![
            InlineNode::plain("a"),
            InlineNode::plain(""),
            InlineNode::plain("b"),
        ]);
        assert_eq!(out, vec![InlineNode::plain("ab")]);
    }

    #[test]
    fn an_emptied_sequence_keeps_one_placeholder_run() {
        let out = normalize_inline(vec![InlineNode::text(
            "",
            MarkSet::single(Mark::bold()),
        )]);
        assert_eq!(out, vec![InlineNode::plain("")]);
        assert!(is_normalized(&out));
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_inline(vec![
            InlineNode::plain("a"),
            InlineNode::text("b", MarkSet::single(Mark::italic())),
            InlineNode::text("c", MarkSet::single(Mark::italic())),
        ]);
        assert!(is_normalized(&once));
        assert_eq!(normalize_inline(once.clone()), once);
    }
}
