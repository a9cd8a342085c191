// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Offset-space operations over inline child sequences. All offsets count
//! Unicode scalar values, with atoms contributing 1.

use crate::doc::marks::MarkSet;
use crate::doc::nodes::{InlineNode, TextNode};

pub(crate) fn inline_len(nodes: &[InlineNode]) -> usize {
    nodes.iter().map(InlineNode::char_len).sum()
}

/// Split a sequence at an offset. Text runs are cut, atoms fall wholly on
/// one side. `offset` must be within `0..=inline_len(nodes)`.
pub(crate) fn split_at(
    nodes: &[InlineNode],
    offset: usize,
) -> (Vec<InlineNode>, Vec<InlineNode>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut pos = 0;
    for node in nodes {
        let len = node.char_len();
        if pos + len <= offset {
            left.push(node.clone());
        } else if pos >= offset {
            right.push(node.clone());
        } else {
            // A text run straddling the offset; atoms can never straddle.
            let run = node.as_text().expect("atom straddling an offset");
            left.push(InlineNode::Text(run.slice(0, offset - pos)));
            right.push(InlineNode::Text(run.slice(offset - pos, len)));
        }
        pos += len;
    }
    (left, right)
}

/// The sub-sequence covering `from..to`, with runs cut at the edges.
pub(crate) fn slice_range(
    nodes: &[InlineNode],
    from: usize,
    to: usize,
) -> Vec<InlineNode> {
    let (_, tail) = split_at(nodes, from);
    let (mid, _) = split_at(&tail, to - from);
    mid
}

/// The text runs covering `from..to` with their per-slice marks. `None`
/// when the range crosses an atom: atom removal is a separate step.
pub(crate) fn capture_text_slices(
    nodes: &[InlineNode],
    from: usize,
    to: usize,
) -> Option<Vec<TextNode>> {
    slice_range(nodes, from, to)
        .into_iter()
        .map(|node| match node {
            InlineNode::Text(run) => Some(run),
            InlineNode::Atom(_) => None,
        })
        .collect()
}

/// Rewrite the mark set of every text slice intersecting `from..to`.
/// Atoms pass through unchanged; the caller re-normalizes.
pub(crate) fn map_marks_in_range(
    nodes: &[InlineNode],
    from: usize,
    to: usize,
    f: &dyn Fn(&MarkSet) -> MarkSet,
) -> Vec<InlineNode> {
    let (left, tail) = split_at(nodes, from);
    let (mid, right) = split_at(&tail, to - from);
    let mut out = left;
    for node in mid {
        match node {
            InlineNode::Text(run) => {
                let marks = f(run.marks());
                out.push(InlineNode::Text(run.with_marks(marks)));
            }
            atom @ InlineNode::Atom(_) => out.push(atom),
        }
    }
    out.extend(right);
    out
}

/// The node starting exactly at `offset`, with its index in the sequence.
pub(crate) fn node_at(
    nodes: &[InlineNode],
    offset: usize,
) -> Option<(usize, &InlineNode)> {
    let mut pos = 0;
    for (i, node) in nodes.iter().enumerate() {
        if pos == offset {
            return Some((i, node));
        }
        if pos > offset {
            return None;
        }
        pos += node.char_len();
    }
    None
}
