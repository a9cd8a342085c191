// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Grapheme- and word-boundary arithmetic for motion and deletion (UAX
//! #29 via `unicode-segmentation`). Offsets are Unicode scalar values.
//!
//! Inline content is projected to a plain string first, with atoms
//! becoming U+FFFC so they stay exactly one offset unit wide and always
//! form their own boundary.

use unicode_segmentation::UnicodeSegmentation;

use crate::doc::nodes::InlineNode;
use crate::doc::nodes::text_node::byte_index;

/// Stand-in character for inline atoms in projected text.
pub(crate) const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Project inline children to a string preserving offset arithmetic.
pub(crate) fn project_inline(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            InlineNode::Text(t) => out.push_str(t.text()),
            InlineNode::Atom(_) => out.push(OBJECT_REPLACEMENT),
        }
    }
    out
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// The extended grapheme cluster boundary closest before `offset`;
/// 0 stays 0.
pub fn prev_grapheme_boundary(text: &str, offset: usize) -> usize {
    if offset == 0 {
        return 0;
    }
    let byte = byte_index(text, offset);
    let mut prev = 0;
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            break;
        }
        prev = i;
    }
    char_offset(text, prev)
}

/// The extended grapheme cluster boundary closest after `offset`; the
/// text length saturates.
pub fn next_grapheme_boundary(text: &str, offset: usize) -> usize {
    let byte = byte_index(text, offset);
    for (i, g) in text.grapheme_indices(true) {
        let end = i + g.len();
        if end > byte {
            return char_offset(text, end);
        }
    }
    text.chars().count()
}

/// Where a backward word deletion from `offset` should stop: whitespace
/// immediately before the caret is skipped, then one word segment.
pub fn prev_word_boundary(text: &str, offset: usize) -> usize {
    let byte = byte_index(text, offset);
    let mut spans: Vec<(usize, &str)> = Vec::new();
    for (i, seg) in text.split_word_bound_indices() {
        if i >= byte {
            break;
        }
        spans.push((i, seg));
    }
    let mut cut = byte;
    let mut spans = spans.into_iter().rev().peekable();
    while let Some((i, seg)) = spans.peek() {
        if seg.chars().all(char::is_whitespace) {
            cut = *i;
            spans.next();
        } else {
            break;
        }
    }
    if let Some((i, _)) = spans.next() {
        cut = i;
    }
    char_offset(text, cut)
}

/// Where a forward word deletion from `offset` should stop.
pub fn next_word_boundary(text: &str, offset: usize) -> usize {
    let byte = byte_index(text, offset);
    let mut cut = byte;
    let mut seen_word = false;
    for (i, seg) in text.split_word_bound_indices() {
        let end = i + seg.len();
        if end <= byte {
            continue;
        }
        if seg.chars().all(char::is_whitespace) {
            if seen_word {
                break;
            }
            cut = end;
        } else {
            cut = end;
            seen_word = true;
            break;
        }
    }
    char_offset(text, cut.max(byte))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ascii_graphemes_step_one_char() {
        assert_eq!(prev_grapheme_boundary("abc", 3), 2);
        assert_eq!(prev_grapheme_boundary("abc", 1), 0);
        assert_eq!(prev_grapheme_boundary("abc", 0), 0);
        assert_eq!(next_grapheme_boundary("abc", 0), 1);
        assert_eq!(next_grapheme_boundary("abc", 3), 3);
    }

    #[test]
    fn emoji_zwj_sequences_delete_as_one_unit() {
        // Family emoji: three people joined by ZWJs, five scalars.
        let family = "a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}";
        let len = family.chars().count();
        assert_eq!(prev_grapheme_boundary(family, len), 1);
        assert_eq!(next_grapheme_boundary(family, 1), len);
    }

    #[test]
    fn combining_marks_stay_attached() {
        let text = "e\u{0301}x"; // é as base + combining acute
        assert_eq!(prev_grapheme_boundary(text, 2), 0);
        assert_eq!(next_grapheme_boundary(text, 0), 2);
    }

    #[test]
    fn backward_word_deletion_skips_trailing_whitespace() {
        let text = "hello world  ";
        assert_eq!(prev_word_boundary(text, 13), 6);
        assert_eq!(prev_word_boundary(text, 11), 6);
        assert_eq!(prev_word_boundary(text, 5), 0);
        assert_eq!(prev_word_boundary(text, 0), 0);
    }

    #[test]
    fn forward_word_deletion_takes_the_next_word() {
        let text = "hello world";
        assert_eq!(next_word_boundary(text, 0), 5);
        assert_eq!(next_word_boundary(text, 5), 11);
        assert_eq!(next_word_boundary(text, 11), 11);
    }

    #[test]
    fn atoms_project_to_their_own_boundary() {
        use crate::doc::nodes::InlineNode;
        use crate::doc::{AttrMap, InlineAtom};

        let nodes = vec![
            InlineNode::plain("ab"),
            InlineNode::from(InlineAtom::new("image", AttrMap::new())),
            InlineNode::plain("cd"),
        ];
        let projected = project_inline(&nodes);
        assert_eq!(projected.chars().count(), 5);
        assert_eq!(prev_grapheme_boundary(&projected, 3), 2);
        assert_eq!(next_grapheme_boundary(&projected, 2), 3);
    }
}
