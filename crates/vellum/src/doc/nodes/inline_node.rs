// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

use crate::doc::marks::MarkSet;
use crate::doc::nodes::{InlineAtom, TextNode};

/// One element of a block's inline content: a text run or an atom.
///
/// Serialization is untagged: text nodes are recognised by their `text`
/// field, atoms by `type` (both deny unknown fields, so block objects with
/// an `id` never parse as either).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InlineNode {
    Text(TextNode),
    Atom(InlineAtom),
}

impl InlineNode {
    pub fn text(text: impl Into<String>, marks: MarkSet) -> Self {
        InlineNode::Text(TextNode::new(text, marks))
    }

    pub fn plain(text: impl Into<String>) -> Self {
        InlineNode::Text(TextNode::plain(text))
    }

    /// Length in offset units: the char count of a run, 1 for an atom.
    pub fn char_len(&self) -> usize {
        match self {
            InlineNode::Text(t) => t.char_len(),
            InlineNode::Atom(_) => 1,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, InlineNode::Text(_))
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, InlineNode::Atom(_))
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            InlineNode::Text(t) => Some(t),
            InlineNode::Atom(_) => None,
        }
    }

    pub fn as_atom(&self) -> Option<&InlineAtom> {
        match self {
            InlineNode::Atom(a) => Some(a),
            InlineNode::Text(_) => None,
        }
    }
}

impl From<TextNode> for InlineNode {
    fn from(node: TextNode) -> Self {
        InlineNode::Text(node)
    }
}

impl From<InlineAtom> for InlineNode {
    fn from(atom: InlineAtom) -> Self {
        InlineNode::Atom(atom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::attrs::attrs_of;

    #[test]
    fn atoms_are_one_offset_unit_long() {
        let atom = InlineAtom::new(
            "image",
            attrs_of([("src", "blob:cat.png")]),
        );
        assert_eq!(InlineNode::from(atom).char_len(), 1);
    }

    #[test]
    fn untagged_json_distinguishes_text_from_atoms() {
        let nodes: Vec<InlineNode> = serde_json::from_str(
            r#"[
                {"text": "hi", "marks": [{"type": "bold"}]},
                {"type": "hardBreak"}
            ]"#,
        )
        .unwrap();
        assert!(nodes[0].is_text());
        assert!(nodes[1].is_atom());
        assert_eq!(nodes[1].as_atom().unwrap().kind(), "hardBreak");
    }
}
