// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

use crate::doc::marks::MarkSet;

/// An immutable run of text with a mark set.
///
/// Text nodes are not observable through offset space: boundaries between
/// adjacent runs only exist as cumulative offsets, and normalization is
/// free to merge or split runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextNode {
    text: String,
    #[serde(default, skip_serializing_if = "MarkSet::is_empty")]
    marks: MarkSet,
}

impl TextNode {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, MarkSet::new())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn marks(&self) -> &MarkSet {
        &self.marks
    }

    /// Length in offset units (Unicode scalar values).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The run restricted to char range `from..to`, keeping its marks.
    pub fn slice(&self, from: usize, to: usize) -> TextNode {
        let start = byte_index(&self.text, from);
        let end = byte_index(&self.text, to);
        TextNode::new(&self.text[start..end], self.marks.clone())
    }

    /// A copy with a different mark set.
    pub fn with_marks(&self, marks: MarkSet) -> TextNode {
        TextNode::new(self.text.clone(), marks)
    }
}

impl From<&str> for TextNode {
    fn from(text: &str) -> Self {
        TextNode::plain(text)
    }
}

/// Byte index of the `chars`-th Unicode scalar value in `text`.
/// `chars` past the end maps to `text.len()`.
pub(crate) fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
