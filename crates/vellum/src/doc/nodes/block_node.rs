// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::doc::attrs::AttrMap;
use crate::doc::block_id::BlockId;
use crate::doc::marks::MarkSet;
use crate::doc::nodes::InlineNode;

/// Built-in block kinds the core itself needs to name. The set of kinds is
/// open; feature plugins register their own node specs.
pub mod kinds {
    pub const PARAGRAPH: &str = "paragraph";
    pub const HEADING: &str = "heading";
    pub const BLOCKQUOTE: &str = "blockquote";
    pub const LIST: &str = "list";
    pub const LIST_ITEM: &str = "listItem";
    pub const TABLE: &str = "table";
    pub const TABLE_ROW: &str = "tableRow";
    pub const TABLE_CELL: &str = "tableCell";
}

/// A block's ordered children: either inline content (the leaf layer where
/// offsets live) or nested blocks (tables, rows, lists).
///
/// The two shapes are a typed sum, so a mixed child sequence cannot be
/// represented even transiently; inline normalization is the only
/// normalization there is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    Inline(Vec<InlineNode>),
    Blocks(Vec<Arc<BlockNode>>),
}

impl Children {
    pub fn empty_inline() -> Self {
        Children::Inline(Vec::new())
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Children::Inline(_))
    }
}

/// A structural node: unique id, symbolic kind, attribute map, children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(rename = "type")]
    kind: String,
    id: BlockId,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    attrs: AttrMap,
    children: Children,
}

impl BlockNode {
    pub fn new(
        id: impl Into<BlockId>,
        kind: impl Into<String>,
        attrs: AttrMap,
        children: Children,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            attrs,
            children,
        }
    }

    /// A paragraph with the given inline content.
    pub fn paragraph(
        id: impl Into<BlockId>,
        inline: Vec<InlineNode>,
    ) -> Self {
        Self::new(
            id,
            kinds::PARAGRAPH,
            AttrMap::new(),
            Children::Inline(inline),
        )
    }

    /// A container block with nested block children.
    pub fn container(
        id: impl Into<BlockId>,
        kind: impl Into<String>,
        children: Vec<BlockNode>,
    ) -> Self {
        Self::new(
            id,
            kind,
            AttrMap::new(),
            Children::Blocks(children.into_iter().map(Arc::new).collect()),
        )
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn inline_children(&self) -> Option<&[InlineNode]> {
        match &self.children {
            Children::Inline(nodes) => Some(nodes),
            Children::Blocks(_) => None,
        }
    }

    pub fn child_blocks(&self) -> Option<&[Arc<BlockNode>]> {
        match &self.children {
            Children::Blocks(blocks) => Some(blocks),
            Children::Inline(_) => None,
        }
    }

    /// True for blocks whose children are inline content. Offsets only
    /// exist inside such blocks.
    pub fn is_inline_block(&self) -> bool {
        self.children.is_inline()
    }

    /// Length in offset units. Container blocks have no offset space and
    /// report 0.
    pub fn inline_len(&self) -> usize {
        match &self.children {
            Children::Inline(nodes) => {
                nodes.iter().map(InlineNode::char_len).sum()
            }
            Children::Blocks(_) => 0,
        }
    }

    /// Concatenated text of the inline children; atoms contribute nothing.
    pub fn text(&self) -> String {
        match &self.children {
            Children::Inline(nodes) => nodes
                .iter()
                .filter_map(InlineNode::as_text)
                .map(|t| t.text())
                .collect(),
            Children::Blocks(_) => String::new(),
        }
    }

    /// The mark set governing the given offset: the marks of the content
    /// immediately before it, or of the first run at offset 0. Atoms carry
    /// no marks.
    pub fn marks_at(&self, offset: usize) -> MarkSet {
        let Some(nodes) = self.inline_children() else {
            return MarkSet::new();
        };
        // Look at the node containing offset-1 (or the first node at 0).
        let probe = offset.saturating_sub(1);
        let mut pos = 0;
        for node in nodes {
            let len = node.char_len();
            if probe < pos + len {
                return match node {
                    InlineNode::Text(t) => t.marks().clone(),
                    InlineNode::Atom(_) => MarkSet::new(),
                };
            }
            pos += len;
        }
        MarkSet::new()
    }

    pub fn with_children(&self, children: Children) -> BlockNode {
        BlockNode::new(
            self.id.clone(),
            self.kind.clone(),
            self.attrs.clone(),
            children,
        )
    }

    pub fn with_inline(&self, inline: Vec<InlineNode>) -> BlockNode {
        self.with_children(Children::Inline(inline))
    }

    pub fn with_attrs(&self, attrs: AttrMap) -> BlockNode {
        BlockNode::new(
            self.id.clone(),
            self.kind.clone(),
            attrs,
            self.children.clone(),
        )
    }

    pub fn with_kind_and_attrs(
        &self,
        kind: impl Into<String>,
        attrs: AttrMap,
    ) -> BlockNode {
        BlockNode::new(self.id.clone(), kind, attrs, self.children.clone())
    }
}
