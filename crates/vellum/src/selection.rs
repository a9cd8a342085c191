// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

use crate::doc::BlockId;

/// A text position: a block plus an offset into its inline content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub block_id: BlockId,
    pub offset: usize,
}

impl Position {
    pub fn new(block_id: impl Into<BlockId>, offset: usize) -> Self {
        Self {
            block_id: block_id.into(),
            offset,
        }
    }
}

/// Which side of a block a gap cursor sits on.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum GapSide {
    Before,
    After,
}

/// A normalized text range in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelRange {
    pub from: Position,
    pub to: Position,
}

/// The current selection. `path` fields are breadcrumbs (ids from the
/// root), never back-pointers; they are recomputed whenever the referenced
/// block may have moved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Selection {
    /// A range between two text positions; collapsed when anchor == head.
    Text { anchor: Position, head: Position },
    /// One block selected as an atomic unit.
    Node {
        block_id: BlockId,
        path: Vec<BlockId>,
    },
    /// A caret between two blocks (or before the first / after the last),
    /// used next to void blocks where no text position exists.
    Gap {
        block_id: BlockId,
        side: GapSide,
        path: Vec<BlockId>,
    },
}

impl Selection {
    /// A collapsed text selection.
    pub fn caret(block_id: impl Into<BlockId>, offset: usize) -> Self {
        let pos = Position::new(block_id, offset);
        Selection::Text {
            anchor: pos.clone(),
            head: pos,
        }
    }

    pub fn text(anchor: Position, head: Position) -> Self {
        Selection::Text { anchor, head }
    }

    pub fn node(
        block_id: impl Into<BlockId>,
        path: Vec<BlockId>,
    ) -> Self {
        Selection::Node {
            block_id: block_id.into(),
            path,
        }
    }

    pub fn gap(
        block_id: impl Into<BlockId>,
        side: GapSide,
        path: Vec<BlockId>,
    ) -> Self {
        Selection::Gap {
            block_id: block_id.into(),
            side,
            path,
        }
    }

    pub fn is_text_selection(&self) -> bool {
        matches!(self, Selection::Text { .. })
    }

    pub fn is_node_selection(&self) -> bool {
        matches!(self, Selection::Node { .. })
    }

    pub fn is_gap_cursor(&self) -> bool {
        matches!(self, Selection::Gap { .. })
    }

    /// Gap cursors are carets; node selections never collapse.
    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Text { anchor, head } => anchor == head,
            Selection::Node { .. } => false,
            Selection::Gap { .. } => true,
        }
    }

    pub fn as_text(&self) -> Option<(&Position, &Position)> {
        match self {
            Selection::Text { anchor, head } => Some((anchor, head)),
            _ => None,
        }
    }

    /// Whether the head sits at or after the anchor in document order.
    /// Cross-block comparison consults the supplied block order.
    pub fn is_forward(&self, block_order: &[BlockId]) -> bool {
        match self {
            Selection::Text { anchor, head } => {
                if anchor.block_id == head.block_id {
                    anchor.offset <= head.offset
                } else {
                    order_index(block_order, &anchor.block_id)
                        <= order_index(block_order, &head.block_id)
                }
            }
            Selection::Node { .. } | Selection::Gap { .. } => true,
        }
    }

    /// The selection normalized to document order. `None` for node
    /// selections and gap cursors, which have no text range.
    pub fn range(&self, block_order: &[BlockId]) -> Option<SelRange> {
        let (anchor, head) = self.as_text()?;
        let (from, to) = if self.is_forward(block_order) {
            (anchor.clone(), head.clone())
        } else {
            (head.clone(), anchor.clone())
        };
        Some(SelRange { from, to })
    }
}

fn order_index(block_order: &[BlockId], id: &BlockId) -> usize {
    block_order
        .iter()
        .position(|b| b == id)
        .unwrap_or(usize::MAX)
}
