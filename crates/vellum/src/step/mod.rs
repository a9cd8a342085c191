// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

mod apply;
mod invert;

pub use apply::{apply_all, apply_step};

use strum_macros::{Display, EnumDiscriminants};

use crate::doc::{
    AttrMap, BlockId, BlockNode, InlineAtom, Mark, MarkSet, TextNode,
};

/// What a `RemoveMark` step removes: every mark of a kind, or one exact
/// mark value. Engine commands emit `Exact` over uniform runs so the
/// inversion (`AddMark` of the same value over the same run) is faithful.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkTarget {
    Kind(String),
    Exact(Mark),
}

impl MarkTarget {
    pub fn kind(&self) -> &str {
        match self {
            MarkTarget::Kind(kind) => kind,
            MarkTarget::Exact(mark) => mark.kind(),
        }
    }
}

/// An atomic, invertible document edit.
///
/// Every variant carries the data needed both to apply it and to invert
/// it: steps that remove content capture that content at construction
/// time, steps that overwrite capture the overwritten value.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(StepKind), derive(Display, Hash))]
pub enum Step {
    /// Insert text runs at an offset; surrounding runs are split and the
    /// result re-normalized.
    InsertText {
        block_id: BlockId,
        offset: usize,
        segments: Vec<TextNode>,
    },
    /// Remove a text-only range. `captured` holds the removed runs with
    /// their per-slice marks; capturing only the left-edge marks would
    /// corrupt formatting on undo.
    DeleteText {
        block_id: BlockId,
        from: usize,
        to: usize,
        captured: Vec<TextNode>,
    },
    /// Split one block in two at an offset. The right block takes the new
    /// id; its kind and attrs ride in the step ([`Step::split_block`]
    /// fills them from the block being split, the inherit rule) so that
    /// inverting a merge can resurrect a dissimilar source block.
    SplitBlock {
        block_id: BlockId,
        offset: usize,
        new_block_id: BlockId,
        new_kind: String,
        new_attrs: AttrMap,
    },
    /// Append the source block's inline children to the target and delete
    /// the source. `boundary` is the target's length before the merge;
    /// the source's kind and attrs are captured so inversion restores
    /// its original identity, not the target's.
    MergeBlocks {
        target: BlockId,
        source: BlockId,
        boundary: usize,
        source_kind: String,
        source_attrs: AttrMap,
    },
    AddMark {
        block_id: BlockId,
        from: usize,
        to: usize,
        mark: Mark,
    },
    RemoveMark {
        block_id: BlockId,
        from: usize,
        to: usize,
        target: MarkTarget,
    },
    /// Change a block's kind and attrs in place; attrs are replaced
    /// wholesale (an empty map clears them). The old kind and attrs are
    /// captured for inversion.
    SetBlockType {
        block_id: BlockId,
        new_kind: String,
        new_attrs: AttrMap,
        old_kind: String,
        old_attrs: AttrMap,
    },
    /// Insert a whole block subtree under the parent breadcrumb.
    InsertNode {
        parent_path: Vec<BlockId>,
        index: usize,
        node: BlockNode,
    },
    RemoveNode {
        parent_path: Vec<BlockId>,
        index: usize,
        captured: BlockNode,
    },
    SetNodeAttr {
        path: Vec<BlockId>,
        new_attrs: AttrMap,
        old_attrs: AttrMap,
    },
    InsertInlineNode {
        block_id: BlockId,
        offset: usize,
        atom: InlineAtom,
    },
    RemoveInlineNode {
        block_id: BlockId,
        offset: usize,
        captured: InlineAtom,
    },
    SetInlineNodeAttr {
        block_id: BlockId,
        offset: usize,
        new_attrs: AttrMap,
        old_attrs: AttrMap,
    },
    /// State-level step: no document change.
    SetStoredMarks {
        new: Option<MarkSet>,
        old: Option<MarkSet>,
    },
}

impl Step {
    /// A single-segment `InsertText`.
    pub fn insert_text(
        block_id: impl Into<BlockId>,
        offset: usize,
        text: impl Into<String>,
        marks: MarkSet,
    ) -> Self {
        Step::InsertText {
            block_id: block_id.into(),
            offset,
            segments: vec![TextNode::new(text, marks)],
        }
    }

    /// A `SplitBlock` whose right-hand block inherits the split block's
    /// kind and attributes.
    pub fn split_block(
        block: &BlockNode,
        offset: usize,
        new_block_id: impl Into<BlockId>,
    ) -> Self {
        Step::SplitBlock {
            block_id: block.id().clone(),
            offset,
            new_block_id: new_block_id.into(),
            new_kind: block.kind().to_owned(),
            new_attrs: block.attrs().clone(),
        }
    }

    /// A `MergeBlocks` capturing the source block's identity at
    /// construction time.
    pub fn merge_blocks(
        target: impl Into<BlockId>,
        boundary: usize,
        source: &BlockNode,
    ) -> Self {
        Step::MergeBlocks {
            target: target.into(),
            source: source.id().clone(),
            boundary,
            source_kind: source.kind().to_owned(),
            source_attrs: source.attrs().clone(),
        }
    }

    pub fn kind(&self) -> StepKind {
        StepKind::from(self)
    }

    /// Whether the step edits the document tree (as opposed to state-only
    /// bookkeeping like stored marks).
    pub fn is_document_step(&self) -> bool {
        !matches!(self, Step::SetStoredMarks { .. })
    }
}
