// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::doc::block_id::BlockId;
use crate::doc::nodes::{BlockNode, Children};
use crate::error::StepError;

/// An immutable document: an ordered sequence of top-level blocks.
///
/// Blocks are reference counted, so an edit rebuilds only the spine from
/// the root to the touched block and shares every untouched subtree with
/// the previous document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doc {
    blocks: Vec<Arc<BlockNode>>,
}

/// The outcome of editing one block during an immutable tree walk.
pub(crate) enum BlockEdit {
    Replace(BlockNode),
    ReplaceMany(Vec<BlockNode>),
    Remove,
}

impl Doc {
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        Self {
            blocks: blocks.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_arcs(blocks: Vec<Arc<BlockNode>>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Arc<BlockNode>] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Depth-first search for a block by id.
    pub fn find_block(&self, id: &BlockId) -> Option<&Arc<BlockNode>> {
        fn find_in<'a>(
            blocks: &'a [Arc<BlockNode>],
            id: &BlockId,
        ) -> Option<&'a Arc<BlockNode>> {
            for block in blocks {
                if block.id() == id {
                    return Some(block);
                }
                if let Some(children) = block.child_blocks() {
                    if let Some(found) = find_in(children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        find_in(&self.blocks, id)
    }

    pub fn contains_block(&self, id: &BlockId) -> bool {
        self.find_block(id).is_some()
    }

    /// The id breadcrumb from the root down to (and including) the block.
    pub fn id_path(&self, id: &BlockId) -> Option<Vec<BlockId>> {
        fn walk(
            blocks: &[Arc<BlockNode>],
            id: &BlockId,
            trail: &mut Vec<BlockId>,
        ) -> bool {
            for block in blocks {
                trail.push(block.id().clone());
                if block.id() == id {
                    return true;
                }
                if let Some(children) = block.child_blocks() {
                    if walk(children, id, trail) {
                        return true;
                    }
                }
                trail.pop();
            }
            false
        }
        let mut trail = Vec::new();
        walk(&self.blocks, id, &mut trail).then_some(trail)
    }

    /// The parent breadcrumb and child index of a block: `([], i)` for a
    /// top-level block. Used to build `RemoveNode`/`InsertNode` steps.
    pub fn locate(&self, id: &BlockId) -> Option<(Vec<BlockId>, usize)> {
        let mut path = self.id_path(id)?;
        path.pop();
        let siblings = self.child_list(&path)?;
        let index = siblings.iter().position(|b| b.id() == id)?;
        Some((path, index))
    }

    /// The block at the end of an id breadcrumb.
    pub fn lookup_path(&self, path: &[BlockId]) -> Option<&Arc<BlockNode>> {
        let (first, rest) = path.split_first()?;
        let mut current =
            self.blocks.iter().find(|b| b.id() == first)?;
        for id in rest {
            current = current
                .child_blocks()?
                .iter()
                .find(|b| b.id() == id)?;
        }
        Some(current)
    }

    /// The child list addressed by a parent breadcrumb; `[]` addresses the
    /// document root.
    pub fn child_list(&self, parent_path: &[BlockId]) -> Option<&[Arc<BlockNode>]> {
        if parent_path.is_empty() {
            return Some(&self.blocks);
        }
        self.lookup_path(parent_path)?.child_blocks()
    }

    /// Every block id in depth-first pre-order. This is the ordering that
    /// selection comparison consumes.
    pub fn block_order(&self) -> Vec<BlockId> {
        fn walk(blocks: &[Arc<BlockNode>], out: &mut Vec<BlockId>) {
            for block in blocks {
                out.push(block.id().clone());
                if let Some(children) = block.child_blocks() {
                    walk(children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    /// Ids of the inline-content blocks in document order; the leaf layer
    /// where text offsets live.
    pub fn leaf_order(&self) -> Vec<BlockId> {
        fn walk(blocks: &[Arc<BlockNode>], out: &mut Vec<BlockId>) {
            for block in blocks {
                match block.children() {
                    Children::Inline(_) => out.push(block.id().clone()),
                    Children::Blocks(children) => walk(children, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }

    pub fn first_leaf_block(&self) -> Option<&Arc<BlockNode>> {
        fn walk<'a>(
            blocks: &'a [Arc<BlockNode>],
        ) -> Option<&'a Arc<BlockNode>> {
            for block in blocks {
                match block.children() {
                    Children::Inline(_) => return Some(block),
                    Children::Blocks(children) => {
                        if let Some(found) = walk(children) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        walk(&self.blocks)
    }

    pub fn last_leaf_block(&self) -> Option<&Arc<BlockNode>> {
        fn walk<'a>(
            blocks: &'a [Arc<BlockNode>],
        ) -> Option<&'a Arc<BlockNode>> {
            for block in blocks.iter().rev() {
                match block.children() {
                    Children::Inline(_) => return Some(block),
                    Children::Blocks(children) => {
                        if let Some(found) = walk(children) {
                            return Some(found);
                        }
                    }
                }
            }
            None
        }
        walk(&self.blocks)
    }

    /// The leaf block before `id` in document order.
    pub fn prev_leaf(&self, id: &BlockId) -> Option<BlockId> {
        let order = self.leaf_order();
        let i = order.iter().position(|b| b == id)?;
        (i > 0).then(|| order[i - 1].clone())
    }

    /// The leaf block after `id` in document order.
    pub fn next_leaf(&self, id: &BlockId) -> Option<BlockId> {
        let order = self.leaf_order();
        let i = order.iter().position(|b| b == id)?;
        order.get(i + 1).cloned()
    }

    /// Plain text of the document: leaf blocks joined with newlines.
    pub fn to_text(&self) -> String {
        fn walk(blocks: &[Arc<BlockNode>], out: &mut Vec<String>) {
            for block in blocks {
                match block.children() {
                    Children::Inline(_) => out.push(block.text()),
                    Children::Blocks(children) => walk(children, out),
                }
            }
        }
        let mut lines = Vec::new();
        walk(&self.blocks, &mut lines);
        lines.join("\n")
    }

    /// Rebuild the tree with one block edited, sharing untouched subtrees.
    pub(crate) fn map_block<F>(
        &self,
        id: &BlockId,
        f: F,
    ) -> Result<Doc, StepError>
    where
        F: FnOnce(&BlockNode) -> Result<BlockEdit, StepError>,
    {
        let mut f = Some(f);
        let edited = map_in(&self.blocks, id, &mut f)?;
        match edited {
            Some(blocks) => Ok(Doc::from_arcs(blocks)),
            None => Err(StepError::UnknownBlock(id.clone())),
        }
    }

    /// Rebuild the tree with the block at the end of an id breadcrumb
    /// edited. The breadcrumb disambiguates nothing (ids are unique) but
    /// lets callers fail deterministically on a stale path.
    pub(crate) fn map_node_by_path<F>(
        &self,
        path: &[BlockId],
        f: F,
    ) -> Result<Doc, StepError>
    where
        F: FnOnce(&BlockNode) -> Result<BlockEdit, StepError>,
    {
        let Some(target) = path.last() else {
            return Err(StepError::UnknownPath(String::new()));
        };
        if self.lookup_path(path).is_none() {
            return Err(StepError::UnknownPath(join_path(path)));
        }
        self.map_block(target, f)
    }

    /// Insert a subtree under the parent breadcrumb at `index`.
    pub(crate) fn insert_node(
        &self,
        parent_path: &[BlockId],
        index: usize,
        node: BlockNode,
    ) -> Result<Doc, StepError> {
        if parent_path.is_empty() {
            let len = self.blocks.len();
            if index > len {
                return Err(StepError::IndexOutOfBounds { index, len });
            }
            let mut blocks = self.blocks.clone();
            blocks.insert(index, Arc::new(node));
            return Ok(Doc::from_arcs(blocks));
        }
        let parent_id = parent_path.last().unwrap();
        if self.lookup_path(parent_path).is_none() {
            return Err(StepError::UnknownPath(join_path(parent_path)));
        }
        self.map_block(parent_id, |parent| {
            let Some(children) = parent.child_blocks() else {
                return Err(StepError::NotContainerBlock(parent.id().clone()));
            };
            if index > children.len() {
                return Err(StepError::IndexOutOfBounds {
                    index,
                    len: children.len(),
                });
            }
            let mut children = children.to_vec();
            children.insert(index, Arc::new(node));
            Ok(BlockEdit::Replace(
                parent.with_children(Children::Blocks(children)),
            ))
        })
    }

    /// Remove the child at `index` under the parent breadcrumb.
    pub(crate) fn remove_node(
        &self,
        parent_path: &[BlockId],
        index: usize,
    ) -> Result<Doc, StepError> {
        if parent_path.is_empty() {
            let len = self.blocks.len();
            if index >= len {
                return Err(StepError::IndexOutOfBounds { index, len });
            }
            let mut blocks = self.blocks.clone();
            blocks.remove(index);
            return Ok(Doc::from_arcs(blocks));
        }
        let parent_id = parent_path.last().unwrap();
        if self.lookup_path(parent_path).is_none() {
            return Err(StepError::UnknownPath(join_path(parent_path)));
        }
        self.map_block(parent_id, |parent| {
            let Some(children) = parent.child_blocks() else {
                return Err(StepError::NotContainerBlock(parent.id().clone()));
            };
            if index >= children.len() {
                return Err(StepError::IndexOutOfBounds {
                    index,
                    len: children.len(),
                });
            }
            let mut children = children.to_vec();
            children.remove(index);
            Ok(BlockEdit::Replace(
                parent.with_children(Children::Blocks(children)),
            ))
        })
    }

    /// Remove a block (wherever it sits) and return it alongside the new
    /// document. Used by `MergeBlocks` to lift the source block out.
    pub(crate) fn take_block(
        &self,
        id: &BlockId,
    ) -> Result<(Doc, BlockNode), StepError> {
        let block = self
            .find_block(id)
            .ok_or_else(|| StepError::UnknownBlock(id.clone()))?
            .as_ref()
            .clone();
        let doc = self.map_block(id, |_| Ok(BlockEdit::Remove))?;
        Ok((doc, block))
    }

    /// Every block id in the tree, for uniqueness checks.
    pub fn collect_ids(&self) -> Vec<BlockId> {
        self.block_order()
    }

    /// A copy with every inline child sequence normalized. Documents
    /// arriving from outside (JSON, HTML) pass through here before they
    /// become state.
    pub fn normalized(&self) -> Doc {
        use crate::doc::normalize::normalize_inline;

        fn norm(block: &BlockNode) -> BlockNode {
            match block.children() {
                Children::Inline(nodes) => block
                    .with_inline(normalize_inline(nodes.to_vec())),
                Children::Blocks(children) => {
                    block.with_children(Children::Blocks(
                        children
                            .iter()
                            .map(|c| Arc::new(norm(c)))
                            .collect(),
                    ))
                }
            }
        }
        Doc::from_arcs(
            self.blocks.iter().map(|b| Arc::new(norm(b))).collect(),
        )
    }
}

fn join_path(path: &[BlockId]) -> String {
    path.iter()
        .map(BlockId::as_str)
        .collect::<Vec<_>>()
        .join(" > ")
}

fn map_in<F>(
    blocks: &[Arc<BlockNode>],
    id: &BlockId,
    f: &mut Option<F>,
) -> Result<Option<Vec<Arc<BlockNode>>>, StepError>
where
    F: FnOnce(&BlockNode) -> Result<BlockEdit, StepError>,
{
    for (i, block) in blocks.iter().enumerate() {
        if block.id() == id {
            let f = f.take().expect("edit closure consumed twice");
            let edit = f(block)?;
            let mut out: Vec<Arc<BlockNode>> = Vec::with_capacity(
                blocks.len() + 1,
            );
            out.extend(blocks[..i].iter().cloned());
            match edit {
                BlockEdit::Replace(node) => out.push(Arc::new(node)),
                BlockEdit::ReplaceMany(nodes) => {
                    out.extend(nodes.into_iter().map(Arc::new))
                }
                BlockEdit::Remove => {}
            }
            out.extend(blocks[i + 1..].iter().cloned());
            return Ok(Some(out));
        }
        if let Some(children) = block.child_blocks() {
            if let Some(new_children) = map_in(children, id, f)? {
                let mut out: Vec<Arc<BlockNode>> =
                    Vec::with_capacity(blocks.len());
                out.extend(blocks[..i].iter().cloned());
                out.push(Arc::new(
                    block.with_children(Children::Blocks(new_children)),
                ));
                out.extend(blocks[i + 1..].iter().cloned());
                return Ok(Some(out));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::nodes::{kinds, InlineNode};

    fn table_doc() -> Doc {
        Doc::new(vec![
            BlockNode::paragraph("p1", vec![InlineNode::plain("intro")]),
            BlockNode::container(
                "t1",
                kinds::TABLE,
                vec![BlockNode::container(
                    "r1",
                    kinds::TABLE_ROW,
                    vec![BlockNode::container(
                        "c1",
                        kinds::TABLE_CELL,
                        vec![BlockNode::paragraph(
                            "p2",
                            vec![InlineNode::plain("cell")],
                        )],
                    )],
                )],
            ),
        ])
    }

    #[test]
    fn find_block_reaches_nested_blocks() {
        let doc = table_doc();
        assert_eq!(doc.find_block(&"p2".into()).unwrap().text(), "cell");
        assert!(doc.find_block(&"nope".into()).is_none());
    }

    #[test]
    fn id_path_is_the_breadcrumb_from_the_root() {
        let doc = table_doc();
        let path = doc.id_path(&"p2".into()).unwrap();
        let expected: Vec<BlockId> =
            ["t1", "r1", "c1", "p2"].iter().map(|s| (*s).into()).collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn locate_returns_parent_breadcrumb_and_index() {
        let doc = table_doc();
        assert_eq!(doc.locate(&"p1".into()).unwrap(), (vec![], 0));
        let (path, index) = doc.locate(&"p2".into()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(path.last().unwrap(), &BlockId::new("c1"));
    }

    #[test]
    fn block_order_is_depth_first_pre_order() {
        let order = table_doc().block_order();
        let expected: Vec<BlockId> = ["p1", "t1", "r1", "c1", "p2"]
            .iter()
            .map(|s| (*s).into())
            .collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn leaf_order_only_lists_inline_blocks() {
        let order = table_doc().leaf_order();
        let expected: Vec<BlockId> =
            ["p1", "p2"].iter().map(|s| (*s).into()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn map_block_shares_untouched_subtrees() {
        let doc = table_doc();
        let edited = doc
            .map_block(&"p1".into(), |b| {
                Ok(BlockEdit::Replace(
                    b.with_inline(vec![InlineNode::plain("changed")]),
                ))
            })
            .unwrap();
        assert_eq!(edited.find_block(&"p1".into()).unwrap().text(), "changed");
        // The table subtree is the same allocation as before.
        assert!(Arc::ptr_eq(&doc.blocks()[1], &edited.blocks()[1]));
    }

    #[test]
    fn map_block_rebuilds_the_spine_for_nested_targets() {
        let doc = table_doc();
        let edited = doc
            .map_block(&"p2".into(), |b| {
                Ok(BlockEdit::Replace(
                    b.with_inline(vec![InlineNode::plain("edited")]),
                ))
            })
            .unwrap();
        assert_eq!(edited.find_block(&"p2".into()).unwrap().text(), "edited");
        // Untouched sibling subtree shared; edited spine reallocated.
        assert!(Arc::ptr_eq(&doc.blocks()[0], &edited.blocks()[0]));
        assert!(!Arc::ptr_eq(&doc.blocks()[1], &edited.blocks()[1]));
    }

    #[test]
    fn map_block_on_a_missing_id_is_an_error() {
        let err = table_doc()
            .map_block(&"ghost".into(), |b| {
                Ok(BlockEdit::Replace(b.clone()))
            })
            .unwrap_err();
        assert_eq!(err, StepError::UnknownBlock("ghost".into()));
    }

    #[test]
    fn take_block_removes_and_returns_the_block() {
        let (doc, removed) = table_doc().take_block(&"p1".into()).unwrap();
        assert_eq!(removed.text(), "intro");
        assert!(!doc.contains_block(&"p1".into()));
        assert!(doc.contains_block(&"p2".into()));
    }

    #[test]
    fn to_text_joins_leaf_blocks_with_newlines() {
        assert_eq!(table_doc().to_text(), "intro\ncell");
    }

    #[test]
    fn prev_and_next_leaf_walk_document_order() {
        let doc = table_doc();
        assert_eq!(doc.next_leaf(&"p1".into()), Some("p2".into()));
        assert_eq!(doc.prev_leaf(&"p2".into()), Some("p1".into()));
        assert_eq!(doc.prev_leaf(&"p1".into()), None);
        assert_eq!(doc.next_leaf(&"p2".into()), None);
    }
}
