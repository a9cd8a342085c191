// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! `apply(doc, step) → doc`. Total: every failure is a [`StepError`], and
//! a failed step leaves the input document untouched (the fold aborts).

use crate::doc::inline;
use crate::doc::{
    normalize_inline, BlockEdit, BlockId, BlockNode, Children, Doc,
    InlineNode,
};
use crate::error::StepError;
use crate::schema::SchemaRegistry;
use crate::step::{MarkTarget, Step};

/// Apply every step in order, aborting on the first failure.
pub fn apply_all(
    doc: &Doc,
    steps: &[Step],
    schema: &SchemaRegistry,
) -> Result<Doc, StepError> {
    let mut current = doc.clone();
    for step in steps {
        current = apply_step(&current, step, schema)?;
    }
    Ok(current)
}

/// Apply one step, producing a new document that shares every untouched
/// subtree with the input.
pub fn apply_step(
    doc: &Doc,
    step: &Step,
    schema: &SchemaRegistry,
) -> Result<Doc, StepError> {
    match step {
        Step::InsertText {
            block_id,
            offset,
            segments,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            check_offset(block, *offset)?;
            let (left, right) = inline::split_at(children, *offset);
            let mut out = left;
            out.extend(
                segments
                    .iter()
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .map(InlineNode::Text),
            );
            out.extend(right);
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::DeleteText {
            block_id,
            from,
            to,
            captured: _,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            check_range(block, *from, *to)?;
            if inline::capture_text_slices(children, *from, *to).is_none() {
                return Err(StepError::RangeCrossesAtom {
                    block_id: block.id().clone(),
                    from: *from,
                    to: *to,
                });
            }
            let (left, tail) = inline::split_at(children, *from);
            let (_, right) = inline::split_at(&tail, *to - *from);
            let mut out = left;
            out.extend(right);
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::SplitBlock {
            block_id,
            offset,
            new_block_id,
            new_kind,
            new_attrs,
        } => {
            if doc.contains_block(new_block_id) {
                return Err(StepError::DuplicateBlock(new_block_id.clone()));
            }
            if let Some(rule) = schema.content_rule(new_kind) {
                if rule != crate::doc::ContentRule::Inline {
                    return Err(StepError::Content {
                        parent: new_kind.clone(),
                        child: "inline content".to_owned(),
                    });
                }
            }
            doc.map_block(block_id, |block| {
                let children = inline_children(block)?;
                check_offset(block, *offset)?;
                let (left, right) = inline::split_at(children, *offset);
                let left_block =
                    block.with_inline(normalize_inline(left));
                let right_block = BlockNode::new(
                    new_block_id.clone(),
                    new_kind.clone(),
                    new_attrs.clone(),
                    Children::Inline(normalize_inline(right)),
                );
                Ok(BlockEdit::ReplaceMany(vec![left_block, right_block]))
            })
        }

        Step::MergeBlocks {
            target,
            source,
            boundary,
            ..
        } => {
            let target_block = doc
                .find_block(target)
                .ok_or_else(|| StepError::UnknownBlock(target.clone()))?;
            if !target_block.is_inline_block() {
                return Err(StepError::NotInlineBlock(target.clone()));
            }
            if *boundary != target_block.inline_len() {
                return Err(StepError::OffsetOutOfRange {
                    block_id: target.clone(),
                    offset: *boundary,
                    len: target_block.inline_len(),
                });
            }
            let (without_source, source_block) = doc.take_block(source)?;
            let source_children = source_block
                .inline_children()
                .ok_or_else(|| StepError::NotInlineBlock(source.clone()))?
                .to_vec();
            without_source.map_block(target, |block| {
                let mut out = inline_children(block)?.to_vec();
                out.extend(source_children);
                Ok(BlockEdit::Replace(
                    block.with_inline(normalize_inline(out)),
                ))
            })
        }

        Step::AddMark {
            block_id,
            from,
            to,
            mark,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            check_range(block, *from, *to)?;
            let out = inline::map_marks_in_range(
                children,
                *from,
                *to,
                &|marks| marks.with(mark.clone()),
            );
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::RemoveMark {
            block_id,
            from,
            to,
            target,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            check_range(block, *from, *to)?;
            let out = inline::map_marks_in_range(
                children,
                *from,
                *to,
                &|marks| match target {
                    MarkTarget::Kind(kind) => marks.without_kind(kind),
                    MarkTarget::Exact(mark) => {
                        let mut next = marks.clone();
                        next.remove_exact(mark);
                        next
                    }
                },
            );
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::SetBlockType {
            block_id,
            new_kind,
            new_attrs,
            ..
        } => doc.map_block(block_id, |block| {
            if let Some(rule) = schema.content_rule(new_kind) {
                let inline_ok = rule == crate::doc::ContentRule::Inline;
                match block.children() {
                    Children::Inline(_) if !inline_ok => {
                        return Err(StepError::Content {
                            parent: new_kind.clone(),
                            child: "inline content".to_owned(),
                        })
                    }
                    Children::Blocks(children) if inline_ok => {
                        let child = children
                            .first()
                            .map(|c| c.kind().to_owned())
                            .unwrap_or_else(|| "block".to_owned());
                        return Err(StepError::Content {
                            parent: new_kind.clone(),
                            child,
                        });
                    }
                    Children::Blocks(children) => {
                        for child in children {
                            if !rule.allows_block(child.kind()) {
                                return Err(StepError::Content {
                                    parent: new_kind.clone(),
                                    child: child.kind().to_owned(),
                                });
                            }
                        }
                    }
                    Children::Inline(_) => {}
                }
            }
            Ok(BlockEdit::Replace(
                block.with_kind_and_attrs(new_kind.clone(), new_attrs.clone()),
            ))
        }),

        Step::InsertNode {
            parent_path,
            index,
            node,
        } => {
            for id in subtree_ids(node) {
                if doc.contains_block(&id) {
                    return Err(StepError::DuplicateBlock(id));
                }
            }
            if let Some(parent_id) = parent_path.last() {
                let parent = doc.lookup_path(parent_path).ok_or_else(|| {
                    StepError::UnknownBlock(parent_id.clone())
                })?;
                if let Some(rule) = schema.content_rule(parent.kind()) {
                    if !rule.allows_block(node.kind()) {
                        return Err(StepError::Content {
                            parent: parent.kind().to_owned(),
                            child: node.kind().to_owned(),
                        });
                    }
                }
            }
            doc.insert_node(parent_path, *index, node.clone())
        }

        Step::RemoveNode {
            parent_path,
            index,
            captured: _,
        } => doc.remove_node(parent_path, *index),

        Step::SetNodeAttr {
            path, new_attrs, ..
        } => doc.map_node_by_path(path, |block| {
            Ok(BlockEdit::Replace(block.with_attrs(new_attrs.clone())))
        }),

        Step::InsertInlineNode {
            block_id,
            offset,
            atom,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            check_offset(block, *offset)?;
            let (left, right) = inline::split_at(children, *offset);
            let mut out = left;
            out.push(InlineNode::Atom(atom.clone()));
            out.extend(right);
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::RemoveInlineNode {
            block_id,
            offset,
            captured: _,
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            let index = match inline::node_at(children, *offset) {
                Some((i, node)) if node.is_atom() => i,
                _ => {
                    return Err(StepError::ExpectedAtom {
                        block_id: block.id().clone(),
                        offset: *offset,
                    })
                }
            };
            let mut out = children.to_vec();
            out.remove(index);
            Ok(BlockEdit::Replace(block.with_inline(normalize_inline(out))))
        }),

        Step::SetInlineNodeAttr {
            block_id,
            offset,
            new_attrs,
            ..
        } => doc.map_block(block_id, |block| {
            let children = inline_children(block)?;
            let index = match inline::node_at(children, *offset) {
                Some((i, node)) if node.is_atom() => i,
                _ => {
                    return Err(StepError::ExpectedAtom {
                        block_id: block.id().clone(),
                        offset: *offset,
                    })
                }
            };
            let mut out = children.to_vec();
            let atom = out[index]
                .as_atom()
                .expect("checked to be an atom")
                .with_attrs(new_attrs.clone());
            out[index] = InlineNode::Atom(atom);
            Ok(BlockEdit::Replace(block.with_inline(out)))
        }),

        Step::SetStoredMarks { .. } => Ok(doc.clone()),
    }
}

fn inline_children(block: &BlockNode) -> Result<&[InlineNode], StepError> {
    block
        .inline_children()
        .ok_or_else(|| StepError::NotInlineBlock(block.id().clone()))
}

fn check_offset(block: &BlockNode, offset: usize) -> Result<(), StepError> {
    let len = block.inline_len();
    if offset > len {
        return Err(StepError::OffsetOutOfRange {
            block_id: block.id().clone(),
            offset,
            len,
        });
    }
    Ok(())
}

fn check_range(
    block: &BlockNode,
    from: usize,
    to: usize,
) -> Result<(), StepError> {
    let len = block.inline_len();
    if from > to || to > len {
        return Err(StepError::OffsetOutOfRange {
            block_id: block.id().clone(),
            offset: from.max(to),
            len,
        });
    }
    Ok(())
}

fn subtree_ids(node: &BlockNode) -> Vec<BlockId> {
    fn walk(node: &BlockNode, out: &mut Vec<BlockId>) {
        out.push(node.id().clone());
        if let Some(children) = node.child_blocks() {
            for child in children {
                walk(child, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(node, &mut out);
    out
}
