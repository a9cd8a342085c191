// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::doc::{
    BlockId, BlockNode, Doc, IdGenerator, InlineNode, MarkSet,
};
use crate::error::StepError;
use crate::schema::{self, SchemaRegistry, SharedRegistry};
use crate::selection::Selection;
use crate::step::{apply_all, Step};
use crate::transaction::Transaction;

/// Optional pieces for [`EditorState::create`]. Anything left `None`
/// gets a default: an empty paragraph document, a caret at its start, no
/// stored marks, a registry with the built-in specs.
#[derive(Default)]
pub struct StateConfig {
    pub doc: Option<Doc>,
    pub selection: Option<Selection>,
    pub stored_marks: Option<MarkSet>,
    pub schema: Option<SharedRegistry>,
}

/// An immutable editor snapshot: `(doc, selection, stored_marks, schema)`.
///
/// `apply` is the engine's whole state machine: fold the steps, carry or
/// replace the stored marks, validate the selection against the new
/// document, return a new state.
#[derive(Clone)]
pub struct EditorState {
    doc: Doc,
    selection: Selection,
    stored_marks: Option<MarkSet>,
    schema: SharedRegistry,
    // Lazily-built indexes. Safe to race-read: both are deterministic
    // functions of the immutable doc and OnceCell keeps the init
    // idempotent.
    block_index: OnceCell<HashMap<BlockId, Arc<BlockNode>>>,
    block_order: OnceCell<Vec<BlockId>>,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("doc", &self.doc)
            .field("selection", &self.selection)
            .field("stored_marks", &self.stored_marks)
            .finish_non_exhaustive()
    }
}

impl PartialEq for EditorState {
    /// States compare by content: doc, selection and stored marks. The
    /// schema handle and the caches are identity/plumbing.
    fn eq(&self, other: &Self) -> bool {
        self.doc == other.doc
            && self.selection == other.selection
            && self.stored_marks == other.stored_marks
    }
}

impl EditorState {
    fn assemble(
        doc: Doc,
        selection: Selection,
        stored_marks: Option<MarkSet>,
        schema: SharedRegistry,
    ) -> Self {
        Self {
            doc,
            selection,
            stored_marks,
            schema,
            block_index: OnceCell::new(),
            block_order: OnceCell::new(),
        }
    }

    pub fn create(config: StateConfig) -> Self {
        let schema = config.schema.unwrap_or_else(|| {
            schema::shared(SchemaRegistry::with_defaults())
        });
        let doc = match config.doc {
            Some(doc) if doc.first_leaf_block().is_some() => doc,
            _ => Doc::new(vec![BlockNode::paragraph(
                IdGenerator::random().next_id(),
                vec![InlineNode::plain("")],
            )]),
        };
        let selection = match config.selection {
            Some(selection) => validate_selection(&selection, &doc),
            None => first_leaf_caret(&doc)
                .expect("document guaranteed to have a leaf block"),
        };
        Self::assemble(doc, selection, config.stored_marks, schema)
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stored_marks(&self) -> Option<&MarkSet> {
        self.stored_marks.as_ref()
    }

    pub fn schema(&self) -> &SharedRegistry {
        &self.schema
    }

    /// O(1) amortized block lookup through the lazily-built index.
    pub fn block(&self, id: &BlockId) -> Option<Arc<BlockNode>> {
        let index = self.block_index.get_or_init(|| {
            let mut map = HashMap::new();
            fn walk(
                blocks: &[Arc<BlockNode>],
                map: &mut HashMap<BlockId, Arc<BlockNode>>,
            ) {
                for block in blocks {
                    map.insert(block.id().clone(), Arc::clone(block));
                    if let Some(children) = block.child_blocks() {
                        walk(children, map);
                    }
                }
            }
            walk(self.doc.blocks(), &mut map);
            map
        });
        index.get(id).cloned()
    }

    /// Depth-first block order, cached per state: repeated calls return
    /// the same slice.
    pub fn block_order(&self) -> &[BlockId] {
        self.block_order.get_or_init(|| self.doc.block_order())
    }

    /// The inline length of a block; `None` when it does not exist or has
    /// no offset space.
    pub fn block_len(&self, id: &BlockId) -> Option<usize> {
        let block = self.block(id)?;
        block.is_inline_block().then(|| block.inline_len())
    }

    /// Fold a transaction into a new state. A failing step aborts the
    /// whole application and leaves this state untouched.
    pub fn apply(&self, tr: &Transaction) -> Result<EditorState, StepError> {
        let new_doc = {
            let registry = self.schema.read();
            apply_all(&self.doc, tr.steps(), &registry)?
        };

        // Stored marks: the last SetStoredMarks in the step list wins,
        // otherwise they carry forward.
        let stored_marks = tr
            .steps()
            .iter()
            .rev()
            .find_map(|step| match step {
                Step::SetStoredMarks { new, .. } => Some(new.clone()),
                _ => None,
            })
            .unwrap_or_else(|| self.stored_marks.clone());

        let requested = tr
            .selection_after()
            .cloned()
            .unwrap_or_else(|| self.selection.clone());
        let selection = validate_selection(&requested, &new_doc);

        Ok(Self::assemble(
            new_doc,
            selection,
            stored_marks,
            self.schema.clone(),
        ))
    }
}

fn first_leaf_caret(doc: &Doc) -> Option<Selection> {
    doc.first_leaf_block()
        .map(|block| Selection::caret(block.id().clone(), 0))
}

/// Resolve a selection against a document:
/// - a valid selection passes through by identity
/// - offsets past a block's length clamp to the length
/// - references to missing blocks fall back to a caret at the first leaf
/// - node/gap breadcrumbs are recomputed when stale
pub fn validate_selection(selection: &Selection, doc: &Doc) -> Selection {
    let fallback = || first_leaf_caret(doc);
    match selection {
        Selection::Text { anchor, head } => {
            let anchor_len = inline_len_of(doc, &anchor.block_id);
            let head_len = inline_len_of(doc, &head.block_id);
            match (anchor_len, head_len) {
                (Some(a_len), Some(h_len)) => {
                    if anchor.offset <= a_len && head.offset <= h_len {
                        return selection.clone();
                    }
                    let mut anchor = anchor.clone();
                    let mut head = head.clone();
                    anchor.offset = anchor.offset.min(a_len);
                    head.offset = head.offset.min(h_len);
                    Selection::Text { anchor, head }
                }
                _ => fallback().unwrap_or_else(|| selection.clone()),
            }
        }
        Selection::Node { block_id, path } => match doc.id_path(block_id) {
            Some(fresh) if &fresh == path => selection.clone(),
            Some(fresh) => Selection::node(block_id.clone(), fresh),
            None => fallback().unwrap_or_else(|| selection.clone()),
        },
        Selection::Gap {
            block_id,
            side,
            path,
        } => match doc.id_path(block_id) {
            Some(fresh) if &fresh == path => selection.clone(),
            Some(fresh) => {
                Selection::gap(block_id.clone(), *side, fresh)
            }
            None => fallback().unwrap_or_else(|| selection.clone()),
        },
    }
}

fn inline_len_of(doc: &Doc, id: &BlockId) -> Option<usize> {
    let block = doc.find_block(id)?;
    block.is_inline_block().then(|| block.inline_len())
}
