// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Assertions that guarantee an applied document is in a known state.
//!
//! By default, outside tests, nothing is asserted. Compile with the
//! `assert-invariants` feature to make every check run in release builds
//! too. The checks mirror the post-apply invariants: unique block ids,
//! normalized inline children, and content models satisfied.

use crate::doc::Doc;
#[cfg(any(test, feature = "assert-invariants"))]
use crate::doc::{
    content::{default_rule, validate_content},
    normalize::is_normalized,
    nodes::{BlockNode, Children},
};
#[cfg(any(test, feature = "assert-invariants"))]
use std::collections::HashSet;
#[cfg(any(test, feature = "assert-invariants"))]
use std::sync::Arc;

impl Doc {
    /// Check the invariants where the caller knows they should hold, even
    /// in builds without the `assert-invariants` feature.
    pub fn explicitly_assert_invariants(&self) {
        #[cfg(any(test, feature = "assert-invariants"))]
        self.assert_invariants();
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    pub(crate) fn assert_invariants(&self) {
        self.assert_unique_block_ids();
        self.assert_inline_children_normalized();
        self.assert_content_models_satisfied();
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_unique_block_ids(&self) {
        let mut seen = HashSet::new();
        for id in self.collect_ids() {
            if !seen.insert(id.clone()) {
                panic!(
                    "Duplicate block id found: {}\n{}",
                    id,
                    self.to_tree()
                );
            }
        }
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_inline_children_normalized(&self) {
        fn walk(blocks: &[Arc<BlockNode>], doc: &Doc) {
            for block in blocks {
                match block.children() {
                    Children::Inline(nodes) => {
                        if !is_normalized(nodes) {
                            panic!(
                                "Inline children of {} are not normalized\n{}",
                                block.id(),
                                doc.to_tree()
                            );
                        }
                    }
                    Children::Blocks(children) => walk(children, doc),
                }
            }
        }
        walk(self.blocks(), self);
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_content_models_satisfied(&self) {
        fn walk(blocks: &[Arc<BlockNode>], doc: &Doc) {
            for block in blocks {
                if let Err(violation) = validate_content(block, &default_rule)
                {
                    panic!("{}\n{}", violation, doc.to_tree());
                }
                if let Some(children) = block.child_blocks() {
                    walk(children, doc);
                }
            }
        }
        walk(self.blocks(), self);
    }
}
