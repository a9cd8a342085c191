// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Tree display of a document, for test failures and debugging.
//!
//! Example:
//! ```text
//! ├>paragraph#p1
//! │ └>"hello" {bold}
//! └>table#t1
//!   └>tableRow#r1
//! ```

use std::sync::Arc;

use crate::doc::nodes::{BlockNode, Children, InlineNode};
use crate::doc::Doc;

impl Doc {
    pub fn to_tree(&self) -> String {
        let mut out = String::new();
        fmt_blocks(self.blocks(), "", &mut out);
        out
    }
}

fn fmt_blocks(blocks: &[Arc<BlockNode>], prefix: &str, out: &mut String) {
    for (i, block) in blocks.iter().enumerate() {
        let last = i == blocks.len() - 1;
        let branch = if last { "└>" } else { "├>" };
        out.push_str(prefix);
        out.push_str(branch);
        out.push_str(&format!("{}#{}", block.kind(), block.id()));
        if !block.attrs().is_empty() {
            let attrs: Vec<String> = block
                .attrs()
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            out.push_str(&format!(" [{}]", attrs.join(", ")));
        }
        out.push('\n');
        let child_prefix =
            format!("{prefix}{}", if last { "  " } else { "│ " });
        match block.children() {
            Children::Blocks(children) => {
                fmt_blocks(children, &child_prefix, out)
            }
            Children::Inline(nodes) => {
                fmt_inline(nodes, &child_prefix, out)
            }
        }
    }
}

fn fmt_inline(nodes: &[InlineNode], prefix: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i == nodes.len() - 1;
        let branch = if last { "└>" } else { "├>" };
        out.push_str(prefix);
        out.push_str(branch);
        match node {
            InlineNode::Text(t) => {
                out.push_str(&format!("{:?}", t.text()));
                if !t.marks().is_empty() {
                    let kinds: Vec<&str> =
                        t.marks().iter().map(|m| m.kind()).collect();
                    out.push_str(&format!(" {{{}}}", kinds.join(", ")));
                }
            }
            InlineNode::Atom(a) => {
                out.push_str(&format!("<{}>", a.kind()));
            }
        }
        out.push('\n');
    }
}
