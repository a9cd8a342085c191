// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

pub mod block_node;
pub mod inline_atom;
pub mod inline_node;
pub mod text_node;

pub use block_node::{kinds, BlockNode, Children};
pub use inline_atom::InlineAtom;
pub use inline_node::InlineNode;
pub use text_node::TextNode;
