// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Type descriptors registered with the [`SchemaRegistry`]. The engine
//! stores and orders them; the HTML pipeline and the host view consume
//! them.
//!
//! [`SchemaRegistry`]: crate::schema::SchemaRegistry

use std::sync::Arc;

use crate::doc::{AttrMap, BlockNode, ContentRule, InlineAtom, Mark};
use crate::transaction::Transaction;

/// Serialize a node to an HTML string, given its already-serialized
/// content.
pub type NodeHtmlFn = Arc<dyn Fn(&BlockNode, &str) -> String + Send + Sync>;

/// Serialize a mark wrapper around already-serialized content.
pub type MarkHtmlFn = Arc<dyn Fn(&Mark, &str) -> String + Send + Sync>;

/// Produce a CSS declaration (`color: …`, `font-size: …`) for a mark.
/// Marks exposing this are merged into a single styled wrapper instead of
/// nesting.
pub type MarkStyleFn = Arc<dyn Fn(&Mark) -> String + Send + Sync>;

/// Serialize an inline atom to an HTML string.
pub type AtomHtmlFn = Arc<dyn Fn(&InlineAtom) -> String + Send + Sync>;

/// A live rendering of a node, realized by the host view.
pub trait NodeView: Send {
    fn node_kind(&self) -> &str;
    /// Called when the underlying block changed identity-preservingly.
    fn update(&mut self, node: &BlockNode);
}

pub type NodeViewFactory =
    Arc<dyn Fn(&BlockNode) -> Box<dyn NodeView> + Send + Sync>;

/// How to recognise this type when parsing HTML. Rules across all specs
/// are applied in descending priority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseRule {
    pub tag: Option<String>,
    pub style: Option<String>,
    pub priority: i32,
}

impl Default for ParseRule {
    fn default() -> Self {
        Self {
            tag: None,
            style: None,
            priority: 50,
        }
    }
}

impl ParseRule {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }
}

/// Tags and attributes this type needs the sanitizer to let through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeSpec {
    pub tags: Vec<String>,
    pub attrs: Vec<String>,
}

/// Descriptor of a block kind.
#[derive(Clone)]
pub struct NodeSpec {
    pub name: String,
    pub content: ContentRule,
    pub default_attrs: AttrMap,
    pub to_html_string: Option<NodeHtmlFn>,
    pub parse_html: Vec<ParseRule>,
    pub sanitize: SanitizeSpec,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, content: ContentRule) -> Self {
        Self {
            name: name.into(),
            content,
            default_attrs: AttrMap::new(),
            to_html_string: None,
            parse_html: Vec::new(),
            sanitize: SanitizeSpec::default(),
        }
    }
}

/// Descriptor of a mark kind.
#[derive(Clone)]
pub struct MarkSpec {
    pub name: String,
    /// Serialization nesting order: lower rank wraps closer to the text.
    pub rank: i32,
    pub to_html_style: Option<MarkStyleFn>,
    pub to_html_string: Option<MarkHtmlFn>,
    pub parse_html: Vec<ParseRule>,
    pub sanitize: SanitizeSpec,
}

impl MarkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: 99,
            to_html_style: None,
            to_html_string: None,
            parse_html: Vec::new(),
            sanitize: SanitizeSpec::default(),
        }
    }

    pub fn with_rank(mut self, rank: i32) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_style(mut self, style: MarkStyleFn) -> Self {
        self.to_html_style = Some(style);
        self
    }

    /// Style-based marks merge into one wrapper instead of nesting.
    pub fn is_style_based(&self) -> bool {
        self.to_html_style.is_some()
    }
}

/// Descriptor of an inline atom kind.
#[derive(Clone)]
pub struct InlineNodeSpec {
    pub name: String,
    pub to_html_string: Option<AtomHtmlFn>,
    pub parse_html: Vec<ParseRule>,
    pub sanitize: SanitizeSpec,
}

impl InlineNodeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            to_html_string: None,
            parse_html: Vec::new(),
            sanitize: SanitizeSpec::default(),
        }
    }
}

/// One key descriptor (e.g. `Mod-b`) bound to a named command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: String,
    pub command: String,
    pub plugin_id: Option<String>,
}

/// A typing pattern (the view matches it against text before the caret)
/// that triggers a named command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputRule {
    pub id: String,
    pub pattern: String,
    pub command: String,
    pub plugin_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolbarItem {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub command: String,
    pub order: i32,
    pub plugin_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockTypePickerEntry {
    pub id: String,
    pub label: String,
    pub node_kind: String,
    pub attrs: AttrMap,
    pub plugin_id: Option<String>,
}

/// A file dropped or pasted into the editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePayload {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub type FileHandlerFn =
    Arc<dyn Fn(&FilePayload) -> Option<Transaction> + Send + Sync>;

/// Handles files whose MIME type matches `pattern`: exact (`image/png`),
/// suffix wildcard (`image/*`) or universal (`*`, `*/*`).
#[derive(Clone)]
pub struct FileHandler {
    pub id: String,
    pub pattern: String,
    pub plugin_id: Option<String>,
    pub handler: FileHandlerFn,
}

impl FileHandler {
    pub fn matches(&self, mime: &str) -> bool {
        if self.pattern == "*" || self.pattern == "*/*" {
            return true;
        }
        if let Some(prefix) = self.pattern.strip_suffix("/*") {
            return mime
                .split('/')
                .next()
                .is_some_and(|kind| kind == prefix);
        }
        self.pattern == mime
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn handler(pattern: &str) -> FileHandler {
        FileHandler {
            id: pattern.to_owned(),
            pattern: pattern.to_owned(),
            plugin_id: None,
            handler: Arc::new(|_| None),
        }
    }

    #[test]
    fn mime_patterns_match_exact_wildcard_and_universal() {
        assert!(handler("image/png").matches("image/png"));
        assert!(!handler("image/png").matches("image/jpeg"));
        assert!(handler("image/*").matches("image/jpeg"));
        assert!(!handler("image/*").matches("video/mp4"));
        assert!(handler("*").matches("application/pdf"));
        assert!(handler("*/*").matches("application/pdf"));
    }
}
