// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::doc::{attr_str, default_rule, ContentRule, Mark, MarkSet};
use crate::error::RegistrationError;
use crate::format::InlineFormat;
use crate::schema::specs::{
    BlockTypePickerEntry, FileHandler, InlineNodeSpec, InputRule,
    KeyBinding, MarkSpec, NodeSpec, NodeViewFactory, ParseRule,
    SanitizeSpec, ToolbarItem,
};

/// Tags the sanitizer always lets through, before any spec contributes.
const BASE_ALLOWED_TAGS: &[&str] = &["p", "br", "div", "span"];
const BASE_ALLOWED_ATTRS: &[&str] = &["style"];

/// How a mark set should be wrapped when serialized: style-based marks
/// merged into one styled wrapper, the rest nested by rank (first entry
/// outermost).
#[derive(Clone)]
pub struct MarkWrapPlan {
    pub styled: Vec<Mark>,
    pub nested: Vec<Mark>,
}

/// Mutable, per-editor catalog of node specs, mark specs, inline specs,
/// node views, key bindings, input rules, toolbar items, picker entries
/// and file handlers.
///
/// Type-keyed registrations (specs, views) fail deterministically on
/// duplicates. Key bindings log and last-in wins. Order-sensitive lists
/// (file handlers, toolbar items) preserve registration order.
#[derive(Default)]
pub struct SchemaRegistry {
    node_specs: HashMap<String, NodeSpec>,
    mark_specs: HashMap<String, MarkSpec>,
    inline_specs: HashMap<String, InlineNodeSpec>,
    node_views: HashMap<String, NodeViewFactory>,
    key_bindings: Vec<KeyBinding>,
    input_rules: Vec<InputRule>,
    toolbar_items: Vec<ToolbarItem>,
    picker_entries: Vec<BlockTypePickerEntry>,
    file_handlers: Vec<FileHandler>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in node and mark specs.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    // -------------------------------------------------------------------
    // Node specs
    // -------------------------------------------------------------------

    pub fn register_node_spec(
        &mut self,
        spec: NodeSpec,
    ) -> Result<(), RegistrationError> {
        if self.node_specs.contains_key(&spec.name) {
            return Err(RegistrationError::Duplicate {
                kind: "node spec",
                name: spec.name,
            });
        }
        self.node_specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn node_spec(&self, name: &str) -> Option<&NodeSpec> {
        self.node_specs.get(name)
    }

    pub fn remove_node_spec(&mut self, name: &str) -> Option<NodeSpec> {
        self.node_specs.remove(name)
    }

    /// The effective content rule for a block kind: the registered spec's
    /// rule, or the built-in default. Kinds the registry has never heard
    /// of have no rule and are treated permissively.
    pub fn content_rule(&self, kind: &str) -> Option<ContentRule> {
        self.node_specs
            .get(kind)
            .map(|spec| spec.content.clone())
            .or_else(|| default_rule(kind))
    }

    pub fn can_contain(&self, parent_kind: &str, child_kind: &str) -> bool {
        match self.content_rule(parent_kind) {
            Some(rule) => rule.allows_block(child_kind),
            None => true,
        }
    }

    // -------------------------------------------------------------------
    // Mark specs
    // -------------------------------------------------------------------

    pub fn register_mark_spec(
        &mut self,
        spec: MarkSpec,
    ) -> Result<(), RegistrationError> {
        if self.mark_specs.contains_key(&spec.name) {
            return Err(RegistrationError::Duplicate {
                kind: "mark spec",
                name: spec.name,
            });
        }
        self.mark_specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn mark_spec(&self, name: &str) -> Option<&MarkSpec> {
        self.mark_specs.get(name)
    }

    pub fn remove_mark_spec(&mut self, name: &str) -> Option<MarkSpec> {
        self.mark_specs.remove(name)
    }

    pub fn mark_rank(&self, kind: &str) -> i32 {
        self.mark_specs.get(kind).map(|s| s.rank).unwrap_or(99)
    }

    /// The serialization-order contract: style-based marks are merged into
    /// a single wrapper; the rest nest with lower ranks closer to the
    /// text, so the returned `nested` list is outermost-first.
    pub fn mark_wrap_plan(&self, marks: &MarkSet) -> MarkWrapPlan {
        let mut styled = Vec::new();
        let mut nested: Vec<Mark> = Vec::new();
        for mark in marks.iter() {
            let style_based = self
                .mark_specs
                .get(mark.kind())
                .is_some_and(MarkSpec::is_style_based);
            if style_based {
                styled.push(mark.clone());
            } else {
                nested.push(mark.clone());
            }
        }
        nested.sort_by(|a, b| {
            self.mark_rank(b.kind())
                .cmp(&self.mark_rank(a.kind()))
                .then_with(|| a.kind().cmp(b.kind()))
        });
        MarkWrapPlan { styled, nested }
    }

    // -------------------------------------------------------------------
    // Inline node specs & node views
    // -------------------------------------------------------------------

    pub fn register_inline_spec(
        &mut self,
        spec: InlineNodeSpec,
    ) -> Result<(), RegistrationError> {
        if self.inline_specs.contains_key(&spec.name) {
            return Err(RegistrationError::Duplicate {
                kind: "inline node spec",
                name: spec.name,
            });
        }
        self.inline_specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn inline_spec(&self, name: &str) -> Option<&InlineNodeSpec> {
        self.inline_specs.get(name)
    }

    pub fn remove_inline_spec(
        &mut self,
        name: &str,
    ) -> Option<InlineNodeSpec> {
        self.inline_specs.remove(name)
    }

    pub fn register_node_view(
        &mut self,
        kind: impl Into<String>,
        factory: NodeViewFactory,
    ) -> Result<(), RegistrationError> {
        let kind = kind.into();
        if self.node_views.contains_key(&kind) {
            return Err(RegistrationError::Duplicate {
                kind: "node view",
                name: kind,
            });
        }
        self.node_views.insert(kind, factory);
        Ok(())
    }

    pub fn node_view(&self, kind: &str) -> Option<&NodeViewFactory> {
        self.node_views.get(kind)
    }

    pub fn remove_node_view(&mut self, kind: &str) -> Option<NodeViewFactory> {
        self.node_views.remove(kind)
    }

    // -------------------------------------------------------------------
    // Key bindings & input rules
    // -------------------------------------------------------------------

    /// Register a key binding. A collision is not an error: the newcomer
    /// wins and the loss is logged.
    pub fn register_key_binding(&mut self, binding: KeyBinding) {
        if let Some(existing) =
            self.key_bindings.iter_mut().find(|b| b.key == binding.key)
        {
            warn!(
                key = %binding.key,
                old_command = %existing.command,
                new_command = %binding.command,
                "key binding collision; last registration wins",
            );
            *existing = binding;
        } else {
            self.key_bindings.push(binding);
        }
    }

    pub fn register_keymap(
        &mut self,
        bindings: impl IntoIterator<Item = KeyBinding>,
    ) {
        for binding in bindings {
            self.register_key_binding(binding);
        }
    }

    pub fn key_binding(&self, key: &str) -> Option<&KeyBinding> {
        self.key_bindings.iter().find(|b| b.key == key)
    }

    pub fn key_bindings(&self) -> &[KeyBinding] {
        &self.key_bindings
    }

    pub fn remove_key_binding(&mut self, key: &str) -> Option<KeyBinding> {
        let i = self.key_bindings.iter().position(|b| b.key == key)?;
        Some(self.key_bindings.remove(i))
    }

    pub fn register_input_rule(
        &mut self,
        rule: InputRule,
    ) -> Result<(), RegistrationError> {
        if self.input_rules.iter().any(|r| r.id == rule.id) {
            return Err(RegistrationError::Duplicate {
                kind: "input rule",
                name: rule.id,
            });
        }
        self.input_rules.push(rule);
        Ok(())
    }

    pub fn input_rules(&self) -> &[InputRule] {
        &self.input_rules
    }

    pub fn remove_input_rule(&mut self, id: &str) -> Option<InputRule> {
        let i = self.input_rules.iter().position(|r| r.id == id)?;
        Some(self.input_rules.remove(i))
    }

    // -------------------------------------------------------------------
    // Toolbar items & block type picker entries
    // -------------------------------------------------------------------

    pub fn register_toolbar_item(
        &mut self,
        item: ToolbarItem,
    ) -> Result<(), RegistrationError> {
        if self.toolbar_items.iter().any(|t| t.id == item.id) {
            return Err(RegistrationError::Duplicate {
                kind: "toolbar item",
                name: item.id,
            });
        }
        self.toolbar_items.push(item);
        Ok(())
    }

    pub fn toolbar_items(&self) -> &[ToolbarItem] {
        &self.toolbar_items
    }

    pub fn remove_toolbar_item(&mut self, id: &str) -> Option<ToolbarItem> {
        let i = self.toolbar_items.iter().position(|t| t.id == id)?;
        Some(self.toolbar_items.remove(i))
    }

    pub fn register_picker_entry(
        &mut self,
        entry: BlockTypePickerEntry,
    ) -> Result<(), RegistrationError> {
        if self.picker_entries.iter().any(|e| e.id == entry.id) {
            return Err(RegistrationError::Duplicate {
                kind: "block type picker entry",
                name: entry.id,
            });
        }
        self.picker_entries.push(entry);
        Ok(())
    }

    pub fn picker_entries(&self) -> &[BlockTypePickerEntry] {
        &self.picker_entries
    }

    pub fn remove_picker_entry(
        &mut self,
        id: &str,
    ) -> Option<BlockTypePickerEntry> {
        let i = self.picker_entries.iter().position(|e| e.id == id)?;
        Some(self.picker_entries.remove(i))
    }

    // -------------------------------------------------------------------
    // File handlers
    // -------------------------------------------------------------------

    pub fn register_file_handler(
        &mut self,
        handler: FileHandler,
    ) -> Result<(), RegistrationError> {
        if self.file_handlers.iter().any(|h| h.id == handler.id) {
            return Err(RegistrationError::Duplicate {
                kind: "file handler",
                name: handler.id,
            });
        }
        self.file_handlers.push(handler);
        Ok(())
    }

    /// Every handler matching the MIME type, in registration order.
    pub fn file_handlers_for(&self, mime: &str) -> Vec<&FileHandler> {
        self.file_handlers
            .iter()
            .filter(|h| h.matches(mime))
            .collect()
    }

    pub fn remove_file_handler(&mut self, id: &str) -> Option<FileHandler> {
        let i = self.file_handlers.iter().position(|h| h.id == id)?;
        Some(self.file_handlers.remove(i))
    }

    // -------------------------------------------------------------------
    // Sanitizer allowances
    // -------------------------------------------------------------------

    /// Base tags plus every spec's sanitize contribution, deduplicated,
    /// base first.
    pub fn allowed_tags(&self) -> Vec<String> {
        let mut out: Vec<String> =
            BASE_ALLOWED_TAGS.iter().map(|t| (*t).to_owned()).collect();
        for sanitize in self.sanitize_specs() {
            for tag in &sanitize.tags {
                if !out.contains(tag) {
                    out.push(tag.clone());
                }
            }
        }
        out
    }

    pub fn allowed_attrs(&self) -> Vec<String> {
        let mut out: Vec<String> = BASE_ALLOWED_ATTRS
            .iter()
            .map(|a| (*a).to_owned())
            .collect();
        for sanitize in self.sanitize_specs() {
            for attr in &sanitize.attrs {
                if !out.contains(attr) {
                    out.push(attr.clone());
                }
            }
        }
        out
    }

    fn sanitize_specs(&self) -> impl Iterator<Item = &SanitizeSpec> {
        let mut nodes: Vec<&NodeSpec> = self.node_specs.values().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut marks: Vec<&MarkSpec> = self.mark_specs.values().collect();
        marks.sort_by(|a, b| a.name.cmp(&b.name));
        let mut inline: Vec<&InlineNodeSpec> =
            self.inline_specs.values().collect();
        inline.sort_by(|a, b| a.name.cmp(&b.name));
        nodes
            .into_iter()
            .map(|s| &s.sanitize)
            .chain(marks.into_iter().map(|s| &s.sanitize))
            .chain(inline.into_iter().map(|s| &s.sanitize))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// All parse rules across specs, descending priority.
    pub fn parse_rules(&self) -> Vec<ParseRule> {
        let mut rules: Vec<ParseRule> = self
            .node_specs
            .values()
            .flat_map(|s| s.parse_html.iter().cloned())
            .chain(
                self.mark_specs
                    .values()
                    .flat_map(|s| s.parse_html.iter().cloned()),
            )
            .chain(
                self.inline_specs
                    .values()
                    .flat_map(|s| s.parse_html.iter().cloned()),
            )
            .collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        rules
    }

    /// Remove every entry tagged with a plugin id. The spec-keyed maps are
    /// untouched; the plugin fabric removes those through its per-plugin
    /// registration ledger.
    pub fn remove_plugin_tagged(&mut self, plugin_id: &str) {
        let tagged =
            |id: &Option<String>| id.as_deref() == Some(plugin_id);
        self.toolbar_items.retain(|t| !tagged(&t.plugin_id));
        self.picker_entries.retain(|e| !tagged(&e.plugin_id));
        self.file_handlers.retain(|h| !tagged(&h.plugin_id));
        self.key_bindings.retain(|b| !tagged(&b.plugin_id));
        self.input_rules.retain(|r| !tagged(&r.plugin_id));
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // -------------------------------------------------------------------
    // Built-in specs
    // -------------------------------------------------------------------

    fn register_defaults(&mut self) {
        use crate::doc::kinds;

        let nodes = [
            NodeSpec::new(kinds::PARAGRAPH, ContentRule::Inline),
            NodeSpec::new(kinds::HEADING, ContentRule::Inline),
            NodeSpec::new(kinds::BLOCKQUOTE, ContentRule::any_blocks()),
            NodeSpec::new(
                kinds::LIST,
                ContentRule::blocks_of([kinds::LIST_ITEM]),
            ),
            NodeSpec::new(kinds::LIST_ITEM, ContentRule::Inline),
            NodeSpec::new(
                kinds::TABLE,
                ContentRule::blocks_of([kinds::TABLE_ROW]),
            ),
            NodeSpec::new(
                kinds::TABLE_ROW,
                ContentRule::blocks_of([kinds::TABLE_CELL]),
            ),
            NodeSpec::new(kinds::TABLE_CELL, ContentRule::any_blocks()),
        ];
        for spec in nodes {
            self.register_node_spec(spec)
                .expect("built-in node specs registered twice");
        }

        // Boolean marks nest; lower rank sits closer to the text.
        let boolean = [
            (InlineFormat::Bold, 10),
            (InlineFormat::Italic, 20),
            (InlineFormat::Underline, 30),
            (InlineFormat::StrikeThrough, 40),
        ];
        for (format, rank) in boolean {
            self.register_mark_spec(
                MarkSpec::new(format.as_ref()).with_rank(rank),
            )
            .expect("built-in mark specs registered twice");
        }

        // Attributed style marks merge into a single styled wrapper.
        let styled: [(InlineFormat, fn(&Mark) -> String); 4] = [
            (InlineFormat::Font, |m| {
                format!(
                    "font-family: {}",
                    attr_str(m.attrs(), "value").unwrap_or_default()
                )
            }),
            (InlineFormat::FontSize, |m| {
                format!(
                    "font-size: {}",
                    attr_str(m.attrs(), "value").unwrap_or_default()
                )
            }),
            (InlineFormat::TextColor, |m| {
                format!(
                    "color: {}",
                    attr_str(m.attrs(), "value").unwrap_or_default()
                )
            }),
            (InlineFormat::Highlight, |m| {
                format!(
                    "background-color: {}",
                    attr_str(m.attrs(), "value").unwrap_or_default()
                )
            }),
        ];
        for (format, style) in styled {
            self.register_mark_spec(
                MarkSpec::new(format.as_ref()).with_style(Arc::new(style)),
            )
            .expect("built-in mark specs registered twice");
        }

        // Links nest outermost among the non-style marks.
        self.register_mark_spec(
            MarkSpec::new(InlineFormat::Link.as_ref()).with_rank(90),
        )
        .expect("built-in mark specs registered twice");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::kinds;

    #[test]
    fn duplicate_node_specs_fail_deterministically() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_node_spec(NodeSpec::new("callout", ContentRule::Inline))
            .unwrap();
        let err = registry
            .register_node_spec(NodeSpec::new("callout", ContentRule::Inline))
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Duplicate {
                kind: "node spec",
                name: "callout".into(),
            }
        );
    }

    #[test]
    fn key_binding_collisions_log_and_last_in_wins() {
        let mut registry = SchemaRegistry::new();
        registry.register_key_binding(KeyBinding {
            key: "Mod-b".into(),
            command: "toggleBold".into(),
            plugin_id: None,
        });
        registry.register_key_binding(KeyBinding {
            key: "Mod-b".into(),
            command: "toggleBanner".into(),
            plugin_id: Some("banner".into()),
        });
        assert_eq!(
            registry.key_binding("Mod-b").unwrap().command,
            "toggleBanner"
        );
        assert_eq!(registry.key_bindings().len(), 1);
    }

    #[test]
    fn registered_specs_override_default_content_rules() {
        let mut registry = SchemaRegistry::new();
        assert_eq!(
            registry.content_rule(kinds::PARAGRAPH),
            Some(ContentRule::Inline)
        );
        registry
            .register_node_spec(NodeSpec::new(
                "callout",
                ContentRule::any_blocks(),
            ))
            .unwrap();
        assert_eq!(
            registry.content_rule("callout"),
            Some(ContentRule::any_blocks())
        );
        assert_eq!(registry.content_rule("unheard-of"), None);
        assert!(registry.can_contain("unheard-of", kinds::PARAGRAPH));
    }

    #[test]
    fn allowed_tags_union_base_set_with_spec_contributions() {
        let mut registry = SchemaRegistry::new();
        let mut spec = NodeSpec::new("codeBlock", ContentRule::Inline);
        spec.sanitize = SanitizeSpec {
            tags: vec!["pre".into(), "code".into(), "p".into()],
            attrs: vec!["data-lang".into()],
        };
        registry.register_node_spec(spec).unwrap();
        let tags = registry.allowed_tags();
        assert_eq!(tags, ["p", "br", "div", "span", "pre", "code"]);
        assert_eq!(registry.allowed_attrs(), ["style", "data-lang"]);
    }

    #[test]
    fn file_handlers_return_all_matches_in_registration_order() {
        let mut registry = SchemaRegistry::new();
        for (id, pattern) in
            [("images", "image/*"), ("all", "*"), ("png", "image/png")]
        {
            registry
                .register_file_handler(FileHandler {
                    id: id.into(),
                    pattern: pattern.into(),
                    plugin_id: None,
                    handler: Arc::new(|_| None),
                })
                .unwrap();
        }
        let matches: Vec<&str> = registry
            .file_handlers_for("image/png")
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(matches, ["images", "all", "png"]);
        let matches: Vec<&str> = registry
            .file_handlers_for("video/mp4")
            .iter()
            .map(|h| h.id.as_str())
            .collect();
        assert_eq!(matches, ["all"]);
    }

    #[test]
    fn style_marks_merge_and_the_rest_nest_by_rank() {
        let registry = SchemaRegistry::with_defaults();
        let marks = MarkSet::from_marks([
            Mark::bold(),
            Mark::link("https://element.io"),
            Mark::text_color("#ff0000"),
            Mark::italic(),
        ]);
        let plan = registry.mark_wrap_plan(&marks);
        let styled: Vec<&str> =
            plan.styled.iter().map(Mark::kind).collect();
        assert_eq!(styled, ["textColor"]);
        let nested: Vec<&str> =
            plan.nested.iter().map(Mark::kind).collect();
        // Outermost first: link (90), italic (20), bold (10).
        assert_eq!(nested, ["link", "italic", "bold"]);
    }

    #[test]
    fn remove_plugin_tagged_clears_every_tagged_entry() {
        let mut registry = SchemaRegistry::new();
        registry
            .register_toolbar_item(ToolbarItem {
                id: "banner".into(),
                label: "Banner".into(),
                icon: None,
                command: "toggleBanner".into(),
                order: 10,
                plugin_id: Some("banner".into()),
            })
            .unwrap();
        registry
            .register_toolbar_item(ToolbarItem {
                id: "bold".into(),
                label: "Bold".into(),
                icon: None,
                command: "toggleBold".into(),
                order: 0,
                plugin_id: None,
            })
            .unwrap();
        registry.remove_plugin_tagged("banner");
        let ids: Vec<&str> = registry
            .toolbar_items()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, ["bold"]);
    }
}
