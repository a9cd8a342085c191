// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

/// Everything one plugin registered, recorded as it happens so `destroy`
/// can reverse all of it atomically.
#[derive(Clone, Debug, Default)]
pub struct Registrations {
    pub commands: Vec<String>,
    pub services: Vec<&'static str>,
    pub middleware: Vec<u64>,
    pub node_specs: Vec<String>,
    pub mark_specs: Vec<String>,
    pub inline_specs: Vec<String>,
    pub node_views: Vec<String>,
    pub key_bindings: Vec<String>,
    pub input_rules: Vec<String>,
    pub toolbar_items: Vec<String>,
    pub picker_entries: Vec<String>,
    pub file_handlers: Vec<String>,
    pub style_sheets: Vec<u64>,
    pub subscriptions: Vec<(&'static str, u64)>,
}

impl Registrations {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
            && self.services.is_empty()
            && self.middleware.is_empty()
            && self.node_specs.is_empty()
            && self.mark_specs.is_empty()
            && self.inline_specs.is_empty()
            && self.node_views.is_empty()
            && self.key_bindings.is_empty()
            && self.input_rules.is_empty()
            && self.toolbar_items.is_empty()
            && self.picker_entries.is_empty()
            && self.file_handlers.is_empty()
            && self.style_sheets.is_empty()
            && self.subscriptions.is_empty()
    }
}
