// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::sync::Arc;

use crate::commands::CommandFn;
use crate::error::RegistrationError;
use crate::plugin::fabric::FabricHandles;
use crate::plugin::{
    EventBus, EventKey, MiddlewareFn, PluginSurface, Registrations,
    ServiceKey,
};
use crate::schema::{
    BlockTypePickerEntry, FileHandler, InlineNodeSpec, InputRule,
    KeyBinding, MarkSpec, NodeSpec, NodeViewFactory, ToolbarItem,
};
use crate::state::EditorState;
use crate::transaction::Transaction;

/// What a plugin sees of the editor during `init` and at runtime. Every
/// registration made through the context lands in the plugin's
/// [`Registrations`] ledger, which is how `destroy` reverses them all.
pub struct PluginContext<'a> {
    plugin_id: String,
    handles: &'a FabricHandles,
    registrations: &'a mut Registrations,
}

impl<'a> PluginContext<'a> {
    pub(crate) fn new(
        plugin_id: impl Into<String>,
        handles: &'a FabricHandles,
        registrations: &'a mut Registrations,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            handles,
            registrations,
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// A snapshot of the current editor state.
    pub fn state(&self) -> EditorState {
        self.handles.state.read().clone()
    }

    /// Queue a transaction. It is dispatched (through the middleware
    /// chain) once the current dispatch or init phase completes; plugin
    /// dispatches never reenter the state machine mid-flight.
    pub fn dispatch(&self, tr: Transaction) {
        self.handles.dispatch_queue.lock().push_back(tr);
    }

    pub fn container(&self) -> Option<String> {
        self.handles.host.container()
    }

    pub fn plugin_container(
        &self,
        surface: PluginSurface,
    ) -> Option<String> {
        self.handles.host.plugin_container(surface)
    }

    pub fn announce(&self, text: &str) {
        self.handles.host.announce(text);
    }

    // -------------------------------------------------------------------
    // Schema registry
    // -------------------------------------------------------------------

    pub fn register_node_spec(
        &mut self,
        spec: NodeSpec,
    ) -> Result<(), RegistrationError> {
        let name = spec.name.clone();
        self.handles.registry.write().register_node_spec(spec)?;
        self.registrations.node_specs.push(name);
        Ok(())
    }

    pub fn register_mark_spec(
        &mut self,
        spec: MarkSpec,
    ) -> Result<(), RegistrationError> {
        let name = spec.name.clone();
        self.handles.registry.write().register_mark_spec(spec)?;
        self.registrations.mark_specs.push(name);
        Ok(())
    }

    pub fn register_inline_spec(
        &mut self,
        spec: InlineNodeSpec,
    ) -> Result<(), RegistrationError> {
        let name = spec.name.clone();
        self.handles.registry.write().register_inline_spec(spec)?;
        self.registrations.inline_specs.push(name);
        Ok(())
    }

    pub fn register_node_view(
        &mut self,
        kind: impl Into<String>,
        factory: NodeViewFactory,
    ) -> Result<(), RegistrationError> {
        let kind = kind.into();
        self.handles
            .registry
            .write()
            .register_node_view(kind.clone(), factory)?;
        self.registrations.node_views.push(kind);
        Ok(())
    }

    /// Register key bindings, tagged with this plugin. Collisions warn
    /// and last-in wins.
    pub fn register_keymap(
        &mut self,
        bindings: impl IntoIterator<Item = KeyBinding>,
    ) {
        let mut registry = self.handles.registry.write();
        for mut binding in bindings {
            binding.plugin_id = Some(self.plugin_id.clone());
            self.registrations.key_bindings.push(binding.key.clone());
            registry.register_key_binding(binding);
        }
    }

    pub fn register_input_rule(
        &mut self,
        mut rule: InputRule,
    ) -> Result<(), RegistrationError> {
        rule.plugin_id = Some(self.plugin_id.clone());
        let id = rule.id.clone();
        self.handles.registry.write().register_input_rule(rule)?;
        self.registrations.input_rules.push(id);
        Ok(())
    }

    pub fn register_toolbar_item(
        &mut self,
        mut item: ToolbarItem,
    ) -> Result<(), RegistrationError> {
        item.plugin_id = Some(self.plugin_id.clone());
        let id = item.id.clone();
        self.handles.registry.write().register_toolbar_item(item)?;
        self.registrations.toolbar_items.push(id);
        Ok(())
    }

    pub fn register_picker_entry(
        &mut self,
        mut entry: BlockTypePickerEntry,
    ) -> Result<(), RegistrationError> {
        entry.plugin_id = Some(self.plugin_id.clone());
        let id = entry.id.clone();
        self.handles.registry.write().register_picker_entry(entry)?;
        self.registrations.picker_entries.push(id);
        Ok(())
    }

    pub fn register_file_handler(
        &mut self,
        mut handler: FileHandler,
    ) -> Result<(), RegistrationError> {
        handler.plugin_id = Some(self.plugin_id.clone());
        let id = handler.id.clone();
        self.handles.registry.write().register_file_handler(handler)?;
        self.registrations.file_handlers.push(id);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Commands, middleware, services
    // -------------------------------------------------------------------

    pub fn register_command(
        &mut self,
        name: impl Into<String>,
        func: CommandFn,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        self.handles.commands.write().register(
            name.clone(),
            self.plugin_id.clone(),
            func,
        )?;
        self.registrations.commands.push(name);
        Ok(())
    }

    pub fn register_middleware(
        &mut self,
        func: MiddlewareFn,
        priority: i32,
    ) -> u64 {
        let id = self.handles.middleware.write().register(
            func,
            priority,
            Some(self.plugin_id.clone()),
        );
        self.registrations.middleware.push(id);
        id
    }

    pub fn register_service<T: Send + Sync + 'static>(
        &mut self,
        key: &ServiceKey<T>,
        value: Arc<T>,
    ) -> Result<(), RegistrationError> {
        self.handles.services.write().register(
            key,
            value,
            Some(self.plugin_id.clone()),
        )?;
        self.registrations.services.push(key.name());
        Ok(())
    }

    pub fn service<T: Send + Sync + 'static>(
        &self,
        key: &ServiceKey<T>,
    ) -> Option<Arc<T>> {
        self.handles.services.read().get(key)
    }

    // -------------------------------------------------------------------
    // Events & styles
    // -------------------------------------------------------------------

    pub fn event_bus(&self) -> &EventBus {
        &self.handles.bus
    }

    /// Subscribe to an event; the listener dies with the plugin.
    pub fn on<T: 'static>(
        &mut self,
        key: &EventKey<T>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) {
        let sub = self.handles.bus.on_tagged(
            key,
            Some(self.plugin_id.clone()),
            callback,
        );
        self.registrations.subscriptions.push(sub.token());
    }

    pub fn register_style_sheet(&mut self, css: impl Into<String>) -> u64 {
        let id = self
            .handles
            .style_sheets
            .write()
            .register(css, Some(self.plugin_id.clone()));
        self.registrations.style_sheets.push(id);
        id
    }
}
