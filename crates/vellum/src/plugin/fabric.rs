// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RegistrationError;
use crate::plugin::{
    CommandRegistry, DecorationSet, EventBus, HostHooks, MiddlewareChain,
    Plugin, PluginContext, Registrations, ServiceMap, StyleSheets,
};
use crate::schema::SharedRegistry;
use crate::state::EditorState;
use crate::transaction::Transaction;

/// The shared subsystems a plugin context reaches into. One bundle is
/// owned by the editor and handed (by reference) to the fabric.
#[derive(Clone)]
pub struct FabricHandles {
    pub state: Arc<RwLock<EditorState>>,
    pub registry: SharedRegistry,
    pub commands: Arc<RwLock<CommandRegistry>>,
    pub services: Arc<RwLock<ServiceMap>>,
    pub middleware: Arc<RwLock<MiddlewareChain>>,
    pub bus: EventBus,
    pub style_sheets: Arc<RwLock<StyleSheets>>,
    pub dispatch_queue: Arc<Mutex<VecDeque<Transaction>>>,
    pub host: Arc<dyn HostHooks>,
}

struct PluginSlot {
    plugin: Box<dyn Plugin>,
    registrations: Registrations,
    initialized: bool,
    ready: bool,
}

/// Owns the registered plugins: dependency-ordered initialization,
/// lifecycle hooks with panic isolation, and atomic teardown through the
/// per-plugin registration ledger.
#[derive(Default)]
pub struct PluginFabric {
    slots: Vec<PluginSlot>,
    init_order: Vec<usize>,
}

impl PluginFabric {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        plugin: Box<dyn Plugin>,
    ) -> Result<(), RegistrationError> {
        if self.slots.iter().any(|s| s.plugin.id() == plugin.id()) {
            return Err(RegistrationError::DuplicatePlugin(
                plugin.id().to_owned(),
            ));
        }
        self.slots.push(PluginSlot {
            plugin,
            registrations: Registrations::default(),
            initialized: false,
            ready: false,
        });
        Ok(())
    }

    pub fn plugin_ids(&self) -> Vec<String> {
        self.init_order
            .iter()
            .map(|&i| self.slots[i].plugin.id().to_owned())
            .collect()
    }

    pub fn contains(&self, plugin_id: &str) -> bool {
        self.slots.iter().any(|s| s.plugin.id() == plugin_id)
    }

    /// Kahn's algorithm over the dependency edges; ties broken by
    /// ascending priority, then registration order. Fails fast on a
    /// missing dependency or a cycle, naming the participants.
    fn topological_order(&self) -> Result<Vec<usize>, RegistrationError> {
        let n = self.slots.len();
        let index_of = |id: &str| {
            self.slots.iter().position(|s| s.plugin.id() == id)
        };

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, slot) in self.slots.iter().enumerate() {
            for dep in slot.plugin.dependencies() {
                let Some(j) = index_of(&dep) else {
                    return Err(RegistrationError::MissingDependency {
                        id: slot.plugin.id().to_owned(),
                        missing: dep,
                    });
                };
                dependents[j].push(i);
                in_degree[i] += 1;
            }
        }

        let mut ready: Vec<usize> = (0..n)
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(n);
        while !ready.is_empty() {
            // Lowest priority first; registration order as the final tie.
            ready.sort_by_key(|&i| (self.slots[i].plugin.priority(), i));
            let next = ready.remove(0);
            order.push(next);
            for &dependent in &dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(dependent);
                }
            }
        }

        if order.len() != n {
            let cycle: Vec<&str> = (0..n)
                .filter(|&i| in_degree[i] > 0)
                .map(|i| self.slots[i].plugin.id())
                .collect();
            return Err(RegistrationError::DependencyCycle(
                cycle.join(", "),
            ));
        }
        Ok(order)
    }

    /// Initialize every registered plugin in dependency order, then run
    /// `on_ready` in the same order. An `init` error aborts the whole
    /// editor init.
    pub fn init_all(
        &mut self,
        handles: &FabricHandles,
    ) -> Result<(), RegistrationError> {
        self.init_order = self.topological_order()?;
        for &i in &self.init_order.clone() {
            let slot = &mut self.slots[i];
            if slot.initialized {
                continue;
            }
            debug!(plugin = slot.plugin.id(), "initializing plugin");
            let PluginSlot {
                plugin,
                registrations,
                initialized,
                ..
            } = slot;
            let mut ctx =
                PluginContext::new(plugin.id(), handles, registrations);
            plugin.init(&mut ctx)?;
            *initialized = true;
        }
        for &i in &self.init_order {
            let slot = &mut self.slots[i];
            if !slot.ready {
                slot.ready = true;
                slot.plugin.on_ready();
            }
        }
        Ok(())
    }

    /// Run `on_state_change` hooks in init order, isolating panics.
    pub fn notify_state_change(
        &mut self,
        old: &EditorState,
        new: &EditorState,
        tr: &Transaction,
    ) {
        for &i in &self.init_order {
            let slot = &mut self.slots[i];
            if !slot.initialized {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                slot.plugin.on_state_change(old, new, tr);
            }));
            if result.is_err() {
                warn!(
                    plugin = slot.plugin.id(),
                    "plugin on_state_change panicked; ignored",
                );
            }
        }
    }

    /// Union of every plugin's decorations, init order, panics isolated.
    pub fn collect_decorations(
        &self,
        state: &EditorState,
        tr: Option<&Transaction>,
    ) -> DecorationSet {
        let mut all = DecorationSet::default();
        for &i in &self.init_order {
            let slot = &self.slots[i];
            let result = catch_unwind(AssertUnwindSafe(|| {
                slot.plugin.decorations(state, tr)
            }));
            match result {
                Ok(set) => all.decorations.extend(set.decorations),
                Err(_) => warn!(
                    plugin = slot.plugin.id(),
                    "plugin decorations panicked; ignored",
                ),
            }
        }
        all
    }

    /// Deliver a runtime config to one plugin. `false` when unknown.
    pub fn configure(&mut self, plugin_id: &str, config: &Value) -> bool {
        let Some(slot) = self
            .slots
            .iter_mut()
            .find(|s| s.plugin.id() == plugin_id)
        else {
            return false;
        };
        let result = catch_unwind(AssertUnwindSafe(|| {
            slot.plugin.on_configure(config);
        }));
        if result.is_err() {
            warn!(
                plugin = plugin_id,
                "plugin on_configure panicked; ignored",
            );
        }
        true
    }

    /// Tear down one plugin: call its `destroy` hook, then remove every
    /// registration it ever made. `false` when unknown.
    pub fn destroy_plugin(
        &mut self,
        plugin_id: &str,
        handles: &FabricHandles,
    ) -> bool {
        let Some(position) = self
            .slots
            .iter()
            .position(|s| s.plugin.id() == plugin_id)
        else {
            return false;
        };
        let mut slot = self.slots.remove(position);
        self.init_order = self
            .init_order
            .iter()
            .filter(|&&i| i != position)
            .map(|&i| if i > position { i - 1 } else { i })
            .collect();

        let result = catch_unwind(AssertUnwindSafe(|| {
            slot.plugin.destroy();
        }));
        if result.is_err() {
            warn!(plugin = plugin_id, "plugin destroy panicked; ignored");
        }

        remove_registrations(&slot.registrations, plugin_id, handles);
        true
    }

    /// Tear down everything, reverse init order.
    pub fn destroy_all(&mut self, handles: &FabricHandles) {
        let ids: Vec<String> = self
            .init_order
            .iter()
            .rev()
            .map(|&i| self.slots[i].plugin.id().to_owned())
            .collect();
        for id in ids {
            self.destroy_plugin(&id, handles);
        }
        // Plugins registered but never initialized still get dropped.
        self.slots.clear();
        self.init_order.clear();
    }
}

fn remove_registrations(
    registrations: &Registrations,
    plugin_id: &str,
    handles: &FabricHandles,
) {
    {
        let mut commands = handles.commands.write();
        for name in &registrations.commands {
            commands.remove(name);
        }
    }
    {
        let mut services = handles.services.write();
        for name in &registrations.services {
            services.remove(name);
        }
    }
    {
        let mut middleware = handles.middleware.write();
        for &id in &registrations.middleware {
            middleware.remove(id);
        }
    }
    {
        let mut registry = handles.registry.write();
        for name in &registrations.node_specs {
            registry.remove_node_spec(name);
        }
        for name in &registrations.mark_specs {
            registry.remove_mark_spec(name);
        }
        for name in &registrations.inline_specs {
            registry.remove_inline_spec(name);
        }
        for name in &registrations.node_views {
            registry.remove_node_view(name);
        }
        registry.remove_plugin_tagged(plugin_id);
    }
    {
        let mut style_sheets = handles.style_sheets.write();
        for &id in &registrations.style_sheets {
            style_sheets.remove(id);
        }
    }
    for &(event, id) in &registrations.subscriptions {
        handles.bus.off(event, id);
    }
}
