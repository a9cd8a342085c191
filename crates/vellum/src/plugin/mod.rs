// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The plugin fabric: lifecycle, dependency-ordered initialization,
//! transaction middleware, command/service registries, the typed event
//! bus and per-plugin registration tracking.

mod commands_registry;
mod context;
mod event_bus;
mod fabric;
mod middleware;
mod registrations;
mod services;
mod styles;

pub use commands_registry::CommandRegistry;
pub use context::PluginContext;
pub use event_bus::{EventBus, EventKey, ServiceKey, Subscription};
pub use fabric::{FabricHandles, PluginFabric};
pub use middleware::{
    dispatch_with_middleware, MiddlewareChain, MiddlewareFn,
};
pub use registrations::Registrations;
pub use services::ServiceMap;
pub use styles::{StyleSheet, StyleSheets};

use serde_json::Value;

use crate::doc::BlockId;
use crate::error::RegistrationError;
use crate::state::EditorState;
use crate::transaction::Transaction;

/// An inline range a plugin wants the view to paint (spell-check
/// squiggle, search highlight). The engine only transports these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    pub block_id: BlockId,
    pub from: usize,
    pub to: usize,
    pub class: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecorationSet {
    pub decorations: Vec<Decoration>,
}

/// Positions the host can offer plugin UI containers for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginSurface {
    Toolbar,
    Footer,
    Overlay,
}

/// What the engine needs from its host: opaque container handles and an
/// accessibility announcer. Everything defaults to "not available".
pub trait HostHooks: Send + Sync {
    /// Opaque handle of the editor container element, if the host has
    /// one.
    fn container(&self) -> Option<String> {
        None
    }

    fn plugin_container(&self, _surface: PluginSurface) -> Option<String> {
        None
    }

    /// Route text to the host's screen-reader live region.
    fn announce(&self, _text: &str) {}
}

/// Host hooks for headless use (tests, servers).
#[derive(Debug, Default)]
pub struct NoopHost;

impl HostHooks for NoopHost {}

/// A plugin is a capability set, not a base class: `id`, `name` and
/// `init` are required, every other hook has a default no-op body.
pub trait Plugin: Send {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    /// Initialization order tie-break among independent plugins; lower
    /// runs earlier.
    fn priority(&self) -> i32 {
        100
    }

    /// Plugin ids that must initialize before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Register commands, specs, middleware, services and listeners.
    fn init(
        &mut self,
        ctx: &mut PluginContext<'_>,
    ) -> Result<(), RegistrationError>;

    /// All plugins have initialized.
    fn on_ready(&mut self) {}

    /// A transaction was applied. Runs after the history push, in plugin
    /// init order; a panic here is isolated and logged.
    fn on_state_change(
        &mut self,
        _old: &EditorState,
        _new: &EditorState,
        _tr: &Transaction,
    ) {
    }

    /// Decorations to paint over the given state.
    fn decorations(
        &self,
        _state: &EditorState,
        _tr: Option<&Transaction>,
    ) -> DecorationSet {
        DecorationSet::default()
    }

    /// Runtime reconfiguration with a typed partial config.
    fn on_configure(&mut self, _config: &Value) {}

    /// The plugin is being removed; its registrations are already being
    /// reversed by the fabric.
    fn destroy(&mut self) {}
}

/// Payload of [`events::STATE_CHANGE`].
#[derive(Clone)]
pub struct StateChangeEvent {
    pub old_state: EditorState,
    pub new_state: EditorState,
    pub transaction: Transaction,
}

/// The engine's own event keys.
pub mod events {
    use super::{EventKey, StateChangeEvent};

    pub static STATE_CHANGE: EventKey<StateChangeEvent> =
        EventKey::new("stateChange");
    pub static READY: EventKey<()> = EventKey::new("ready");
    pub static DESTROY: EventKey<()> = EventKey::new("destroy");
    pub static PLUGIN_REGISTERED: EventKey<String> =
        EventKey::new("plugin-registered");
    pub static PLUGIN_UNREGISTERED: EventKey<String> =
        EventKey::new("plugin-unregistered");
}
