// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! The host-facing editor: orchestrates state, history, schema registry
//! and plugin fabric behind one stable API.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::{debug, warn};

use crate::commands;
use crate::doc::{Doc, IdGenerator};
use crate::error::EditorError;
use crate::format::InlineFormat;
use crate::history::History;
use crate::plugin::{
    dispatch_with_middleware, events, CommandRegistry, DecorationSet,
    EventBus, EventKey, FabricHandles, HostHooks, MiddlewareChain,
    NoopHost, Plugin, PluginFabric, ServiceMap, StateChangeEvent,
    StyleSheets, Subscription,
};
use crate::schema::{self, SchemaRegistry, SharedRegistry};
use crate::selection::Selection;
use crate::state::{validate_selection, EditorState, StateConfig};
use crate::transaction::{Origin, Transaction, TransactionBuilder};

/// The HTML pipeline is a collaborator: the engine hands it the document
/// and the registry (for specs, parse rules and sanitize allowances) and
/// takes back a string or a tree.
pub trait HtmlPipeline: Send + Sync {
    fn serialize(
        &self,
        doc: &Doc,
        registry: &SchemaRegistry,
    ) -> Result<String, String>;

    fn parse(
        &self,
        html: &str,
        registry: &SchemaRegistry,
    ) -> Result<Doc, String>;
}

#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub history_group_timeout_ms: u64,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_group_timeout_ms:
                crate::history::DEFAULT_GROUP_TIMEOUT_MS,
            history_limit: crate::history::DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Destroyed,
}

pub struct Editor {
    handles: FabricHandles,
    fabric: PluginFabric,
    history: History,
    ids: Arc<IdGenerator>,
    html: Option<Arc<dyn HtmlPipeline>>,
    config: EditorConfig,
    phase: Phase,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_parts(
            config,
            None,
            Arc::new(NoopHost),
            Arc::new(IdGenerator::random()),
        )
    }

    /// Full construction for hosts and tests: initial document, host
    /// hooks and a (possibly deterministic) id generator.
    pub fn with_parts(
        config: EditorConfig,
        doc: Option<Doc>,
        host: Arc<dyn HostHooks>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        let registry: SharedRegistry =
            schema::shared(SchemaRegistry::with_defaults());
        let state = EditorState::create(StateConfig {
            doc,
            schema: Some(registry.clone()),
            ..Default::default()
        });
        let handles = FabricHandles {
            state: Arc::new(RwLock::new(state)),
            registry,
            commands: Arc::new(RwLock::new(CommandRegistry::new())),
            services: Arc::new(RwLock::new(ServiceMap::new())),
            middleware: Arc::new(RwLock::new(MiddlewareChain::new())),
            bus: EventBus::new(),
            style_sheets: Arc::new(RwLock::new(StyleSheets::new())),
            dispatch_queue: Arc::new(Mutex::new(VecDeque::new())),
            host,
        };
        let history = History::new(
            config.history_group_timeout_ms,
            config.history_limit,
        );
        Self {
            handles,
            fabric: PluginFabric::new(),
            history,
            ids,
            html: None,
            config,
            phase: Phase::Created,
        }
    }

    pub fn with_html_pipeline(
        mut self,
        pipeline: Arc<dyn HtmlPipeline>,
    ) -> Self {
        self.html = Some(pipeline);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // -------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------

    /// Register a plugin. Before `init` it only queues; on a running
    /// editor it initializes immediately.
    pub fn register_plugin(
        &mut self,
        plugin: Box<dyn Plugin>,
    ) -> Result<(), EditorError> {
        if self.phase == Phase::Destroyed {
            return Err(EditorError::Destroyed);
        }
        let id = plugin.id().to_owned();
        self.fabric.register(plugin)?;
        if self.phase == Phase::Running {
            self.fabric.init_all(&self.handles)?;
            self.handles.bus.emit(&events::PLUGIN_REGISTERED, &id);
            self.drain_dispatch_queue();
        }
        Ok(())
    }

    /// Initialize the editor: built-in commands, then every plugin in
    /// dependency order, then the ready event.
    pub fn init(&mut self) -> Result<(), EditorError> {
        if self.phase == Phase::Destroyed {
            return Err(EditorError::Destroyed);
        }
        if self.phase == Phase::Running {
            return Ok(());
        }
        self.register_core_commands()?;
        self.fabric.init_all(&self.handles)?;
        self.phase = Phase::Running;
        for id in self.fabric.plugin_ids() {
            self.handles.bus.emit(&events::PLUGIN_REGISTERED, &id);
        }
        self.handles.bus.emit(&events::READY, &());
        self.drain_dispatch_queue();
        debug!("editor initialized");
        Ok(())
    }

    /// Tear everything down: plugins in reverse init order (reversing
    /// every registration they made), then the destroy event.
    pub fn destroy(&mut self) {
        if self.phase == Phase::Destroyed {
            return;
        }
        self.fabric.destroy_all(&self.handles);
        self.handles.bus.emit(&events::DESTROY, &());
        self.handles.registry.write().clear();
        *self.handles.style_sheets.write() = StyleSheets::new();
        self.history.clear();
        self.phase = Phase::Destroyed;
    }

    /// Merge a partial runtime configuration.
    pub fn configure(&mut self, partial: &Value) {
        if let Some(timeout) = partial
            .get("historyGroupTimeoutMs")
            .and_then(Value::as_u64)
        {
            self.config.history_group_timeout_ms = timeout;
            self.history.set_group_timeout_ms(timeout);
        }
        if let Some(limit) =
            partial.get("historyLimit").and_then(Value::as_u64)
        {
            self.config.history_limit = limit as usize;
            self.history.set_limit(limit as usize);
        }
    }

    /// Deliver a runtime config to one plugin.
    pub fn configure_plugin(
        &mut self,
        plugin_id: &str,
        config: &Value,
    ) -> bool {
        self.fabric.configure(plugin_id, config)
    }

    // -------------------------------------------------------------------
    // State access
    // -------------------------------------------------------------------

    pub fn state(&self) -> EditorState {
        self.handles.state.read().clone()
    }

    pub fn get_text(&self) -> String {
        self.state().doc().to_text()
    }

    pub fn get_json(&self) -> Value {
        serde_json::to_value(self.state().doc())
            .expect("documents always serialize")
    }

    /// Replace the whole document from its JSON form. Undo history is
    /// cleared: a wholesale replacement is a new editing session, not an
    /// edit.
    pub fn set_json(&mut self, json: Value) -> Result<(), EditorError> {
        let doc: Doc = serde_json::from_value(json)
            .map_err(|e| EditorError::InvalidJson(e.to_string()))?;
        self.replace_doc(doc)
    }

    pub fn get_html(&self) -> Result<String, EditorError> {
        let pipeline =
            self.html.as_ref().ok_or(EditorError::NoHtmlPipeline)?;
        let state = self.state();
        let registry = self.handles.registry.read();
        pipeline
            .serialize(state.doc(), &registry)
            .map_err(EditorError::Html)
    }

    pub fn set_html(&mut self, html: &str) -> Result<(), EditorError> {
        let pipeline = self
            .html
            .as_ref()
            .ok_or(EditorError::NoHtmlPipeline)?
            .clone();
        let doc = {
            let registry = self.handles.registry.read();
            pipeline
                .parse(html, &registry)
                .map_err(EditorError::Html)?
        };
        self.replace_doc(doc)
    }

    fn replace_doc(&mut self, doc: Doc) -> Result<(), EditorError> {
        let doc = doc.normalized();
        let ids = doc.collect_ids();
        let mut seen = std::collections::HashSet::new();
        for id in &ids {
            if !seen.insert(id) {
                return Err(EditorError::InvalidJson(format!(
                    "duplicate block id {id}"
                )));
            }
        }
        let old = self.state();
        let selection =
            validate_selection(old.selection(), &doc);
        let new_state = EditorState::create(StateConfig {
            doc: Some(doc),
            selection: Some(selection),
            schema: Some(self.handles.registry.clone()),
            ..Default::default()
        });
        *self.handles.state.write() = new_state.clone();
        self.history.clear();
        let marker = TransactionBuilder::new(Origin::External).build();
        self.fabric.notify_state_change(&old, &new_state, &marker);
        self.handles.bus.emit(
            &events::STATE_CHANGE,
            &StateChangeEvent {
                old_state: old,
                new_state,
                transaction: marker,
            },
        );
        Ok(())
    }

    // -------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------

    /// Dispatch a transaction through the middleware chain into the
    /// state machine. A step failure aborts the dispatch and leaves the
    /// state untouched.
    pub fn dispatch(
        &mut self,
        tr: Transaction,
    ) -> Result<(), EditorError> {
        if self.phase == Phase::Destroyed {
            return Err(EditorError::Destroyed);
        }
        let entries = self.handles.middleware.read().snapshot();
        let state = self.state();
        let mut forwarded: Option<Transaction> = None;
        dispatch_with_middleware(&entries, tr, &state, &mut |t| {
            forwarded = Some(t)
        });
        let tr = forwarded.expect("middleware chain always forwards");
        self.final_dispatch(tr)
    }

    fn final_dispatch(
        &mut self,
        tr: Transaction,
    ) -> Result<(), EditorError> {
        let old = self.state();
        let new = old.apply(&tr)?;
        new.doc().explicitly_assert_invariants();
        *self.handles.state.write() = new.clone();
        self.history.push(&tr);
        self.fabric.notify_state_change(&old, &new, &tr);
        self.handles.bus.emit(
            &events::STATE_CHANGE,
            &StateChangeEvent {
                old_state: old,
                new_state: new,
                transaction: tr,
            },
        );
        self.drain_dispatch_queue();
        Ok(())
    }

    /// Apply transactions plugins queued from their hooks. Each drained
    /// transaction goes through the full dispatch path, in queue order.
    fn drain_dispatch_queue(&mut self) {
        loop {
            let next = self.handles.dispatch_queue.lock().pop_front();
            let Some(tr) = next else { break };
            if let Err(error) = self.dispatch(tr) {
                warn!(%error, "queued plugin transaction failed");
            }
        }
    }

    // -------------------------------------------------------------------
    // Commands, history, capabilities
    // -------------------------------------------------------------------

    /// Run a named command. `false` when the command is missing, refuses
    /// the current state, throws, or its transaction fails to apply.
    pub fn execute_command(&mut self, name: &str) -> bool {
        match name {
            "undo" => return self.undo(),
            "redo" => return self.redo(),
            _ => {}
        }
        let Some(command) = self.handles.commands.read().get(name)
        else {
            return false;
        };
        let state = self.state();
        let produced =
            catch_unwind(AssertUnwindSafe(|| command(&state)));
        match produced {
            Ok(Some(tr)) => self.dispatch(tr).is_ok(),
            Ok(None) => false,
            Err(_) => {
                warn!(command = name, "command panicked; ignored");
                false
            }
        }
    }

    /// Whether a named command would currently produce a transaction.
    pub fn can(&self, name: &str) -> bool {
        match name {
            "undo" => return self.history.can_undo(),
            "redo" => return self.history.can_redo(),
            _ => {}
        }
        let Some(command) = self.handles.commands.read().get(name)
        else {
            return false;
        };
        let state = self.state();
        matches!(
            catch_unwind(AssertUnwindSafe(|| command(&state))),
            Ok(Some(_))
        )
    }

    pub fn undo(&mut self) -> bool {
        let Some(tr) = self.history.undo() else {
            return false;
        };
        self.dispatch(tr).is_ok()
    }

    pub fn redo(&mut self) -> bool {
        let Some(tr) = self.history.redo() else {
            return false;
        };
        self.dispatch(tr).is_ok()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Toolbar state: whether an inline format is active at the current
    /// selection.
    pub fn is_format_active(&self, format: InlineFormat) -> bool {
        commands::is_mark_active(&self.state(), format.as_ref())
    }

    pub fn decorations(&self) -> DecorationSet {
        self.fabric.collect_decorations(&self.state(), None)
    }

    // -------------------------------------------------------------------
    // Events & shared subsystems
    // -------------------------------------------------------------------

    pub fn on<T: 'static>(
        &self,
        key: &EventKey<T>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription {
        self.handles.bus.on(key, callback)
    }

    pub fn off(&self, subscription: Subscription) {
        subscription.unsubscribe();
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.handles.bus
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.handles.registry
    }

    pub fn destroy_plugin(&mut self, plugin_id: &str) -> bool {
        let removed =
            self.fabric.destroy_plugin(plugin_id, &self.handles);
        if removed {
            self.handles
                .bus
                .emit(&events::PLUGIN_UNREGISTERED, &plugin_id.to_owned());
        }
        removed
    }

    fn register_core_commands(&mut self) -> Result<(), EditorError> {
        let mut registry = self.handles.commands.write();
        let split_ids = Arc::clone(&self.ids);

        registry.register(
            "selectAll",
            "core",
            Arc::new(commands::select_all),
        )?;
        registry.register(
            "toggleBold",
            "core",
            Arc::new(commands::toggle_bold),
        )?;
        registry.register(
            "toggleItalic",
            "core",
            Arc::new(commands::toggle_italic),
        )?;
        registry.register(
            "toggleUnderline",
            "core",
            Arc::new(commands::toggle_underline),
        )?;
        registry.register(
            "toggleStrikeThrough",
            "core",
            Arc::new(commands::toggle_strike_through),
        )?;
        registry.register(
            "deleteBackward",
            "core",
            Arc::new(commands::delete_backward),
        )?;
        registry.register(
            "deleteForward",
            "core",
            Arc::new(commands::delete_forward),
        )?;
        registry.register(
            "deleteWordBackward",
            "core",
            Arc::new(commands::delete_word_backward),
        )?;
        registry.register(
            "deleteWordForward",
            "core",
            Arc::new(commands::delete_word_forward),
        )?;
        registry.register(
            "deleteSoftLineBackward",
            "core",
            Arc::new(commands::delete_soft_line_backward),
        )?;
        registry.register(
            "deleteSoftLineForward",
            "core",
            Arc::new(commands::delete_soft_line_forward),
        )?;
        registry.register(
            "splitBlock",
            "core",
            Arc::new(move |state: &EditorState| {
                commands::split_block(state, &split_ids)
            }),
        )?;
        registry.register(
            "mergeBlockBackward",
            "core",
            Arc::new(commands::merge_block_backward),
        )?;
        registry.register(
            "mergeBlockForward",
            "core",
            Arc::new(commands::merge_block_forward),
        )?;
        Ok(())
    }

    /// The id generator used for splits and pastes driven through the
    /// editor.
    pub fn ids(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Convenience wrappers over the command layer for hosts that do not
    /// go through named commands.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let state = self.state();
        match commands::insert_text(&state, text) {
            Some(tr) => self.dispatch(tr).is_ok(),
            None => false,
        }
    }

    pub fn set_selection(&mut self, selection: Selection) -> bool {
        let state = self.state();
        let validated = validate_selection(&selection, state.doc());
        let tr = TransactionBuilder::new(Origin::Command)
            .selection_before(state.selection().clone())
            .set_selection(validated)
            .build();
        self.dispatch(tr).is_ok()
    }

    pub fn paste(&mut self, slice: &commands::ContentSlice) -> bool {
        let state = self.state();
        match commands::paste_slice(&state, slice, &self.ids) {
            Some(tr) => self.dispatch(tr).is_ok(),
            None => false,
        }
    }

    /// Offer a dropped or pasted file to every matching file handler, in
    /// registration order. Returns whether any handler produced a
    /// transaction that applied.
    pub fn handle_file(
        &mut self,
        payload: &crate::schema::FilePayload,
    ) -> bool {
        let handlers: Vec<crate::schema::FileHandlerFn> = {
            let registry = self.handles.registry.read();
            registry
                .file_handlers_for(&payload.mime)
                .into_iter()
                .map(|h| h.handler.clone())
                .collect()
        };
        let mut handled = false;
        for handler in handlers {
            let produced =
                catch_unwind(AssertUnwindSafe(|| handler(payload)));
            match produced {
                Ok(Some(tr)) => {
                    handled |= self.dispatch(tr).is_ok();
                }
                Ok(None) => {}
                Err(_) => {
                    warn!(
                        mime = %payload.mime,
                        "file handler panicked; ignored",
                    );
                }
            }
        }
        handled
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        if self.phase == Phase::Running {
            self.destroy();
        }
    }
}
