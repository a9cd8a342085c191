// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Typed publish/subscribe bus. Payload types ride on [`EventKey`]s, so a
//! subscriber written against `EventKey<StateChangeEvent>` can never be
//! handed the wrong payload. One listener panicking never reaches the
//! others.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// A typed event name. Declare once, share between emitter and listeners:
///
/// ```
/// use vellum::plugin::EventKey;
/// static WORD_COUNT: EventKey<usize> = EventKey::new("wordCount");
/// ```
pub struct EventKey<T> {
    name: &'static str,
    _payload: PhantomData<fn(T)>,
}

impl<T> EventKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _payload: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A typed service name, same idea as [`EventKey`] for the service
/// registry.
pub struct ServiceKey<T> {
    name: &'static str,
    _service: PhantomData<fn(T)>,
}

impl<T> ServiceKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _service: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

type ErasedListener = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    plugin_id: Option<String>,
    callback: ErasedListener,
}

/// Handle returned by [`EventBus::on`]; dropping it does nothing, calling
/// [`Subscription::unsubscribe`] removes the listener.
pub struct Subscription {
    bus: Arc<BusInner>,
    event: &'static str,
    id: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.bus.remove(self.event, self.id);
    }

    pub(crate) fn token(&self) -> (&'static str, u64) {
        (self.event, self.id)
    }
}

#[derive(Default)]
struct BusInner {
    listeners: RwLock<HashMap<&'static str, Vec<ListenerEntry>>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn remove(&self, event: &'static str, id: u64) {
        let mut listeners = self.listeners.write();
        if let Some(entries) = listeners.get_mut(event) {
            entries.retain(|entry| entry.id != id);
        }
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to an event. Listeners run in subscription order.
    pub fn on<T: 'static>(
        &self,
        key: &EventKey<T>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription {
        self.on_tagged(key, None, callback)
    }

    /// Subscribe on behalf of a plugin, so destroying the plugin can drop
    /// the listener.
    pub(crate) fn on_tagged<T: 'static>(
        &self,
        key: &EventKey<T>,
        plugin_id: Option<String>,
        callback: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let erased: ErasedListener = Arc::new(move |payload| {
            if let Some(payload) = payload.downcast_ref::<T>() {
                callback(payload);
            }
        });
        self.inner
            .listeners
            .write()
            .entry(key.name)
            .or_default()
            .push(ListenerEntry {
                id,
                plugin_id,
                callback: erased,
            });
        Subscription {
            bus: Arc::clone(&self.inner),
            event: key.name,
            id,
        }
    }

    /// Emit an event. Each listener runs inside a panic guard: a failing
    /// listener is logged and the rest still run.
    pub fn emit<T: 'static>(&self, key: &EventKey<T>, payload: &T) {
        let callbacks: Vec<ErasedListener> = {
            let listeners = self.inner.listeners.read();
            listeners
                .get(key.name)
                .map(|entries| {
                    entries
                        .iter()
                        .map(|e| Arc::clone(&e.callback))
                        .collect()
                })
                .unwrap_or_default()
        };
        for callback in callbacks {
            let result =
                catch_unwind(AssertUnwindSafe(|| callback(payload)));
            if result.is_err() {
                warn!(event = key.name, "event listener panicked");
            }
        }
    }

    /// Remove one listener by token.
    pub(crate) fn off(&self, event: &'static str, id: u64) {
        self.inner.remove(event, id);
    }

    /// Remove every listener a plugin registered.
    pub(crate) fn remove_plugin(&self, plugin_id: &str) {
        let mut listeners = self.inner.listeners.write();
        for entries in listeners.values_mut() {
            entries.retain(|entry| {
                entry.plugin_id.as_deref() != Some(plugin_id)
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    static PING: EventKey<usize> = EventKey::new("ping");

    #[test]
    fn listeners_receive_typed_payloads_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(RwLock::new(Vec::new()));
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            bus.on(&PING, move |n: &usize| {
                log.write().push((tag, *n));
            });
        }
        bus.emit(&PING, &7);
        assert_eq!(&*log.read(), &[("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribing_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let sub = bus.on(&PING, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&PING, &1);
        sub.unsubscribe();
        bus.emit(&PING, &2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn a_panicking_listener_does_not_starve_the_others() {
        let bus = EventBus::new();
        bus.on(&PING, |_| panic!("listener exploded"));
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        bus.on(&PING, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        bus.emit(&PING, &1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plugin_tagged_listeners_are_bulk_removed() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        bus.on_tagged(&PING, Some("wordcount".into()), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        bus.remove_plugin("wordcount");
        bus.emit(&PING, &1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
