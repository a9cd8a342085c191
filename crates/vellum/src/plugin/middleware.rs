// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Transaction middleware: interceptors between `dispatch` and the final
//! application. Each middleware receives the transaction and a `next`
//! continuation it must call exactly once; the chain guards against
//! double calls, missed calls and panics, so a broken middleware can
//! delay a transaction's transformation but never drop it.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::state::EditorState;
use crate::transaction::Transaction;

/// `(tr, state, next)`. Call `next` with the (possibly transformed)
/// transaction to pass it on.
pub type MiddlewareFn = Arc<
    dyn Fn(Transaction, &EditorState, &mut dyn FnMut(Transaction))
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct MiddlewareEntry {
    pub(crate) id: u64,
    pub(crate) plugin_id: Option<String>,
    pub(crate) priority: i32,
    pub(crate) func: MiddlewareFn,
}

static NEXT_MIDDLEWARE_ID: AtomicU64 = AtomicU64::new(1);

/// Ascending-priority chain of middleware entries.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    entries: Vec<MiddlewareEntry>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a middleware; returns its removal id. Equal priorities
    /// keep registration order.
    pub fn register(
        &mut self,
        func: MiddlewareFn,
        priority: i32,
        plugin_id: Option<String>,
    ) -> u64 {
        let id = NEXT_MIDDLEWARE_ID.fetch_add(1, Ordering::Relaxed);
        let entry = MiddlewareEntry {
            id,
            plugin_id,
            priority,
            func,
        };
        let at = self
            .entries
            .partition_point(|e| e.priority <= priority);
        self.entries.insert(at, entry);
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn remove_plugin(&mut self, plugin_id: &str) {
        self.entries
            .retain(|e| e.plugin_id.as_deref() != Some(plugin_id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn snapshot(&self) -> Vec<MiddlewareEntry> {
        self.entries.clone()
    }
}

/// Run a transaction through the chain and into `final_dispatch`.
///
/// When every middleware forwards its transaction unchanged this is
/// exactly `final_dispatch(tr)`.
pub fn dispatch_with_middleware(
    entries: &[MiddlewareEntry],
    tr: Transaction,
    state: &EditorState,
    final_dispatch: &mut dyn FnMut(Transaction),
) {
    run_from(entries, 0, tr, state, final_dispatch);
}

fn run_from(
    entries: &[MiddlewareEntry],
    index: usize,
    tr: Transaction,
    state: &EditorState,
    final_dispatch: &mut dyn FnMut(Transaction),
) {
    let Some(entry) = entries.get(index) else {
        final_dispatch(tr);
        return;
    };

    let called = Cell::new(false);
    let forwarded: Cell<Option<Transaction>> = Cell::new(None);
    let result = catch_unwind(AssertUnwindSafe(|| {
        (entry.func)(tr.clone(), state, &mut |next_tr| {
            if called.replace(true) {
                warn!(
                    middleware = entry.id,
                    "middleware called next() more than once; \
                     extra call ignored",
                );
                return;
            }
            forwarded.set(Some(next_tr));
        });
    }));

    let next_tr = match (result, forwarded.take()) {
        (Ok(()), Some(next_tr)) => next_tr,
        (Ok(()), None) => {
            warn!(
                middleware = entry.id,
                "middleware returned without calling next(); \
                 forwarding the transaction unchanged",
            );
            tr
        }
        (Err(_), _) => {
            warn!(
                middleware = entry.id,
                "middleware panicked; forwarding the transaction \
                 unchanged",
            );
            tr
        }
    };
    run_from(entries, index + 1, next_tr, state, final_dispatch);
}
