// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

//! Undo/redo over two stacks of transaction groups.
//!
//! Bursts of typing coalesce: a transaction joins the previous group when
//! both are input-origin, land inside the grouping window and start with
//! the same step kind (inserts merge with inserts, deletes with deletes,
//! never mixed). Undoing a group applies the inverted transactions in
//! reverse order as one summary transaction.

use crate::step::StepKind;
use crate::transaction::{
    invert_transaction, HistoryDirection, Origin, Transaction,
    TransactionBuilder,
};

pub const DEFAULT_GROUP_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_LIMIT: usize = 100;

#[derive(Clone, Debug)]
struct HistoryGroup {
    transactions: Vec<Transaction>,
    origin: Origin,
    /// Timestamp of the first transaction; the window anchors here.
    timestamp_ms: u64,
}

impl HistoryGroup {
    fn of(tr: Transaction) -> Self {
        Self {
            origin: tr.origin(),
            timestamp_ms: tr.metadata().timestamp_ms,
            transactions: vec![tr],
        }
    }

    fn last_step_kind(&self) -> Option<StepKind> {
        self.transactions.last().and_then(Transaction::first_step_kind)
    }
}

#[derive(Debug)]
pub struct History {
    undo: Vec<HistoryGroup>,
    redo: Vec<HistoryGroup>,
    group_timeout_ms: u64,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_TIMEOUT_MS, DEFAULT_LIMIT)
    }
}

impl History {
    pub fn new(group_timeout_ms: u64, limit: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            group_timeout_ms,
            limit,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Runtime reconfiguration; existing groups are left as they are.
    pub fn set_group_timeout_ms(&mut self, timeout_ms: u64) {
        self.group_timeout_ms = timeout_ms;
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.undo.len() > self.limit {
            self.undo.remove(0);
        }
    }

    /// Record a dispatched transaction. History-origin transactions are
    /// never recorded; anything else clears the redo stack.
    pub fn push(&mut self, tr: &Transaction) {
        if tr.origin() == Origin::History {
            return;
        }
        if tr.steps().is_empty() {
            return;
        }
        self.redo.clear();

        let appendable = self.undo.last().is_some_and(|group| {
            group.origin == Origin::Input
                && tr.origin() == Origin::Input
                && tr
                    .metadata()
                    .timestamp_ms
                    .saturating_sub(group.timestamp_ms)
                    < self.group_timeout_ms
                && group.last_step_kind() == tr.first_step_kind()
        });
        if appendable {
            self.undo
                .last_mut()
                .expect("appendable group exists")
                .transactions
                .push(tr.clone());
        } else {
            self.undo.push(HistoryGroup::of(tr.clone()));
            if self.undo.len() > self.limit {
                self.undo.remove(0);
            }
        }
    }

    /// Pop the newest group and produce the summary transaction that
    /// reverts it. `None` on an empty stack (undo is idempotent there).
    pub fn undo(&mut self) -> Option<Transaction> {
        let group = self.undo.pop()?;
        let mut builder = TransactionBuilder::new(Origin::History)
            .history_direction(HistoryDirection::Undo);
        if let Some(selection) =
            group.transactions.last().and_then(|tr| {
                tr.selection_after().cloned()
            })
        {
            builder = builder.selection_before(selection);
        }
        for tr in group.transactions.iter().rev() {
            let inverted = invert_transaction(tr);
            builder = builder.steps(inverted.steps().to_vec());
        }
        if let Some(selection) = group
            .transactions
            .first()
            .and_then(|tr| tr.selection_before().cloned())
        {
            builder = builder.set_selection(selection);
        }
        let summary = builder.build();
        self.redo.push(group);
        Some(summary)
    }

    /// Pop the newest redo group and produce the summary transaction that
    /// replays it.
    pub fn redo(&mut self) -> Option<Transaction> {
        let group = self.redo.pop()?;
        let mut builder = TransactionBuilder::new(Origin::History)
            .history_direction(HistoryDirection::Redo);
        if let Some(selection) = group
            .transactions
            .first()
            .and_then(|tr| tr.selection_before().cloned())
        {
            builder = builder.selection_before(selection);
        }
        for tr in &group.transactions {
            builder = builder.steps(tr.steps().to_vec());
        }
        if let Some(selection) = group
            .transactions
            .last()
            .and_then(|tr| tr.selection_after().cloned())
        {
            builder = builder.set_selection(selection);
        }
        let summary = builder.build();
        self.undo.push(group);
        Some(summary)
    }
}
