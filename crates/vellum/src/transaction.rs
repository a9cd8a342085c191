// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::time::{SystemTime, UNIX_EPOCH};

use strum_macros::{AsRefStr, Display};

use crate::doc::MarkSet;
use crate::selection::Selection;
use crate::step::Step;

/// Where a transaction came from. History pushes key off this: `History`
/// transactions are never recorded again.
#[derive(
    AsRefStr, Clone, Copy, Debug, Display, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "camelCase")]
pub enum Origin {
    Input,
    Command,
    History,
    Plugin,
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub origin: Origin,
    pub timestamp_ms: u64,
    pub history_direction: Option<HistoryDirection>,
}

/// A bundled unit of change: steps, the selections either side of them,
/// the stored marks left behind, and bookkeeping metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    steps: Vec<Step>,
    selection_before: Option<Selection>,
    selection_after: Option<Selection>,
    stored_marks_after: Option<MarkSet>,
    metadata: Metadata,
}

impl Transaction {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn selection_before(&self) -> Option<&Selection> {
        self.selection_before.as_ref()
    }

    pub fn selection_after(&self) -> Option<&Selection> {
        self.selection_after.as_ref()
    }

    pub fn stored_marks_after(&self) -> Option<&MarkSet> {
        self.stored_marks_after.as_ref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn origin(&self) -> Origin {
        self.metadata.origin
    }

    /// Whether any step touches the document tree.
    pub fn changes_doc(&self) -> bool {
        self.steps.iter().any(Step::is_document_step)
    }

    /// The kind of the first step, used by history grouping.
    pub fn first_step_kind(&self) -> Option<crate::step::StepKind> {
        self.steps.first().map(Step::kind)
    }
}

/// Invert a transaction: reverse-order step inversions, swapped
/// selections, origin `History`.
pub fn invert_transaction(tr: &Transaction) -> Transaction {
    Transaction {
        steps: tr.steps.iter().rev().map(Step::invert).collect(),
        selection_before: tr.selection_after.clone(),
        selection_after: tr.selection_before.clone(),
        stored_marks_after: None,
        metadata: Metadata {
            origin: Origin::History,
            timestamp_ms: tr.metadata.timestamp_ms,
            history_direction: tr.metadata.history_direction,
        },
    }
}

/// Fluent accumulator for building a [`Transaction`].
#[derive(Debug)]
pub struct TransactionBuilder {
    steps: Vec<Step>,
    selection_before: Option<Selection>,
    selection_after: Option<Selection>,
    stored_marks_after: Option<MarkSet>,
    origin: Origin,
    timestamp_ms: u64,
    history_direction: Option<HistoryDirection>,
}

impl TransactionBuilder {
    pub fn new(origin: Origin) -> Self {
        Self {
            steps: Vec::new(),
            selection_before: None,
            selection_after: None,
            stored_marks_after: None,
            origin,
            timestamp_ms: now_ms(),
            history_direction: None,
        }
    }

    /// Override the wall-clock timestamp; tests use this to drive history
    /// grouping deterministically.
    pub fn at(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn selection_before(mut self, selection: Selection) -> Self {
        self.selection_before = Some(selection);
        self
    }

    /// Record the selection the transaction leaves behind.
    pub fn set_selection(mut self, selection: Selection) -> Self {
        self.selection_after = Some(selection);
        self
    }

    /// Change the stored marks. Emits the corresponding state-level step
    /// so the change participates in inversion.
    pub fn set_stored_marks(
        mut self,
        new: Option<MarkSet>,
        old: Option<MarkSet>,
    ) -> Self {
        self.stored_marks_after = new.clone();
        self.steps.push(Step::SetStoredMarks { new, old });
        self
    }

    pub fn history_direction(
        mut self,
        direction: HistoryDirection,
    ) -> Self {
        self.history_direction = Some(direction);
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            steps: self.steps,
            selection_before: self.selection_before,
            selection_after: self.selection_after,
            stored_marks_after: self.stored_marks_after,
            metadata: Metadata {
                origin: self.origin,
                timestamp_ms: self.timestamp_ms,
                history_direction: self.history_direction,
            },
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
