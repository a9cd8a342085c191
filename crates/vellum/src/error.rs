// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use thiserror::Error;

use crate::doc::BlockId;

/// A step referenced something that does not exist in the document, or an
/// offset outside the target block. Fatal to the whole transaction: the
/// dispatch is aborted and the state is left unchanged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("offset {offset} out of range 0..={len} in block {block_id}")]
    OffsetOutOfRange {
        block_id: BlockId,
        offset: usize,
        len: usize,
    },

    #[error("block {0} already exists in the document")]
    DuplicateBlock(BlockId),

    #[error("no node found at path [{0}]")]
    UnknownPath(String),

    #[error("index {index} out of bounds for parent with {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("a {parent} node cannot contain a {child} node")]
    Content { parent: String, child: String },

    #[error("block {0} does not hold inline content")]
    NotInlineBlock(BlockId),

    #[error("block {0} does not hold block children")]
    NotContainerBlock(BlockId),

    #[error("expected an inline atom at offset {offset} in block {block_id}")]
    ExpectedAtom { block_id: BlockId, offset: usize },

    #[error(
        "range {from}..{to} in block {block_id} crosses an inline atom; \
         decompose the deletion into per-node steps"
    )]
    RangeCrossesAtom {
        block_id: BlockId,
        from: usize,
        to: usize,
    },
}

/// A post-apply document check failed. This indicates a bug in the step
/// algebra or in a hand-built step; the transaction is rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("document invariant violated: {0}")]
pub struct InvariantViolation(pub String);

/// Failures registering schema entries, commands or plugins.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("duplicate {kind} registration: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("command `{name}` is already registered by `{owner}`")]
    DuplicateCommand { name: String, owner: String },

    #[error("plugin `{0}` is already registered")]
    DuplicatePlugin(String),

    #[error("plugin `{id}` depends on `{missing}`, which is not registered")]
    MissingDependency { id: String, missing: String },

    #[error("plugin dependency cycle between: {0}")]
    DependencyCycle(String),
}

/// Errors surfaced by the host-facing editor API.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("no HTML pipeline is configured")]
    NoHtmlPipeline,

    #[error("HTML pipeline failed: {0}")]
    Html(String),

    #[error("invalid document JSON: {0}")]
    InvalidJson(String),

    #[error("the editor has been destroyed")]
    Destroyed,
}
