// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::doc::nodes::{kinds, BlockNode, Children};
use crate::error::InvariantViolation;

/// Declared content model of a block kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentRule {
    /// Children are inline content only (paragraph, heading).
    Inline,
    /// Children are nested blocks; `allowed` of `None` accepts any block
    /// kind (blockquote, table cell), `Some` restricts (table → rows).
    Blocks { allowed: Option<Vec<String>> },
}

impl ContentRule {
    pub fn any_blocks() -> Self {
        ContentRule::Blocks { allowed: None }
    }

    pub fn blocks_of<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentRule::Blocks {
            allowed: Some(allowed.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether a child block of `child_kind` may be added under a parent
    /// with this rule.
    pub fn allows_block(&self, child_kind: &str) -> bool {
        match self {
            ContentRule::Inline => false,
            ContentRule::Blocks { allowed: None } => true,
            ContentRule::Blocks {
                allowed: Some(list),
            } => list.iter().any(|k| k == child_kind),
        }
    }
}

/// Built-in rules for the kinds the core names itself. Feature plugins
/// register rules for everything else; a kind with no rule at all is
/// permissive (the core cannot guess the content model of a kind it has
/// never seen).
pub fn default_rule(kind: &str) -> Option<ContentRule> {
    match kind {
        kinds::PARAGRAPH | kinds::HEADING | kinds::LIST_ITEM => {
            Some(ContentRule::Inline)
        }
        kinds::BLOCKQUOTE | kinds::TABLE_CELL => {
            Some(ContentRule::any_blocks())
        }
        kinds::LIST => Some(ContentRule::blocks_of([kinds::LIST_ITEM])),
        kinds::TABLE => Some(ContentRule::blocks_of([kinds::TABLE_ROW])),
        kinds::TABLE_ROW => {
            Some(ContentRule::blocks_of([kinds::TABLE_CELL]))
        }
        _ => None,
    }
}

/// Cheap content-model check used by tests and the invariant assertions.
/// `rule_for` resolves a kind to its effective rule (registry override or
/// default).
pub fn validate_content(
    block: &BlockNode,
    rule_for: &dyn Fn(&str) -> Option<ContentRule>,
) -> Result<(), InvariantViolation> {
    let Some(rule) = rule_for(block.kind()) else {
        return Ok(());
    };
    match (&rule, block.children()) {
        (ContentRule::Inline, Children::Inline(_)) => Ok(()),
        (ContentRule::Inline, Children::Blocks(_)) => {
            Err(InvariantViolation(format!(
                "{} block {} must hold inline content",
                block.kind(),
                block.id()
            )))
        }
        (ContentRule::Blocks { .. }, Children::Inline(_)) => {
            Err(InvariantViolation(format!(
                "{} block {} must hold block children",
                block.kind(),
                block.id()
            )))
        }
        (ContentRule::Blocks { .. }, Children::Blocks(children)) => {
            for child in children {
                if !rule.allows_block(child.kind()) {
                    return Err(InvariantViolation(format!(
                        "{} block {} cannot contain a {} child",
                        block.kind(),
                        block.id(),
                        child.kind()
                    )));
                }
            }
            Ok(())
        }
    }
}
