// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a block node. Unique within a document; persists
/// across identity-preserving edits. The host view keys DOM node identity
/// on it.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Source of fresh [`BlockId`]s.
///
/// Splits and pastes need new ids; steps carry the id so that application
/// stays deterministic. Production editors use random ids, tests use the
/// sequential mode so expected documents can be written down literally.
#[derive(Debug)]
pub struct IdGenerator {
    mode: IdMode,
}

#[derive(Debug)]
enum IdMode {
    Random,
    Sequential { prefix: String, next: AtomicU64 },
}

impl IdGenerator {
    pub fn random() -> Self {
        Self {
            mode: IdMode::Random,
        }
    }

    /// Deterministic generator producing `{prefix}-1`, `{prefix}-2`, …
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self {
            mode: IdMode::Sequential {
                prefix: prefix.into(),
                next: AtomicU64::new(1),
            },
        }
    }

    pub fn next_id(&self) -> BlockId {
        match &self.mode {
            IdMode::Random => BlockId::new(Uuid::new_v4().to_string()),
            IdMode::Sequential { prefix, next } => {
                let n = next.fetch_add(1, Ordering::Relaxed);
                BlockId::new(format!("{prefix}-{n}"))
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::random()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sequential_generator_counts_up_from_one() {
        let ids = IdGenerator::sequential("b");
        assert_eq!(ids.next_id(), BlockId::new("b-1"));
        assert_eq!(ids.next_id(), BlockId::new("b-2"));
        assert_eq!(ids.next_id(), BlockId::new("b-3"));
    }

    #[test]
    fn random_generator_does_not_repeat() {
        let ids = IdGenerator::random();
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
