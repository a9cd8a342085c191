// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};

use crate::doc::attrs::AttrMap;

/// An opaque inline node of length 1 in offset space: an image, a mention,
/// a hard break. Carries no marks; what "hard break" is actually called is
/// an inline-spec concern, not a core one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InlineAtom {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    attrs: AttrMap,
}

impl InlineAtom {
    pub fn new(kind: impl Into<String>, attrs: AttrMap) -> Self {
        Self {
            kind: kind.into(),
            attrs,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// A copy with replaced attrs, used by `SetInlineNodeAttr`.
    pub fn with_attrs(&self, attrs: AttrMap) -> InlineAtom {
        InlineAtom::new(self.kind.clone(), attrs)
    }
}
