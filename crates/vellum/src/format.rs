// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The inline formats the core ships commands for.
///
/// Mark kinds are open strings at the schema layer (plugins register their
/// own); this enum names the built-in ones so command code and tests don't
/// pass raw strings around.
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    PartialEq,
    Eq,
    Hash,
)]
#[strum(serialize_all = "camelCase")]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    Font,
    FontSize,
    TextColor,
    Highlight,
    Link,
}

impl InlineFormat {
    /// Attributed formats carry key/value data and apply with replace
    /// semantics; boolean formats toggle.
    pub fn is_attributed(&self) -> bool {
        match self {
            InlineFormat::Bold
            | InlineFormat::Italic
            | InlineFormat::Underline
            | InlineFormat::StrikeThrough => false,
            InlineFormat::Font
            | InlineFormat::FontSize
            | InlineFormat::TextColor
            | InlineFormat::Highlight
            | InlineFormat::Link => true,
        }
    }
}
