// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use std::collections::BTreeMap;

use serde_json::Value;

/// Attribute map attached to blocks, inline atoms and attributed marks.
///
/// A `BTreeMap` keeps serialization order deterministic, which the JSON
/// round-trip tests rely on.
pub type AttrMap = BTreeMap<String, Value>;

/// Build an [`AttrMap`] from string pairs. Values that parse as JSON
/// scalars are kept as strings anyway; attribute values are opaque to the
/// engine.
pub fn attrs_of<I, K, V>(pairs: I) -> AttrMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

/// Fetch a string-valued attribute.
pub fn attr_str<'a>(attrs: &'a AttrMap, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(Value::as_str)
}
