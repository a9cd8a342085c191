// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::doc::attrs::AttrMap;
use crate::format::InlineFormat;

/// A typed annotation attached to text runs.
///
/// Boolean marks (bold, italic, …) carry no attrs; attributed marks
/// (fontSize, textColor, link, …) carry key/value data. A mark set holds
/// at most one mark per kind, so applying an attributed mark replaces any
/// existing value of the same kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "AttrMap::is_empty")]
    attrs: AttrMap,
}

impl Mark {
    pub fn new(kind: impl Into<String>, attrs: AttrMap) -> Self {
        Self {
            kind: kind.into(),
            attrs,
        }
    }

    /// A boolean mark: no attributes.
    pub fn boolean(kind: impl Into<String>) -> Self {
        Self::new(kind, AttrMap::new())
    }

    /// An attributed mark with a single attribute.
    pub fn attributed(
        kind: impl Into<String>,
        attr: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut attrs = AttrMap::new();
        attrs.insert(attr.into(), Value::String(value.into()));
        Self::new(kind, attrs)
    }

    pub fn bold() -> Self {
        Self::boolean(InlineFormat::Bold.as_ref())
    }

    pub fn italic() -> Self {
        Self::boolean(InlineFormat::Italic.as_ref())
    }

    pub fn underline() -> Self {
        Self::boolean(InlineFormat::Underline.as_ref())
    }

    pub fn strike_through() -> Self {
        Self::boolean(InlineFormat::StrikeThrough.as_ref())
    }

    pub fn font_size(value: impl Into<String>) -> Self {
        Self::attributed(InlineFormat::FontSize.as_ref(), "value", value)
    }

    pub fn text_color(value: impl Into<String>) -> Self {
        Self::attributed(InlineFormat::TextColor.as_ref(), "value", value)
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::attributed(InlineFormat::Link.as_ref(), "href", href)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

/// An order-insensitive set of marks with value equality.
///
/// Marks are kept sorted by kind and unique per kind, so the derived
/// `PartialEq` is exactly set equality and serialization order is stable.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkSet {
    marks: Vec<Mark>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut set = Self::new();
        for mark in marks {
            set.add(mark);
        }
        set
    }

    pub fn single(mark: Mark) -> Self {
        Self::from_marks([mark])
    }

    /// Add a mark, replacing any existing mark of the same kind.
    pub fn add(&mut self, mark: Mark) {
        match self.marks.binary_search_by(|m| m.kind.cmp(&mark.kind)) {
            Ok(i) => self.marks[i] = mark,
            Err(i) => self.marks.insert(i, mark),
        }
    }

    /// Remove the mark of the given kind, if present.
    pub fn remove_kind(&mut self, kind: &str) -> Option<Mark> {
        match self.marks.binary_search_by(|m| m.kind.as_str().cmp(kind)) {
            Ok(i) => Some(self.marks.remove(i)),
            Err(_) => None,
        }
    }

    /// Remove the mark only if it matches `mark` exactly (kind and attrs).
    pub fn remove_exact(&mut self, mark: &Mark) -> bool {
        match self.marks.binary_search_by(|m| m.kind.cmp(&mark.kind)) {
            Ok(i) if self.marks[i] == *mark => {
                self.marks.remove(i);
                true
            }
            _ => false,
        }
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.get(kind).is_some()
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.get(mark.kind()) == Some(mark)
    }

    pub fn get(&self, kind: &str) -> Option<&Mark> {
        self.marks
            .binary_search_by(|m| m.kind.as_str().cmp(kind))
            .ok()
            .map(|i| &self.marks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Toggle a boolean mark: remove it when present, add it otherwise.
    pub fn toggled(&self, mark: Mark) -> Self {
        let mut out = self.clone();
        if out.contains_kind(mark.kind()) {
            out.remove_kind(mark.kind());
        } else {
            out.add(mark);
        }
        out
    }

    pub fn with(&self, mark: Mark) -> Self {
        let mut out = self.clone();
        out.add(mark);
        out
    }

    pub fn without_kind(&self, kind: &str) -> Self {
        let mut out = self.clone();
        out.remove_kind(kind);
        out
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        Self::from_marks(iter)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mark_set_equality_ignores_insertion_order() {
        let a = MarkSet::from_marks([Mark::bold(), Mark::italic()]);
        let b = MarkSet::from_marks([Mark::italic(), Mark::bold()]);
        assert_eq!(a, b);
    }

    #[test]
    fn adding_an_attributed_mark_replaces_the_same_kind() {
        let mut set = MarkSet::single(Mark::font_size("24px"));
        set.add(Mark::font_size("32px"));
        assert_eq!(set.len(), 1);
        assert_eq!(set, MarkSet::single(Mark::font_size("32px")));
    }

    #[test]
    fn adding_a_boolean_mark_twice_is_idempotent() {
        let mut set = MarkSet::single(Mark::bold());
        set.add(Mark::bold());
        assert_eq!(set, MarkSet::single(Mark::bold()));
    }

    #[test]
    fn add_then_remove_returns_to_the_original_set() {
        let original = MarkSet::single(Mark::italic());
        let mut set = original.clone();
        set.add(Mark::bold());
        set.remove_kind("bold");
        assert_eq!(set, original);
    }

    #[test]
    fn remove_exact_does_not_remove_a_different_value() {
        let mut set = MarkSet::single(Mark::font_size("24px"));
        assert!(!set.remove_exact(&Mark::font_size("32px")));
        assert_eq!(set.len(), 1);
        assert!(set.remove_exact(&Mark::font_size("24px")));
        assert!(set.is_empty());
    }

    #[test]
    fn marks_serialize_with_a_type_discriminant() {
        let set = MarkSet::from_marks([Mark::bold(), Mark::font_size("24px")]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "bold"},
                {"type": "fontSize", "attrs": {"value": "24px"}},
            ])
        );
    }
}
