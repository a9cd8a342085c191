// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::commands::{
    apply_attributed_mark, is_attributed_mark_active, toggle_bold,
};
use crate::doc::{attrs_of, InlineNode, Mark, MarkSet};
use crate::tests::testutils::{doc_of, para, para_runs, sel, state_with};

#[test]
fn reapplying_a_font_size_replaces_instead_of_nesting() {
    let doc = doc_of(vec![para_runs(
        "b1",
        &[("hello", MarkSet::single(Mark::font_size("24px")))],
    )]);
    let state = state_with(doc, sel("b1", 0, "b1", 5));
    let tr =
        apply_attributed_mark(&state, "fontSize", attrs_of([("value", "32px")]))
            .unwrap();
    let next = state.apply(&tr).unwrap();

    let children = next
        .block(&"b1".into())
        .unwrap()
        .inline_children()
        .unwrap()
        .to_vec();
    assert_eq!(children.len(), 1);
    let marks = children[0].as_text().unwrap().marks();
    // Exactly one fontSize mark, carrying the new value.
    assert_eq!(marks.len(), 1);
    assert_eq!(marks.get("fontSize"), Some(&Mark::font_size("32px")));
    assert!(is_attributed_mark_active(&next, "fontSize"));
}

#[test]
fn replacing_a_partial_font_size_covers_the_whole_range() {
    let doc = doc_of(vec![para_runs(
        "b1",
        &[
            ("he", MarkSet::single(Mark::font_size("24px"))),
            ("llo", MarkSet::new()),
        ],
    )]);
    let state = state_with(doc, sel("b1", 0, "b1", 5));
    let tr =
        apply_attributed_mark(&state, "fontSize", attrs_of([("value", "32px")]))
            .unwrap();
    let next = state.apply(&tr).unwrap();
    assert_eq!(
        next.block(&"b1".into()).unwrap().inline_children().unwrap(),
        &[InlineNode::text(
            "hello",
            MarkSet::single(Mark::font_size("32px")),
        )]
    );
}

#[test]
fn mark_set_add_is_commutative_and_remove_associates() {
    // Mark-set equality is value equality, insensitive to order of adds.
    let ab = MarkSet::from_marks([Mark::bold(), Mark::italic()]);
    let ba = MarkSet::from_marks([Mark::italic(), Mark::bold()]);
    assert_eq!(ab, ba);

    let abc = ab.with(Mark::underline());
    let acb =
        MarkSet::from_marks([Mark::bold(), Mark::underline()])
            .with(Mark::italic());
    assert_eq!(abc, acb);

    assert_eq!(
        abc.without_kind("underline").without_kind("italic"),
        abc.without_kind("italic").without_kind("underline"),
    );
}

#[test]
fn toggling_bold_over_a_partially_bold_range_makes_it_all_bold() {
    let doc = doc_of(vec![para_runs(
        "b1",
        &[
            ("he", MarkSet::single(Mark::bold())),
            ("llo", MarkSet::new()),
        ],
    )]);
    let state = state_with(doc, sel("b1", 0, "b1", 5));
    // Not every slice is bold yet, so the toggle adds.
    let next = state.apply(&toggle_bold(&state).unwrap()).unwrap();
    assert_eq!(
        next.block(&"b1".into()).unwrap().inline_children().unwrap(),
        &[InlineNode::text("hello", MarkSet::single(Mark::bold()))]
    );
}

#[test]
fn bold_then_unbold_is_the_identity_on_the_document() {
    let doc = doc_of(vec![para("b1", "hello")]);
    let state = state_with(doc.clone(), sel("b1", 0, "b1", 5));
    let bolded = state.apply(&toggle_bold(&state).unwrap()).unwrap();
    let unbolded =
        bolded.apply(&toggle_bold(&bolded).unwrap()).unwrap();
    assert_eq!(unbolded.doc(), &doc);
}
