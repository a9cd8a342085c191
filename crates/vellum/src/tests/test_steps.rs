// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::doc::{BlockId, Mark, MarkSet, TextNode};
use crate::schema::SchemaRegistry;
use crate::step::{apply_all, apply_step, Step};
use crate::tests::testutils::{doc_of, para, para_runs};
use crate::transaction::{
    invert_transaction, Origin, TransactionBuilder,
};

#[test]
fn split_then_merge_round_trips_and_drops_the_new_id() {
    let schema = SchemaRegistry::new();
    let doc = doc_of(vec![para("b1", "hello world")]);

    let block = doc.find_block(&"b1".into()).unwrap().clone();
    let split = Step::split_block(&block, 5, "b2");
    let after_split = apply_step(&doc, &split, &schema).unwrap();
    assert_eq!(after_split.blocks().len(), 2);
    assert_eq!(
        after_split.find_block(&"b1".into()).unwrap().text(),
        "hello"
    );
    assert_eq!(
        after_split.find_block(&"b2".into()).unwrap().text(),
        " world"
    );

    let right = after_split.find_block(&"b2".into()).unwrap().clone();
    let merge = Step::merge_blocks("b1", 5, &right);
    let after_merge = apply_step(&after_split, &merge, &schema).unwrap();
    assert_eq!(after_merge.blocks().len(), 1);
    assert_eq!(
        after_merge.find_block(&"b1".into()).unwrap().text(),
        "hello world"
    );
    assert!(!after_merge.contains_block(&"b2".into()));
    after_merge.explicitly_assert_invariants();
}

#[test]
fn transaction_inversion_is_an_involution() {
    let tr = TransactionBuilder::new(Origin::Input)
        .step(Step::insert_text("b1", 0, "hi", MarkSet::new()))
        .step(Step::SplitBlock {
            block_id: "b1".into(),
            offset: 1,
            new_block_id: "b2".into(),
            new_kind: crate::doc::kinds::PARAGRAPH.into(),
            new_attrs: Default::default(),
        })
        .step(Step::AddMark {
            block_id: "b1".into(),
            from: 0,
            to: 1,
            mark: Mark::bold(),
        })
        .build();
    let back = invert_transaction(&invert_transaction(&tr));
    assert_eq!(back.steps(), tr.steps());
}

#[test]
fn applying_a_transaction_and_its_inverse_restores_the_doc() {
    let schema = SchemaRegistry::new();
    let doc = doc_of(vec![
        para_runs(
            "b1",
            &[
                ("bold", MarkSet::single(Mark::bold())),
                (" normal", MarkSet::new()),
            ],
        ),
        para("b2", "second"),
    ]);

    let tr = TransactionBuilder::new(Origin::Input)
        .step(Step::DeleteText {
            block_id: "b1".into(),
            from: 2,
            to: 7,
            captured: vec![
                TextNode::new("ld", MarkSet::single(Mark::bold())),
                TextNode::plain(" no"),
            ],
        })
        .step(Step::MergeBlocks {
            target: "b1".into(),
            source: "b2".into(),
            boundary: 6,
            source_kind: crate::doc::kinds::PARAGRAPH.into(),
            source_attrs: Default::default(),
        })
        .step(Step::AddMark {
            block_id: "b1".into(),
            from: 0,
            to: 4,
            mark: Mark::italic(),
        })
        .build();

    let applied = apply_all(&doc, tr.steps(), &schema).unwrap();
    let inverted = invert_transaction(&tr);
    let restored =
        apply_all(&applied, inverted.steps(), &schema).unwrap();
    assert_eq!(restored, doc);
}

#[test]
fn applied_documents_keep_unique_ids_and_normalized_children() {
    let schema = SchemaRegistry::new();
    let mut doc = doc_of(vec![para("b1", "abcdef")]);
    let steps = [
        Step::SplitBlock {
            block_id: "b1".into(),
            offset: 3,
            new_block_id: "b2".into(),
            new_kind: crate::doc::kinds::PARAGRAPH.into(),
            new_attrs: Default::default(),
        },
        Step::AddMark {
            block_id: "b2".into(),
            from: 0,
            to: 2,
            mark: Mark::bold(),
        },
        Step::insert_text("b2", 1, "x", MarkSet::single(Mark::bold())),
        Step::RemoveMark {
            block_id: "b2".into(),
            from: 0,
            to: 3,
            target: crate::step::MarkTarget::Kind("bold".into()),
        },
        Step::MergeBlocks {
            target: "b1".into(),
            source: "b2".into(),
            boundary: 3,
            source_kind: crate::doc::kinds::PARAGRAPH.into(),
            source_attrs: Default::default(),
        },
    ];
    for step in &steps {
        doc = apply_step(&doc, step, &schema).unwrap();
        doc.explicitly_assert_invariants();
    }
    assert_eq!(doc.find_block(&"b1".into()).unwrap().text(), "abcdxef");
}

#[test]
fn a_failing_step_mid_transaction_leaves_no_partial_state() {
    let schema = SchemaRegistry::new();
    let doc = doc_of(vec![para("b1", "abc")]);
    let steps = vec![
        Step::insert_text("b1", 0, "x", MarkSet::new()),
        Step::insert_text("ghost", 0, "y", MarkSet::new()),
    ];
    assert!(apply_all(&doc, &steps, &schema).is_err());
    // The caller still holds the original document untouched.
    assert_eq!(doc.find_block(&"b1".into()).unwrap().text(), "abc");
}

#[test]
fn merge_restores_the_dropped_id_on_inversion() {
    let schema = SchemaRegistry::new();
    let doc = doc_of(vec![para("b1", "one"), para("b2", "two")]);
    let source = doc.find_block(&"b2".into()).unwrap().clone();
    let merge = Step::merge_blocks("b1", 3, &source);
    let merged = apply_step(&doc, &merge, &schema).unwrap();
    assert!(!merged.contains_block(&"b2".into()));

    let resurrected =
        apply_step(&merged, &merge.invert(), &schema).unwrap();
    let ids: Vec<BlockId> = resurrected.collect_ids();
    assert_eq!(ids, vec![BlockId::new("b1"), BlockId::new("b2")]);
    assert_eq!(resurrected, doc);
}
