// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use crate::doc::Mark;
use crate::step::{MarkTarget, Step};

impl Step {
    /// The step that undoes this one. Defined pointwise; steps that remove
    /// content rely on the content captured at construction time.
    ///
    /// For every engine-produced step, `invert` is an involution and
    /// `apply(apply(doc, s), s.invert()) == doc`.
    pub fn invert(&self) -> Step {
        match self {
            Step::InsertText {
                block_id,
                offset,
                segments,
            } => Step::DeleteText {
                block_id: block_id.clone(),
                from: *offset,
                to: *offset
                    + segments.iter().map(|s| s.char_len()).sum::<usize>(),
                captured: segments.clone(),
            },

            Step::DeleteText {
                block_id,
                from,
                captured,
                ..
            } => Step::InsertText {
                block_id: block_id.clone(),
                offset: *from,
                segments: captured.clone(),
            },

            Step::SplitBlock {
                block_id,
                offset,
                new_block_id,
                new_kind,
                new_attrs,
            } => Step::MergeBlocks {
                target: block_id.clone(),
                source: new_block_id.clone(),
                boundary: *offset,
                source_kind: new_kind.clone(),
                source_attrs: new_attrs.clone(),
            },

            // Re-splitting resurrects the merged-away id with its
            // captured kind and attrs, which the target may not share.
            Step::MergeBlocks {
                target,
                source,
                boundary,
                source_kind,
                source_attrs,
            } => Step::SplitBlock {
                block_id: target.clone(),
                offset: *boundary,
                new_block_id: source.clone(),
                new_kind: source_kind.clone(),
                new_attrs: source_attrs.clone(),
            },

            Step::AddMark {
                block_id,
                from,
                to,
                mark,
            } => Step::RemoveMark {
                block_id: block_id.clone(),
                from: *from,
                to: *to,
                target: MarkTarget::Exact(mark.clone()),
            },

            Step::RemoveMark {
                block_id,
                from,
                to,
                target,
            } => Step::AddMark {
                block_id: block_id.clone(),
                from: *from,
                to: *to,
                mark: match target {
                    MarkTarget::Exact(mark) => mark.clone(),
                    // Best effort: removal-by-kind does not capture the
                    // removed values. Engine commands always emit Exact.
                    MarkTarget::Kind(kind) => Mark::boolean(kind.clone()),
                },
            },

            Step::SetBlockType {
                block_id,
                new_kind,
                new_attrs,
                old_kind,
                old_attrs,
            } => Step::SetBlockType {
                block_id: block_id.clone(),
                new_kind: old_kind.clone(),
                new_attrs: old_attrs.clone(),
                old_kind: new_kind.clone(),
                old_attrs: new_attrs.clone(),
            },

            Step::InsertNode {
                parent_path,
                index,
                node,
            } => Step::RemoveNode {
                parent_path: parent_path.clone(),
                index: *index,
                captured: node.clone(),
            },

            Step::RemoveNode {
                parent_path,
                index,
                captured,
            } => Step::InsertNode {
                parent_path: parent_path.clone(),
                index: *index,
                node: captured.clone(),
            },

            Step::SetNodeAttr {
                path,
                new_attrs,
                old_attrs,
            } => Step::SetNodeAttr {
                path: path.clone(),
                new_attrs: old_attrs.clone(),
                old_attrs: new_attrs.clone(),
            },

            Step::InsertInlineNode {
                block_id,
                offset,
                atom,
            } => Step::RemoveInlineNode {
                block_id: block_id.clone(),
                offset: *offset,
                captured: atom.clone(),
            },

            Step::RemoveInlineNode {
                block_id,
                offset,
                captured,
            } => Step::InsertInlineNode {
                block_id: block_id.clone(),
                offset: *offset,
                atom: captured.clone(),
            },

            Step::SetInlineNodeAttr {
                block_id,
                offset,
                new_attrs,
                old_attrs,
            } => Step::SetInlineNodeAttr {
                block_id: block_id.clone(),
                offset: *offset,
                new_attrs: old_attrs.clone(),
                old_attrs: new_attrs.clone(),
            },

            Step::SetStoredMarks { new, old } => Step::SetStoredMarks {
                new: old.clone(),
                old: new.clone(),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::doc::{
        BlockNode, Doc, InlineNode, MarkSet, TextNode,
    };
    use crate::schema::SchemaRegistry;
    use crate::step::apply_step;

    fn roundtrips(doc: &Doc, step: &Step) {
        let schema = SchemaRegistry::new();
        let applied = apply_step(doc, step, &schema).unwrap();
        let reverted =
            apply_step(&applied, &step.invert(), &schema).unwrap();
        assert_eq!(&reverted, doc, "step did not round-trip: {step:?}");
    }

    fn marked_doc() -> Doc {
        Doc::new(vec![BlockNode::paragraph(
            "b1",
            vec![
                InlineNode::text("bold", MarkSet::single(Mark::bold())),
                InlineNode::plain("normal"),
            ],
        )])
    }

    #[test]
    fn invert_is_an_involution() {
        let steps = vec![
            Step::insert_text("b1", 2, "xy", MarkSet::new()),
            Step::DeleteText {
                block_id: "b1".into(),
                from: 0,
                to: 4,
                captured: vec![TextNode::new(
                    "bold",
                    MarkSet::single(Mark::bold()),
                )],
            },
            Step::SplitBlock {
                block_id: "b1".into(),
                offset: 4,
                new_block_id: "b2".into(),
                new_kind: crate::doc::kinds::PARAGRAPH.into(),
                new_attrs: Default::default(),
            },
            Step::AddMark {
                block_id: "b1".into(),
                from: 0,
                to: 4,
                mark: Mark::italic(),
            },
            Step::SetStoredMarks {
                new: Some(MarkSet::single(Mark::bold())),
                old: None,
            },
        ];
        for step in steps {
            assert_eq!(step.invert().invert(), step);
        }
    }

    #[test]
    fn text_steps_round_trip() {
        let doc = marked_doc();
        roundtrips(&doc, &Step::insert_text("b1", 4, "!", MarkSet::new()));
        roundtrips(
            &doc,
            &Step::DeleteText {
                block_id: "b1".into(),
                from: 2,
                to: 6,
                captured: vec![
                    TextNode::new("ld", MarkSet::single(Mark::bold())),
                    TextNode::plain("no"),
                ],
            },
        );
    }

    #[test]
    fn deleting_across_mark_boundaries_restores_both_runs() {
        let doc = marked_doc();
        let schema = SchemaRegistry::new();
        let step = Step::DeleteText {
            block_id: "b1".into(),
            from: 0,
            to: 10,
            captured: vec![
                TextNode::new("bold", MarkSet::single(Mark::bold())),
                TextNode::plain("normal"),
            ],
        };
        let deleted = apply_step(&doc, &step, &schema).unwrap();
        assert_eq!(deleted.find_block(&"b1".into()).unwrap().text(), "");
        let restored =
            apply_step(&deleted, &step.invert(), &schema).unwrap();
        let children = restored
            .find_block(&"b1".into())
            .unwrap()
            .inline_children()
            .unwrap()
            .to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            InlineNode::text("bold", MarkSet::single(Mark::bold()))
        );
        assert_eq!(children[1], InlineNode::plain("normal"));
    }

    #[test]
    fn split_and_merge_round_trip() {
        let doc = marked_doc();
        let block = doc.find_block(&"b1".into()).unwrap().clone();
        roundtrips(&doc, &Step::split_block(&block, 4, "b2"));
    }

    #[test]
    fn merging_dissimilar_blocks_round_trips_the_source_type() {
        use crate::doc::{attrs_of, kinds, Children};

        // A heading absorbing a paragraph keeps the heading's type; the
        // inversion must resurrect the paragraph as a paragraph, not as
        // a second heading.
        let doc = Doc::new(vec![
            BlockNode::new(
                "h1",
                kinds::HEADING,
                attrs_of([("level", "1")]),
                Children::Inline(vec![InlineNode::plain("Title")]),
            ),
            BlockNode::paragraph("p1", vec![InlineNode::plain(" more")]),
        ]);
        let source = doc.find_block(&"p1".into()).unwrap().clone();
        let merge = Step::merge_blocks("h1", 5, &source);
        roundtrips(&doc, &merge);

        let schema = SchemaRegistry::new();
        let merged = apply_step(&doc, &merge, &schema).unwrap();
        let restored =
            apply_step(&merged, &merge.invert(), &schema).unwrap();
        let back = restored.find_block(&"p1".into()).unwrap();
        assert_eq!(back.kind(), kinds::PARAGRAPH);
        assert!(back.attrs().is_empty());
    }

    #[test]
    fn mark_steps_round_trip() {
        let doc = marked_doc();
        roundtrips(
            &doc,
            &Step::AddMark {
                block_id: "b1".into(),
                from: 4,
                to: 10,
                mark: Mark::italic(),
            },
        );
        roundtrips(
            &doc,
            &Step::RemoveMark {
                block_id: "b1".into(),
                from: 0,
                to: 4,
                target: MarkTarget::Exact(Mark::bold()),
            },
        );
    }

    #[test]
    fn structural_steps_round_trip() {
        let doc = marked_doc();
        roundtrips(
            &doc,
            &Step::InsertNode {
                parent_path: vec![],
                index: 1,
                node: BlockNode::paragraph(
                    "b9",
                    vec![InlineNode::plain("new")],
                ),
            },
        );
        roundtrips(
            &doc,
            &Step::SetNodeAttr {
                path: vec!["b1".into()],
                new_attrs: crate::doc::attrs_of([("textAlign", "center")]),
                old_attrs: Default::default(),
            },
        );
    }
}
