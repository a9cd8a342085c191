// Copyright 2026 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE in the repository root for full details.

use serde_json::json;

use crate::selection::Selection;
use crate::tests::testutils::{doc_of, editor_with, leaf_texts, para};

#[test]
fn json_round_trips_modulo_normalization() {
    let mut editor = editor_with(doc_of(vec![para("b1", "hello")]));
    let exported = editor.get_json();
    editor.set_json(exported.clone()).unwrap();
    assert_eq!(editor.get_json(), exported);
}

#[test]
fn set_json_normalizes_adjacent_runs() {
    let mut editor = editor_with(doc_of(vec![para("b1", "x")]));
    editor
        .set_json(json!([
            {
                "type": "paragraph",
                "id": "p1",
                "children": [
                    {"text": "ad"},
                    {"text": "jacent"},
                    {"text": ""},
                ],
            }
        ]))
        .unwrap();
    let state = editor.state();
    let children = state
        .block(&"p1".into())
        .unwrap()
        .inline_children()
        .unwrap()
        .to_vec();
    assert_eq!(children.len(), 1);
    assert_eq!(editor.get_text(), "adjacent");
}

#[test]
fn set_json_rejects_duplicate_ids() {
    let mut editor = editor_with(doc_of(vec![para("b1", "x")]));
    let result = editor.set_json(json!([
        {"type": "paragraph", "id": "p1", "children": []},
        {"type": "paragraph", "id": "p1", "children": []},
    ]));
    assert!(result.is_err());
    // The old document is untouched.
    assert_eq!(editor.get_text(), "x");
}

#[test]
fn replacing_the_document_clears_undo_history() {
    let mut editor = editor_with(doc_of(vec![para("b1", "start")]));
    editor.set_selection(Selection::caret("b1", 5));
    editor.insert_text("!");
    assert!(editor.can_undo());

    editor
        .set_json(json!([
            {"type": "paragraph", "id": "fresh", "children": [{"text": "new"}]},
        ]))
        .unwrap();
    assert!(!editor.can_undo());
    assert!(!editor.can_redo());
    assert_eq!(editor.get_text(), "new");
}

#[test]
fn nested_structures_survive_the_round_trip() {
    let json = json!([
        {
            "type": "table",
            "id": "t1",
            "children": [
                {
                    "type": "tableRow",
                    "id": "r1",
                    "children": [
                        {
                            "type": "tableCell",
                            "id": "c1",
                            "children": [
                                {
                                    "type": "paragraph",
                                    "id": "p1",
                                    "children": [
                                        {"text": "cell", "marks": [{"type": "bold"}]},
                                        {"type": "hardBreak"},
                                        {"text": "body"},
                                    ],
                                },
                            ],
                        },
                    ],
                },
            ],
        },
    ]);
    let mut editor = editor_with(doc_of(vec![para("b1", "x")]));
    editor.set_json(json.clone()).unwrap();
    assert_eq!(editor.get_json(), json);
    assert_eq!(leaf_texts(&editor.state()), ["cellbody"]);
}

#[test]
fn get_html_without_a_pipeline_is_an_explicit_error() {
    let editor = editor_with(doc_of(vec![para("b1", "x")]));
    assert!(matches!(
        editor.get_html(),
        Err(crate::error::EditorError::NoHtmlPipeline)
    ));
}
