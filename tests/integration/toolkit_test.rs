// tests/integration/toolkit_test.rs

//! Integration tests for the mutation toolkit over an in-memory store
//! Tests: select, selectAll, selectField, rename, drop, modify, customModify

use super::test_helpers::{INSTRUMENT, TestContext, doc};
use instrument_json::core::toolkit::{DocumentSelection, FieldSelection};
use instrument_json::core::value::RecordMetadata;
use instrument_json::core::{
    ConditionSet, FieldValue, InMemoryStore, MutationToolkit, ToolkitError, TransformOp,
};
use serde_json::json;

fn scores() -> TestContext {
    TestContext::with_records(&[
        ("1", json!({"Score": "10", "Visit": "V1"})),
        ("2", json!({"Score": "20", "Visit": "V2"})),
        ("3", json!({"Visit": "V1"})),
    ])
}

#[test]
fn test_new_rejects_unknown_instrument() {
    let ctx = scores();
    let err = MutationToolkit::new(ctx.store.clone(), "missing_instrument")
        .err()
        .unwrap();
    assert_eq!(
        err,
        ToolkitError::UnknownInstrument("missing_instrument".into())
    );
}

// ===== Select Tests =====

#[test]
fn test_select_matching_condition() {
    let ctx = scores();
    let ids = ctx
        .toolkit()
        .select(&ConditionSet::new().with("Visit", "V1"))
        .unwrap();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_select_empty_conditions_returns_all() {
    let ctx = scores();
    let ids = ctx.toolkit().select(&ConditionSet::new()).unwrap();
    assert_eq!(ids, vec!["1", "2", "3"]);
}

#[test]
fn test_select_requires_every_condition() {
    let ctx = scores();
    let conditions = ConditionSet::new().with("Visit", "V1").with("Score", "10");
    assert_eq!(ctx.toolkit().select(&conditions).unwrap(), vec!["1"]);
}

#[test]
fn test_select_missing_field_never_matches() {
    let ctx = scores();
    let ids = ctx
        .toolkit()
        .select(&ConditionSet::new().with("Height", ""))
        .unwrap();
    assert!(ids.is_empty());
}

#[test]
fn test_select_compares_numbers_as_strings() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": 10})),
        ("2", json!({"Score": 10.5})),
        ("3", json!({"Score": "10.0"})),
    ]);
    let toolkit = ctx.toolkit();
    assert_eq!(
        toolkit
            .select(&ConditionSet::new().with("Score", "10"))
            .unwrap(),
        vec!["1"]
    );
    assert_eq!(
        toolkit
            .select(&ConditionSet::new().with("Score", "10.5"))
            .unwrap(),
        vec!["2"]
    );
}

#[test]
fn test_select_on_metadata_field() {
    let ctx = scores();
    ctx.insert_with_metadata(
        "4",
        json!({"Score": "5"}),
        RecordMetadata {
            examiner: Some("Dr. Who".into()),
            ..Default::default()
        },
    );
    let ids = ctx
        .toolkit()
        .select(&ConditionSet::new().with("Examiner", "Dr. Who"))
        .unwrap();
    assert_eq!(ids, vec!["4"]);
}

#[test]
fn test_select_all_returns_documents() {
    let ctx = scores();
    let records = ctx
        .toolkit()
        .select_all(&ConditionSet::new().with("Score", "20"))
        .unwrap();
    assert_eq!(
        records,
        vec![DocumentSelection {
            comment_id: "2".into(),
            document: doc(json!({"Score": "20", "Visit": "V2"})),
        }]
    );
}

#[test]
fn test_select_field_skips_records_without_field() {
    let ctx = scores();
    let records = ctx
        .toolkit()
        .select_field("Score", &ConditionSet::new().with("Visit", "V1"))
        .unwrap();
    assert_eq!(
        records,
        vec![FieldSelection {
            comment_id: "1".into(),
            value: FieldValue::from("10"),
        }]
    );
}

#[test]
fn test_selects_do_not_write() {
    let ctx = scores();
    let toolkit = ctx.toolkit();
    toolkit.select(&ConditionSet::new()).unwrap();
    toolkit.select_all(&ConditionSet::new()).unwrap();
    toolkit.select_field("Score", &ConditionSet::new()).unwrap();
    assert_eq!(ctx.store.write_count(), 0);
}

// ===== Rename Tests =====

#[test]
fn test_rename_counts_renamed_records() {
    let ctx = scores();
    let changed = ctx.toolkit().rename("Score", "Total").unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("1"), r#"{"Total":"10","Visit":"V1"}"#);
    assert_eq!(ctx.json("3"), r#"{"Visit":"V1"}"#);
}

#[test]
fn test_rename_keeps_field_position() {
    let ctx = TestContext::with_records(&[("1", json!({"a": "1", "b": "2", "c": "3"}))]);
    ctx.toolkit().rename("b", "z").unwrap();
    assert_eq!(ctx.json("1"), r#"{"a":"1","z":"2","c":"3"}"#);
}

#[test]
fn test_rename_skips_records_with_target_field() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10", "Total": "99"})),
        ("2", json!({"Score": "20"})),
    ]);
    let changed = ctx.toolkit().rename("Score", "Total").unwrap();
    assert_eq!(changed, 1);
    assert_eq!(ctx.json("1"), r#"{"Score":"10","Total":"99"}"#);
    assert_eq!(ctx.json("2"), r#"{"Total":"20"}"#);
}

#[test]
fn test_rename_missing_field_reports_zero() {
    let ctx = scores();
    assert_eq!(ctx.toolkit().rename("Height", "Tallness").unwrap(), 0);
    assert_eq!(ctx.store.write_count(), 0);
}

#[test]
fn test_rename_round_trip_restores_documents() {
    let ctx = scores();
    let before: Vec<_> = ["1", "2", "3"].iter().map(|id| ctx.json(id)).collect();
    let toolkit = ctx.toolkit();
    toolkit.rename("Score", "Total").unwrap();
    toolkit.rename("Total", "Score").unwrap();
    let after: Vec<_> = ["1", "2", "3"].iter().map(|id| ctx.json(id)).collect();
    assert_eq!(before, after);
}

#[test]
fn test_rename_rejects_metadata_fields() {
    let ctx = scores();
    let toolkit = ctx.toolkit();
    assert_eq!(
        toolkit.rename("Examiner", "Rater").unwrap_err(),
        ToolkitError::Metadata("Examiner".into())
    );
    assert_eq!(
        toolkit.rename("Score", "Date_taken").unwrap_err(),
        ToolkitError::Metadata("Date_taken".into())
    );
    assert_eq!(ctx.store.write_count(), 0);
}

// ===== Drop Tests =====

#[test]
fn test_drop_removes_field_and_keeps_others() {
    let ctx = scores();
    let changed = ctx.toolkit().drop("Score").unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("1"), r#"{"Visit":"V1"}"#);
    assert_eq!(ctx.json("2"), r#"{"Visit":"V2"}"#);
    assert_eq!(ctx.json("3"), r#"{"Visit":"V1"}"#);
}

#[test]
fn test_drop_missing_field_reports_zero() {
    let ctx = scores();
    assert_eq!(ctx.toolkit().drop("Height").unwrap(), 0);
}

#[test]
fn test_drop_metadata_field_is_rejected() {
    let ctx = TestContext::with_records(&[("1", json!({"Date_taken": "2020-01-01"}))]);
    let err = ctx.toolkit().drop("Date_taken").unwrap_err();
    assert_eq!(err, ToolkitError::Metadata("Date_taken".into()));
    assert_eq!(ctx.json("1"), r#"{"Date_taken":"2020-01-01"}"#);
}

#[test]
fn test_drop_leaves_metadata_untouched() {
    let ctx = TestContext::new();
    let metadata = RecordMetadata {
        date_taken: Some("2021-05-04".into()),
        candidate_age: Some("7.5".into()),
        ..Default::default()
    };
    ctx.insert_with_metadata("1", json!({"Score": "1"}), metadata.clone());
    ctx.toolkit().drop("Score").unwrap();
    let record = ctx.store.get(INSTRUMENT, "1").unwrap();
    assert_eq!(record.metadata, metadata);
}

// ===== Modify Tests =====

#[test]
fn test_modify_sets_value_where_conditions_hold() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .modify(
            "Score",
            &FieldValue::from("0"),
            &ConditionSet::new().with("Visit", "V2"),
            false,
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(ctx.json("1"), r#"{"Score":"10","Visit":"V1"}"#);
    assert_eq!(ctx.json("2"), r#"{"Score":"0","Visit":"V2"}"#);
}

#[test]
fn test_modify_does_not_count_already_equal_values() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10"})),
        ("2", json!({"Score": 10})),
        ("3", json!({"Score": "11"})),
    ]);
    let changed = ctx
        .toolkit()
        .modify("Score", &FieldValue::from("10"), &ConditionSet::new(), false)
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(ctx.store.write_count(), 1);
    assert_eq!(ctx.json("2"), r#"{"Score":10}"#);
    assert_eq!(ctx.json("3"), r#"{"Score":"10"}"#);
}

#[test]
fn test_modify_requires_existing_field_without_overrule() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .modify(
            "Score",
            &FieldValue::from("1"),
            &ConditionSet::new().with("Visit", "V1"),
            false,
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(ctx.json("3"), r#"{"Visit":"V1"}"#);
}

#[test]
fn test_modify_with_overrule_creates_missing_field() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .modify(
            "Score",
            &FieldValue::from("1"),
            &ConditionSet::new().with("Visit", "V1"),
            true,
        )
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("3"), r#"{"Visit":"V1","Score":"1"}"#);
}

#[test]
fn test_modify_rejects_metadata_field_even_with_overrule() {
    let ctx = scores();
    let err = ctx
        .toolkit()
        .modify(
            "Window_Difference",
            &FieldValue::from("3"),
            &ConditionSet::new(),
            true,
        )
        .unwrap_err();
    assert_eq!(err, ToolkitError::Metadata("Window_Difference".into()));
}

// ===== CustomModify Tests =====

#[test]
fn test_custom_modify_add_without_conditions() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10"})),
        ("2", json!({"Score": "20"})),
    ]);
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("5"), None, false)
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("1"), r#"{"Score":"15"}"#);
    assert_eq!(ctx.json("2"), r#"{"Score":"25"}"#);
}

#[test]
fn test_custom_modify_respects_conditions() {
    let ctx = scores();
    let conditions = ConditionSet::new().with("Visit", "V2");
    let changed = ctx
        .toolkit()
        .custom_modify(
            "Score",
            TransformOp::Multiply,
            &FieldValue::from("3"),
            Some(&conditions),
            false,
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(ctx.json("1"), r#"{"Score":"10","Visit":"V1"}"#);
    assert_eq!(ctx.json("2"), r#"{"Score":"60","Visit":"V2"}"#);
}

#[test]
fn test_custom_modify_keeps_number_representation() {
    let ctx = TestContext::with_records(&[("1", json!({"Weight": 10}))]);
    ctx.toolkit()
        .custom_modify("Weight", TransformOp::Divide, &FieldValue::from("4"), None, false)
        .unwrap();
    assert_eq!(ctx.json("1"), r#"{"Weight":2.5}"#);
}

#[test]
fn test_custom_modify_concat_stringifies_numbers() {
    let ctx = TestContext::with_records(&[("1", json!({"Code": 12})), ("2", json!({"Code": null}))]);
    let changed = ctx
        .toolkit()
        .custom_modify("Code", TransformOp::Concat, &FieldValue::from("_x"), None, false)
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("1"), r#"{"Code":"12_x"}"#);
    assert_eq!(ctx.json("2"), r#"{"Code":"_x"}"#);
}

#[test]
fn test_custom_modify_ignores_records_without_field() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("1"), None, false)
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("3"), r#"{"Visit":"V1"}"#);
}

#[test]
fn test_custom_modify_unchanged_values_are_not_counted() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Multiply, &FieldValue::from("1"), None, false)
        .unwrap();
    assert_eq!(changed, 0);
    assert_eq!(ctx.store.write_count(), 0);
}

#[test]
fn test_custom_modify_numerically_equal_result_is_not_a_change() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": 10.0})),
        ("2", json!({"Score": "10.0"})),
        ("3", json!({"Score": "7"})),
    ]);
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("0"), None, false)
        .unwrap();
    assert_eq!(changed, 0);
    assert_eq!(ctx.store.write_count(), 0);
    assert_eq!(ctx.json("1"), r#"{"Score":10.0}"#);
    assert_eq!(ctx.json("2"), r#"{"Score":"10.0"}"#);
}

#[test]
fn test_custom_modify_divide_by_zero_leaves_records_unchanged() {
    let ctx = scores();
    let err = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Divide, &FieldValue::from("0"), None, false)
        .unwrap_err();
    assert_eq!(err, ToolkitError::DivisionByZero);
    assert_eq!(ctx.json("1"), r#"{"Score":"10","Visit":"V1"}"#);
    assert_eq!(ctx.store.write_count(), 0);
}

#[test]
fn test_custom_modify_non_numeric_operand_fails() {
    let ctx = scores();
    let err = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("abc"), None, false)
        .unwrap_err();
    assert!(matches!(err, ToolkitError::InvalidOperand { .. }));
    assert_eq!(ctx.store.write_count(), 0);
}

#[test]
fn test_custom_modify_non_numeric_record_aborts_whole_batch() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10"})),
        ("2", json!({"Score": "n/a"})),
        ("3", json!({"Score": "30"})),
    ]);
    let err = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("1"), None, false)
        .unwrap_err();
    assert_eq!(
        err,
        ToolkitError::InvalidOperand {
            op: "addition".into(),
            value: "n/a".into(),
        }
    );
    // Nothing is written, not even the records planned before the failure.
    assert_eq!(ctx.store.write_count(), 0);
    assert_eq!(ctx.json("1"), r#"{"Score":"10"}"#);
    assert_eq!(ctx.json("3"), r#"{"Score":"30"}"#);
}

#[test]
fn test_custom_modify_overrule_skips_offending_records() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10"})),
        ("2", json!({"Score": "n/a"})),
        ("3", json!({"Score": "30"})),
    ]);
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Add, &FieldValue::from("1"), None, true)
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(ctx.json("1"), r#"{"Score":"11"}"#);
    assert_eq!(ctx.json("2"), r#"{"Score":"n/a"}"#);
    assert_eq!(ctx.json("3"), r#"{"Score":"31"}"#);
}

#[test]
fn test_custom_modify_overrule_divide_by_zero_changes_nothing() {
    let ctx = scores();
    let changed = ctx
        .toolkit()
        .custom_modify("Score", TransformOp::Divide, &FieldValue::from("0"), None, true)
        .unwrap();
    assert_eq!(changed, 0);
    assert_eq!(ctx.store.write_count(), 0);
}

#[test]
fn test_custom_modify_rejects_metadata_field() {
    let ctx = scores();
    let err = ctx
        .toolkit()
        .custom_modify(
            "Candidate_Age",
            TransformOp::Add,
            &FieldValue::from("1"),
            None,
            true,
        )
        .unwrap_err();
    assert_eq!(err, ToolkitError::Metadata("Candidate_Age".into()));
}

// ===== Status Field Tests =====

#[test]
fn test_status_field_detection() {
    let ctx = TestContext::with_records(&[
        ("1", json!({"Score": "10"})),
        ("2", json!({"Score": "20", "Score_status": "not_answered"})),
    ]);
    let toolkit = ctx.toolkit();
    assert!(toolkit.status_field_exists("Score").unwrap());
    assert!(!toolkit.status_field_exists("Visit").unwrap());
}

#[test]
fn test_toolkit_works_through_a_borrowed_store() {
    let store = InMemoryStore::new();
    store.insert(
        INSTRUMENT,
        instrument_json::core::Record::new("1", doc(json!({"Score": "1"}))),
    );
    let toolkit = MutationToolkit::new(&store, INSTRUMENT).unwrap();
    assert_eq!(toolkit.drop("Score").unwrap(), 1);
    assert!(store.get(INSTRUMENT, "1").unwrap().document.is_empty());
}
