//! Integration tests for structured extraction: round-trips through noisy
//! text, deterministic failure handling, and the extractor node in a
//! pipeline.


use std::sync::Arc;

use serde_json::json;
use weft::{Context, JsonExtractor, JsonExtractorNode, Node, Value, Workflow, WorkflowError};

/// **Scenario**: For a serializable object O, extracting from
/// "noise" + serialize(O) + "more noise" returns a value equal to O.
#[test]
fn extraction_round_trips_serialized_objects() {
    let objects = [
        json!({"k": 1}),
        json!({"nested": {"deep": [1, 2, {"deeper": true}]}}),
        json!({"text": "with spaces and: punctuation", "n": -3.5, "none": null}),
    ];
    let extractor = JsonExtractor::new();

    for object in objects {
        let text = format!("some prose before {object} and trailing prose after");
        let extracted = extractor.extract(&text).unwrap();
        assert_eq!(extracted, object);
    }
}

/// **Scenario**: Extraction is idempotent under prefix/whitespace noise: the
/// same object embedded differently extracts to the same value.
#[test]
fn extraction_ignores_surrounding_noise() {
    let object = json!({"answer": 42});
    let extractor = JsonExtractor::new();

    let plain = extractor.extract(r#"{"answer": 42}"#).unwrap();
    let padded = extractor
        .extract("  \n\t lots of text first {\"answer\": 42}")
        .unwrap();
    let crowded = extractor
        .extract(r#"{"answer": 42} {"other": 1}"#)
        .unwrap();

    assert_eq!(plain, object);
    assert_eq!(padded, object);
    assert_eq!(crowded, object);
}

/// **Scenario**: Truncated input (missing final closing brace) fails
/// deterministically: the same error or the same default on every call.
#[test]
fn truncated_input_fails_the_same_way_every_time() {
    let truncated = r#"lead-in {"a": {"b": 1}"#;

    let raising = JsonExtractor::new();
    for _ in 0..3 {
        assert!(matches!(
            raising.extract(truncated),
            Err(WorkflowError::Extraction { .. })
        ));
    }

    let defaulting = JsonExtractor::new()
        .with_default(json!({"status": "failed"}))
        .with_raise_on_error(false);
    for _ in 0..3 {
        assert_eq!(
            defaulting.extract(truncated).unwrap(),
            json!({"status": "failed"})
        );
    }
}

/// **Scenario**: An extractor node in a pipeline turns an upstream text
/// variable into structured data for downstream nodes.
#[tokio::test]
async fn extractor_node_feeds_downstream_nodes() {
    let extract = JsonExtractorNode::new("extract", "Extract", "raw_reply", "scores")
        .with_schema(json!({
            "type": "object",
            "properties": {"quality": {"type": "number"}},
            "required": ["quality"]
        }));

    let workflow = Workflow::new(vec![Arc::new(extract) as Arc<dyn Node>]).unwrap();
    let initial = Context::new().with(
        "raw_reply",
        r#"My evaluation: {"quality": 0.8, "notes": "solid"} — done."#,
    );

    let out = workflow.run(initial).await.unwrap();

    assert_eq!(
        out.get("scores"),
        Some(&json!({"quality": 0.8, "notes": "solid"}))
    );
}

/// **Scenario**: Schema-invalid payloads abort a raising pipeline with an
/// Extraction error.
#[tokio::test]
async fn schema_mismatch_aborts_raising_pipeline() {
    let extract = JsonExtractorNode::new("extract", "Extract", "raw_reply", "scores")
        .with_schema(json!({
            "type": "object",
            "properties": {"quality": {"type": "number"}},
            "required": ["quality"]
        }));
    let workflow = Workflow::new(vec![Arc::new(extract) as Arc<dyn Node>]).unwrap();

    let err = workflow
        .run(Context::new().with("raw_reply", r#"{"notes": "missing quality"}"#))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Extraction { .. }));
}

/// **Scenario**: A null default is stored when extraction fails and no
/// default was configured on a non-raising extractor.
#[test]
fn lenient_extractor_defaults_to_null() {
    let value = JsonExtractor::new()
        .with_raise_on_error(false)
        .extract("nothing structured here")
        .unwrap();
    assert_eq!(value, Value::Null);
}
