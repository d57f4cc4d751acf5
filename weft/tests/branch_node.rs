//! Integration tests for content-based branching inside a full workflow:
//! classification routes the run across different downstream paths.


use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use weft::llm::MockLlm;
use weft::nodes::DEFAULT_OUTPUT_VARIABLE;
use weft::{
    ClassDefinition, ConditionalBranchNode, Context, EndNode, Next, Node, StartNode, Workflow,
    WorkflowError,
};

/// Tags the context with the path it runs on.
struct PathNode {
    id: &'static str,
    tag: &'static str,
}

#[async_trait]
impl Node for PathNode {
    fn id(&self) -> &str {
        self.id
    }
    async fn run(&self, mut ctx: Context) -> Result<(Context, Next), WorkflowError> {
        ctx.insert("path", self.tag);
        Ok((ctx, Next::Node("end".into())))
    }
}

fn mood_classes() -> Vec<ClassDefinition> {
    vec![
        ClassDefinition::new("positive", "the message sounds upbeat", "cheer")
            .with_examples(["great day!", "this is wonderful"]),
        ClassDefinition::new("negative", "the message sounds unhappy", "console"),
    ]
}

fn branch_workflow(llm: Arc<MockLlm>, default: Option<ClassDefinition>) -> Workflow {
    let mut branch = ConditionalBranchNode::new(
        "classify",
        "Mood Classifier",
        mood_classes(),
        "user_input",
        llm,
    )
    .unwrap()
    .with_output_reason();
    if let Some(default) = default {
        branch = branch.with_default_class(default);
    }

    Workflow::new(vec![
        Arc::new(StartNode::new("start", "Start", ["user_input"])),
        Arc::new(branch),
        Arc::new(PathNode {
            id: "cheer",
            tag: "cheered",
        }),
        Arc::new(PathNode {
            id: "console",
            tag: "consoled",
        }),
        Arc::new(PathNode {
            id: "fallback",
            tag: "neutral",
        }),
        Arc::new(EndNode::new("end", "End", ["path"])),
    ])
    .unwrap()
}

/// **Scenario**: A reply naming class "positive" drives the run down the
/// cheer path; the classification object and reason land in the context.
#[tokio::test]
async fn classification_routes_to_matching_path() {
    let llm = Arc::new(MockLlm::fixed(
        r#"{"class_name": "positive", "confidence": 0.95, "reason": "sounds happy"}"#,
    ));
    let workflow = branch_workflow(llm, None);

    let out = workflow
        .run(Context::new().with("user_input", "what a great day"))
        .await
        .unwrap();

    assert_eq!(out.get_str("path"), Some("cheered"));
    let result = out.get(DEFAULT_OUTPUT_VARIABLE).unwrap();
    assert_eq!(result.get("class_name"), Some(&json!("positive")));
    assert_eq!(
        out.get_str("classification_result_reason"),
        Some("sounds happy")
    );
}

/// **Scenario**: An unknown class name with a default class routes to the
/// default's path.
#[tokio::test]
async fn unknown_class_takes_default_route() {
    let llm = Arc::new(MockLlm::fixed(r#"{"class_name": "confused"}"#));
    let workflow = branch_workflow(
        llm,
        Some(ClassDefinition::new("other", "anything else", "fallback")),
    );

    let out = workflow
        .run(Context::new().with("user_input", "hmm"))
        .await
        .unwrap();

    assert_eq!(out.get_str("path"), Some("neutral"));
}

/// **Scenario**: A model that fails entirely still completes the run through
/// the default class; no error surfaces to the caller.
#[tokio::test]
async fn model_failure_completes_through_default() {
    let llm = Arc::new(MockLlm::failing("connection reset"));
    let workflow = branch_workflow(
        llm,
        Some(ClassDefinition::new("other", "anything else", "fallback")),
    );

    let out = workflow
        .run(Context::new().with("user_input", "hello"))
        .await
        .unwrap();

    assert_eq!(out.get_str("path"), Some("neutral"));
    let result = out.get(DEFAULT_OUTPUT_VARIABLE).unwrap();
    assert_eq!(result.get("class_name"), Some(&json!("other")));
}

/// **Scenario**: A reply with prose around the JSON object still classifies;
/// the extractor tolerates surrounding noise.
#[tokio::test]
async fn noisy_reply_still_classifies() {
    let llm = Arc::new(MockLlm::fixed(
        r#"Sure — here is my verdict: {"class_name": "negative", "confidence": 0.8} Hope that helps."#,
    ));
    let workflow = branch_workflow(llm, None);

    let out = workflow
        .run(Context::new().with("user_input", "rough week"))
        .await
        .unwrap();

    assert_eq!(out.get_str("path"), Some("consoled"));
}

/// **Scenario**: The classification prompt enumerates every class with its
/// description and examples before the model is called.
#[tokio::test]
async fn prompt_contains_class_catalogue() {
    let llm = Arc::new(MockLlm::fixed(r#"{"class_name": "positive"}"#));
    let workflow = branch_workflow(llm.clone(), None);

    workflow
        .run(Context::new().with("user_input", "great"))
        .await
        .unwrap();

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("positive"));
    assert!(prompt.contains("the message sounds upbeat"));
    assert!(prompt.contains("\"great day!\""));
    assert!(prompt.contains("Input: great"));
}
