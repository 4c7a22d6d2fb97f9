use std::collections::HashSet;
use std::path::Path;

use pi_session::{
    create_pi_session_adapter, AdapterOptions, ContentBlock, TranscriptError, PI_AGENT_FORMAT,
};
use regex::Regex;
use serde_json::json;

fn id_pattern() -> Regex {
    Regex::new(r"^pi-\d+-[a-z0-9]+$").expect("id pattern should compile")
}

#[test]
fn factory_fixes_format_and_keeps_session_file_verbatim() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));

    assert_eq!(adapter.format(), "pi-agent");
    assert_eq!(adapter.format(), PI_AGENT_FORMAT);
    assert_eq!(adapter.session_file(), Path::new("/tmp/s.jsonl"));

    let relative = create_pi_session_adapter("sessions/../s 2.jsonl", AdapterOptions::new("s-2"));
    assert_eq!(relative.session_file(), Path::new("sessions/../s 2.jsonl"));
}

#[test]
fn metadata_reflects_options() {
    let adapter = create_pi_session_adapter(
        "/tmp/s.jsonl",
        AdapterOptions::new("s-1")
            .with_cwd("/home/dev/project")
            .with_agent_id("main"),
    );

    let metadata = adapter.metadata();
    assert_eq!(metadata.session_id, "s-1");
    assert_eq!(metadata.cwd.as_deref(), Some("/home/dev/project"));
    assert_eq!(metadata.agent_id.as_deref(), Some("main"));
    assert_eq!(metadata.runtime, "pi-agent");

    let bare = create_pi_session_adapter("/tmp/t.jsonl", AdapterOptions::new("s-2"));
    assert_eq!(bare.metadata().session_id, "s-2");
    assert_eq!(bare.metadata().cwd, None);
    assert_eq!(bare.metadata().agent_id, None);
}

#[tokio::test]
async fn concrete_scenario() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    assert_eq!(adapter.format(), "pi-agent");

    let id = adapter
        .append_user_message("hi")
        .await
        .expect("detached append should succeed");
    assert!(id_pattern().is_match(&id), "unexpected id {id}");

    let history = adapter
        .load_history()
        .await
        .expect("detached load should succeed");
    assert!(history.is_empty());
}

#[tokio::test]
async fn every_append_kind_returns_a_well_formed_id() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    let pattern = id_pattern();

    let ids = [
        adapter
            .append_user_message("hello")
            .await
            .expect("user append should succeed"),
        adapter
            .append_assistant_message(vec![ContentBlock::text("hi there")])
            .await
            .expect("assistant append should succeed"),
        adapter
            .append_tool_result("toolu_01", vec![ContentBlock::text("ok")])
            .await
            .expect("tool result append should succeed"),
    ];

    for id in &ids {
        assert!(pattern.is_match(id), "unexpected id {id}");
    }
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[tokio::test]
async fn thousand_consecutive_appends_yield_distinct_ids() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    let mut ids = HashSet::new();

    for index in 0..1000 {
        let id = adapter
            .append_user_message(format!("turn {index}"))
            .await
            .expect("detached append should succeed");
        assert!(ids.insert(id), "duplicate id at turn {index}");
    }

    assert_eq!(adapter.pending_len().await, 1000);
}

#[tokio::test]
async fn load_history_is_empty_regardless_of_prior_appends() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));

    for round in 0..3 {
        adapter
            .append_user_message(format!("question {round}"))
            .await
            .expect("user append should succeed");
        adapter
            .append_assistant_message(vec![ContentBlock::from_value(json!({
                "type": "thinking",
                "thinking": "hmm",
            }))])
            .await
            .expect("assistant append should succeed");

        let history = adapter
            .load_history()
            .await
            .expect("detached load should succeed");
        assert!(history.is_empty());
    }
}

#[tokio::test]
async fn flush_without_manager_always_succeeds() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    adapter
        .flush()
        .await
        .expect("flush on empty buffer should succeed");

    for index in 0..25 {
        adapter
            .append_tool_result(format!("call-{index}"), Vec::new())
            .await
            .expect("tool result append should succeed");
    }

    adapter.flush().await.expect("detached flush should succeed");
    adapter
        .flush()
        .await
        .expect("repeated detached flush should succeed");
    assert!(!adapter.is_attached().await);
}

#[tokio::test]
async fn close_is_idempotent_and_history_stays_empty() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    adapter
        .append_user_message("before close")
        .await
        .expect("append should succeed");

    adapter.close().await;
    assert!(adapter.is_closed().await);
    assert_eq!(adapter.pending_len().await, 0);
    assert!(adapter
        .load_history()
        .await
        .expect("load after close should succeed")
        .is_empty());

    adapter.close().await;
    assert!(adapter.is_closed().await);
}

#[tokio::test]
async fn calls_after_close_are_safe_no_ops() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));
    adapter.close().await;

    let id = adapter
        .append_user_message("late")
        .await
        .expect("append after close should not fail");
    assert!(id_pattern().is_match(&id), "unexpected id {id}");
    adapter
        .append_assistant_message(vec![ContentBlock::text("late reply")])
        .await
        .expect("assistant append after close should not fail");
    adapter
        .append_tool_result("call-1", vec![ContentBlock::text("late result")])
        .await
        .expect("tool result after close should not fail");
    adapter
        .flush()
        .await
        .expect("flush after close should not fail");

    assert_eq!(adapter.pending_len().await, 0);
    assert!(adapter
        .load_history()
        .await
        .expect("load after close should succeed")
        .is_empty());
}

#[tokio::test]
async fn malformed_input_is_rejected_before_recording() {
    let adapter = create_pi_session_adapter("/tmp/s.jsonl", AdapterOptions::new("s-1"));

    let error = adapter
        .append_assistant_message(Vec::new())
        .await
        .expect_err("empty assistant content must be rejected");
    assert!(matches!(
        error,
        TranscriptError::InvalidInput {
            operation: "append_assistant_message",
            ..
        }
    ));
    assert!(error.as_manager_error().is_none());

    let error = adapter
        .append_tool_result(String::new(), vec![ContentBlock::text("orphan")])
        .await
        .expect_err("empty tool call id must be rejected");
    assert!(matches!(
        error,
        TranscriptError::InvalidInput {
            operation: "append_tool_result",
            ..
        }
    ));

    assert_eq!(adapter.pending_len().await, 0);
}
