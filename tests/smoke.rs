use sider_probe::config::{MODELS, ProbeConfig};
use sider_probe::llm::{ChatCompletionRequest, Message};
use sider_probe::Prober;
use tokio_test::assert_ok;

#[test]
fn probe_smoke_client_construction() {
    let prober = assert_ok!(Prober::new(ProbeConfig::default()));
    assert_eq!(prober.config().models, MODELS.to_vec());
}

#[test]
fn probe_smoke_request_serde_roundtrip() {
    let req = ChatCompletionRequest {
        messages: vec![Message::user("hello")],
        model: "gpt-test".to_string(),
        stream: false,
        temperature: 0.7,
    };

    let json = serde_json::to_string(&req).expect("serialize request");
    let parsed: ChatCompletionRequest = serde_json::from_str(&json).expect("deserialize request");
    assert_eq!(parsed.model, "gpt-test");
    assert_eq!(parsed.messages.len(), 1);
    assert_eq!(parsed.messages[0].role, "user");
    assert!(!parsed.stream);
}
