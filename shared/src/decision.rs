//! Pre-send decision builder.
//!
//! Assembles the synchronous accept/reject/transform response from the
//! service configuration and the decoded request body. Malformed or
//! partially-shaped bodies never error: a missing path reads as absent
//! content and degrades to a pass-through decision with an empty payload.

use serde_json::Value;

use crate::config::ServiceConfig;
use crate::protocol::{DecisionPayload, PreSendDecision, DECISION_CODE, TEST_EXT_SENTINEL};
use crate::validator;

/// Build the decision for one pre-send callback.
pub fn build(config: &ServiceConfig, body: &Value) -> PreSendDecision {
    // Global kill switch short-circuits all content logic
    if !config.allow_message_send {
        return PreSendDecision::denied();
    }

    let content = message_content(body);
    let valid = validator::is_valid(content);

    let mut payload = DecisionPayload::default();
    if valid {
        if let Some(content) = content.filter(|c| !c.is_empty()) {
            // Only text messages are supported
            payload.msg_type = Some("txt");
            payload.msg_content = Some(content.to_string());

            if config.insert_test_ext && ext_flag(body) {
                payload.test = Some(TEST_EXT_SENTINEL);
            }
        }
    }

    PreSendDecision {
        valid,
        code: DECISION_CODE,
        payload,
    }
}

/// `payload.bodies[0].msg`, or None anywhere along the path.
fn message_content(body: &Value) -> Option<&str> {
    body.get("payload")
        .and_then(|p| p.get("bodies"))
        .and_then(|b| b.get(0))
        .and_then(|m| m.get("msg"))
        .and_then(Value::as_str)
}

/// Truthiness of `payload.ext`, matching the platform's loose semantics:
/// null, false, 0, and "" are falsy; everything else is truthy.
fn ext_flag(body: &Value) -> bool {
    body.get("payload")
        .and_then(|p| p.get("ext"))
        .map(is_truthy)
        .unwrap_or(false)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Service;
    use serde_json::json;

    fn pre_send_config() -> ServiceConfig {
        Service::PreSend.config()
    }

    #[test]
    fn test_kill_switch_denies_everything() {
        let mut config = pre_send_config();
        config.allow_message_send = false;

        for body in [
            json!({"payload": {"bodies": [{"msg": "hello"}]}}),
            json!({}),
            Value::Null,
        ] {
            let decision = build(&config, &body);
            assert_eq!(
                serde_json::to_value(&decision).unwrap(),
                json!({"valid": false, "code": "HX:10000", "payload": {}})
            );
        }
    }

    #[test]
    fn test_clean_content_passes_through() {
        let body = json!({"payload": {"bodies": [{"msg": "hello"}]}});
        let decision = build(&pre_send_config(), &body);
        assert_eq!(
            serde_json::to_value(&decision).unwrap(),
            json!({
                "valid": true,
                "code": "HX:10000",
                "payload": {"msg_type": "txt", "msg_content": "hello"}
            })
        );
    }

    #[test]
    fn test_denied_content_rejects_with_empty_payload() {
        let body = json!({"payload": {"bodies": [{"msg": "测试敏感词 content"}]}});
        let decision = build(&pre_send_config(), &body);
        assert!(!decision.valid);
        assert_eq!(
            serde_json::to_value(&decision.payload).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_absent_content_is_valid_with_empty_payload() {
        for body in [
            json!({}),
            json!({"payload": {}}),
            json!({"payload": {"bodies": []}}),
            json!({"payload": {"bodies": [{"msg": ""}]}}),
            json!({"payload": {"bodies": [{"msg": 42}]}}),
            Value::Null,
        ] {
            let decision = build(&pre_send_config(), &body);
            assert!(decision.valid, "body {body} should pass through");
            assert_eq!(decision.payload, DecisionPayload::default());
        }
    }

    #[test]
    fn test_ext_injects_sentinel() {
        let body = json!({"payload": {"bodies": [{"msg": "hi"}], "ext": true}});
        let decision = build(&pre_send_config(), &body);
        assert_eq!(decision.payload.test, Some(TEST_EXT_SENTINEL));
    }

    #[test]
    fn test_ext_absent_or_falsy_skips_sentinel() {
        for ext in [json!(false), json!(null), json!(0), json!("")] {
            let body = json!({"payload": {"bodies": [{"msg": "hi"}], "ext": ext}});
            assert_eq!(build(&pre_send_config(), &body).payload.test, None);
        }
        let body = json!({"payload": {"bodies": [{"msg": "hi"}]}});
        assert_eq!(build(&pre_send_config(), &body).payload.test, None);
    }

    #[test]
    fn test_ext_truthy_non_bool_values() {
        for ext in [json!(1), json!("yes"), json!({}), json!([])] {
            let body = json!({"payload": {"bodies": [{"msg": "hi"}], "ext": ext.clone()}});
            assert_eq!(
                build(&pre_send_config(), &body).payload.test,
                Some(TEST_EXT_SENTINEL),
                "ext {ext} should be truthy"
            );
        }
    }

    #[test]
    fn test_insert_test_ext_disabled_skips_sentinel() {
        let mut config = pre_send_config();
        config.insert_test_ext = false;
        let body = json!({"payload": {"bodies": [{"msg": "hi"}], "ext": true}});
        assert_eq!(build(&config, &body).payload.test, None);
    }

    #[test]
    fn test_content_echoed_byte_for_byte() {
        let content = "  mixed 内容 \t with whitespace ";
        let body = json!({"payload": {"bodies": [{"msg": content}]}});
        let decision = build(&pre_send_config(), &body);
        assert_eq!(decision.payload.msg_content.as_deref(), Some(content));
    }
}
