//! Wire types for the webhook responses.

use serde::Serialize;

/// Maximum accepted JSON body size (5 MB)
pub const MAX_JSON_BODY: usize = 5 * 1024 * 1024;

/// Schema version reported to the calling platform. Constant by design;
/// it does not vary with the decision outcome.
pub const DECISION_CODE: &str = "HX:10000";

/// Sentinel injected as `payload.test` when ext handling is enabled.
pub const TEST_EXT_SENTINEL: &str = "尝试插入一个ext";

/// Synchronous accept/reject/transform decision for the pre-send route.
///
/// Rejection travels in `valid`, never in the HTTP status line: the
/// platform treats any non-200 as a failed webhook call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreSendDecision {
    pub valid: bool,
    pub code: &'static str,
    pub payload: DecisionPayload,
}

impl PreSendDecision {
    /// Denial with an empty payload, used for the kill switch and for
    /// content that failed validation.
    pub fn denied() -> Self {
        PreSendDecision {
            valid: false,
            code: DECISION_CODE,
            payload: DecisionPayload::default(),
        }
    }
}

/// Rewritten message carried back on an accepted decision.
///
/// All fields are omitted from the JSON when unset, so an empty payload
/// serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DecisionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<&'static str>,
}

/// Constant acknowledgement for the post-send route.
#[derive(Debug, Clone, Serialize)]
pub struct PostSendAck {
    pub code: u32,
    pub message: &'static str,
    pub data: AckData,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckData {
    pub processed: bool,
}

impl Default for PostSendAck {
    fn default() -> Self {
        PostSendAck {
            code: 0,
            message: "Received",
            data: AckData { processed: true },
        }
    }
}
