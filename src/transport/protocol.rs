//! Rosbridge v2 JSON operations used by the transport.
//!
//! Only the subset the gateway needs: `advertise`/`unadvertise` and
//! `publish` outbound, `status` inbound.

use serde::{Deserialize, Serialize};

/// A rosbridge protocol frame, discriminated by its `op` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RosbridgeOp {
    /// Declare that this client will publish on `topic`.
    Advertise {
        /// Correlation ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Topic name.
        topic: String,
        /// Message type (e.g. `geometry_msgs/Twist`).
        #[serde(rename = "type")]
        msg_type: String,
    },
    /// Withdraw a previous advertisement.
    Unadvertise {
        /// Correlation ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Topic name.
        topic: String,
    },
    /// Publish one message on `topic`.
    Publish {
        /// Correlation ID.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Topic name.
        topic: String,
        /// Message body.
        msg: serde_json::Value,
    },
    /// Diagnostic reported by the bridge.
    Status {
        /// ID of the operation the status refers to, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// `info`, `warning`, `error` or `none`.
        level: String,
        /// Human-readable text.
        msg: String,
    },
}

impl RosbridgeOp {
    /// Builds an `advertise` frame.
    #[must_use]
    pub fn advertise(id: String, topic: &str, msg_type: &str) -> Self {
        Self::Advertise {
            id: Some(id),
            topic: topic.to_string(),
            msg_type: msg_type.to_string(),
        }
    }

    /// Builds a `publish` frame.
    #[must_use]
    pub fn publish(id: String, topic: &str, msg: serde_json::Value) -> Self {
        Self::Publish {
            id: Some(id),
            topic: topic.to_string(),
            msg,
        }
    }

    /// Encodes the frame as JSON text.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the message body cannot be encoded.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] for malformed JSON or an `op` this
    /// module does not model.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Builds a rosbridge-style correlation ID: `"{op}:{topic}:{seq}"`.
#[must_use]
pub fn op_id(op: &str, topic: &str, seq: u64) -> String {
    format!("{op}:{topic}:{seq}")
}
