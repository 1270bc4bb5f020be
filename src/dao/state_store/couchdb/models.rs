use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every state document id.
pub const STATE_PREFIX: &str = "state::";

/// Wrapper document holding one state slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStateDocument {
    /// Document id, `state::<key>`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision to overwrite; absent for a new document.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// The stored state.
    #[serde(default)]
    pub value: Value,
}

impl CouchStateDocument {
    /// Wrap `value` as the document for `key`.
    pub fn new(key: &str, value: Value, rev: Option<String>) -> Self {
        Self {
            id: state_doc_id(key),
            rev,
            value,
        }
    }
}

/// Document id used for `key`.
pub fn state_doc_id(key: &str) -> String {
    format!("{STATE_PREFIX}{key}")
}
