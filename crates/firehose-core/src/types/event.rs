//! 원본 포스트 이벤트.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 업스트림에서 받은 이벤트 객체.
///
/// 엔진은 `commit.record.text` 하나만 들여다보며 나머지 구조는 가정하지 않습니다.
/// 수신 후에는 불변이고, 소비자에게 전달되면 소유권이 넘어갑니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostEvent(Value);

impl PostEvent {
    /// JSON 문자열을 디코딩합니다.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    /// 이미 디코딩된 값으로 이벤트를 만듭니다.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// 포스트 본문.
    pub fn text(&self) -> Option<&str> {
        self.0.pointer("/commit/record/text")?.as_str()
    }

    /// 작성자 식별자.
    pub fn did(&self) -> Option<&str> {
        self.0.get("did")?.as_str()
    }

    /// 레코드 키.
    pub fn rkey(&self) -> Option<&str> {
        self.0.pointer("/commit/rkey")?.as_str()
    }

    /// 표시용 식별 키 (`did/rkey`).
    pub fn key(&self) -> Option<String> {
        Some(format!("{}/{}", self.did()?, self.rkey()?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fields_from_jetstream_commit() {
        let raw = json!({
            "did": "did:plc:abc",
            "kind": "commit",
            "commit": {
                "rkey": "3kxyz",
                "collection": "app.bsky.feed.post",
                "record": { "text": "hello octopus" }
            }
        })
        .to_string();

        let event = PostEvent::from_json(&raw).unwrap();

        assert_eq!(event.text(), Some("hello octopus"));
        assert_eq!(event.did(), Some("did:plc:abc"));
        assert_eq!(event.rkey(), Some("3kxyz"));
        assert_eq!(event.key().as_deref(), Some("did:plc:abc/3kxyz"));
    }

    #[test]
    fn test_event_without_text() {
        let event = PostEvent::from_json(r#"{"did":"did:plc:abc","kind":"identity"}"#).unwrap();

        assert_eq!(event.text(), None);
        assert_eq!(event.key(), None);
    }

    #[test]
    fn test_non_string_text_is_ignored() {
        let event = PostEvent::from_value(json!({ "commit": { "record": { "text": 42 } } }));
        assert_eq!(event.text(), None);
    }

    #[test]
    fn test_malformed_json() {
        assert!(PostEvent::from_json("{not json").is_err());
    }

    #[test]
    fn test_serializes_transparently() {
        let value = json!({ "did": "did:plc:x" });
        let event = PostEvent::from_value(value.clone());

        assert_eq!(serde_json::to_value(&event).unwrap(), value);
    }
}
