//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator placed between documents in a context blob.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// A document as returned by the Data API.
///
/// Stored documents usually carry `_id`, `$vector` and `text`; older loads
/// used `content`. The raw JSON object is kept so nothing is lost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(pub Map<String, Value>);

impl Document {
    pub fn id(&self) -> Option<String> {
        self.0.get("_id").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Field names, in storage order.
    pub fn fields(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Text used as RAG context: a non-empty `text` string, else a non-empty
    /// `content` string, else the whole document serialized as JSON.
    pub fn context_text(&self) -> String {
        for key in ["text", "content"] {
            if let Some(Value::String(s)) = self.0.get(key) {
                if !s.is_empty() {
                    return s.clone();
                }
            }
        }
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Document(map),
            other => {
                let mut map = Map::new();
                map.insert("content".into(), other);
                Document(map)
            }
        }
    }
}

/// Joins the context text of every document with a blank line.
pub fn join_context(docs: &[Document]) -> String {
    docs.iter()
        .map(Document::context_text)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// One ingested chunk ready for `insertOne`.
#[derive(Clone, Debug, Serialize)]
pub struct ChunkRecord {
    #[serde(rename = "$vector")]
    pub vector: Vec<f32>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_text_then_content_then_json() {
        let d = Document::from(json!({"text": "A", "content": "B"}));
        assert_eq!(d.context_text(), "A");

        let d = Document::from(json!({"content": "B"}));
        assert_eq!(d.context_text(), "B");

        let d = Document::from(json!({"text": "", "content": "B"}));
        assert_eq!(d.context_text(), "B");

        let d = Document::from(json!({"_id": "1"}));
        assert_eq!(d.context_text(), r#"{"_id":"1"}"#);
    }

    #[test]
    fn non_string_text_falls_through() {
        let d = Document::from(json!({"text": 42}));
        assert_eq!(d.context_text(), r#"{"text":42}"#);
    }

    #[test]
    fn joins_with_blank_line() {
        let docs = vec![
            Document::from(json!({"text": "A"})),
            Document::from(json!({"content": "B"})),
        ];
        assert_eq!(join_context(&docs), "A\n\nB");
        assert_eq!(join_context(&[]), "");
    }

    #[test]
    fn chunk_record_uses_vector_key() {
        let r = ChunkRecord {
            vector: vec![0.5],
            text: "t".into(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"$vector": [0.5], "text": "t"})
        );
    }

    #[test]
    fn id_is_stringified() {
        assert_eq!(Document::from(json!({"_id": "x"})).id().as_deref(), Some("x"));
        assert_eq!(Document::from(json!({"_id": 7})).id().as_deref(), Some("7"));
        assert_eq!(Document::from(json!({})).id(), None);
    }
}
