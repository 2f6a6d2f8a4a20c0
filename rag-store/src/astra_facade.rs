//! Thin adapter around the Astra DB Data API to isolate wire details.
//!
//! Every Data API call is a `POST` of a single JSON command object:
//! - keyspace commands (`findCollections`, `createCollection`) go to
//!   `{endpoint}/api/json/v1/{namespace}`
//! - collection commands (`find`, `findOne`, `insertOne`) go to
//!   `{endpoint}/api/json/v1/{namespace}/{collection}`
//!
//! The API reports command failures as an `errors` array, frequently with
//! HTTP 200, so both the status and the body are checked.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{RagConfig, VectorSpace};
use crate::errors::{RagError, make_snippet};
use crate::record::{ChunkRecord, Document};

/// A facade over the Data API keeping the rest of the code free of JSON plumbing.
pub struct AstraFacade {
    client: reqwest::Client,
    keyspace_url: String,
    collection_url: String,
    pub(crate) collection: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorItem {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

impl AstraFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// # Errors
    /// `RagError::Config` for invalid settings or an unusable token header.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut headers = header::HeaderMap::new();
        let mut token = header::HeaderValue::from_str(cfg.token.trim())
            .map_err(|e| RagError::Config(format!("invalid token header: {e}")))?;
        token.set_sensitive(true);
        headers.insert("Token", token);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            keyspace_url: cfg.keyspace_url(),
            collection_url: cfg.collection_url(),
            collection: cfg.collection.clone(),
        })
    }

    /// Sends one command and returns the decoded body.
    async fn command(&self, url: &str, name: &'static str, body: Value) -> Result<Value, RagError> {
        let started = Instant::now();
        debug!(command = name, collection = %self.collection, "POST {url}");

        let resp = self.client.post(url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let snippet = make_snippet(&text);
            error!(
                command = name,
                %status,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Data API returned non-success status"
            );
            return Err(RagError::HttpStatus {
                status,
                url: url.to_string(),
                snippet,
            });
        }

        let value: Value = serde_json::from_str(&text)?;
        if let Some(errors) = value.get("errors").and_then(Value::as_array) {
            if let Some(first) = errors.first() {
                let item: ApiErrorItem = serde_json::from_value(first.clone())?;
                let code = item.error_code.unwrap_or_else(|| "UNKNOWN".into());
                warn!(
                    command = name,
                    code = %code,
                    message = %item.message,
                    "Data API command failed"
                );
                return Err(RagError::Api {
                    code,
                    message: item.message,
                });
            }
        }

        debug!(
            command = name,
            latency_ms = started.elapsed().as_millis(),
            "Data API command completed"
        );
        Ok(value)
    }

    /// `find` with an optional `$vector` sort.
    ///
    /// Without `sort_vector` the API returns documents in storage order.
    #[instrument(skip_all, fields(collection = %self.collection, limit = limit))]
    pub async fn find(
        &self,
        filter: Value,
        sort_vector: Option<&[f32]>,
        limit: usize,
    ) -> Result<Vec<Document>, RagError> {
        let mut find = json!({
            "filter": filter,
            "options": { "limit": limit },
        });
        if let Some(v) = sort_vector {
            find["sort"] = json!({ "$vector": v });
        }

        let out = self
            .command(&self.collection_url, "find", json!({ "find": find }))
            .await?;

        let docs = out
            .pointer("/data/documents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(docs.into_iter().map(Document::from).collect())
    }

    /// `findOne`; `Ok(None)` when the collection is empty or nothing matches.
    pub async fn find_one(&self, filter: Value) -> Result<Option<Document>, RagError> {
        let out = self
            .command(
                &self.collection_url,
                "findOne",
                json!({ "findOne": { "filter": filter } }),
            )
            .await?;

        Ok(out
            .pointer("/data/document")
            .filter(|v| v.is_object())
            .cloned()
            .map(Document::from))
    }

    /// `insertOne`; returns the generated `_id` when the API reports one.
    pub async fn insert_one(&self, record: &ChunkRecord) -> Result<Option<String>, RagError> {
        let out = self
            .command(
                &self.collection_url,
                "insertOne",
                json!({ "insertOne": { "document": record } }),
            )
            .await?;

        Ok(out
            .pointer("/status/insertedIds/0")
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
    }

    /// `findCollections`: names of the collections in the keyspace.
    pub async fn list_collections(&self) -> Result<Vec<String>, RagError> {
        let out = self
            .command(
                &self.keyspace_url,
                "findCollections",
                json!({ "findCollections": {} }),
            )
            .await?;

        Ok(out
            .pointer("/status/collections")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| match n {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// `createCollection` with a vector index.
    pub async fn create_collection(&self, space: &VectorSpace) -> Result<(), RagError> {
        self.command(
            &self.keyspace_url,
            "createCollection",
            json!({
                "createCollection": {
                    "name": self.collection,
                    "options": {
                        "vector": {
                            "dimension": space.dimension,
                            "metric": space.metric.as_str(),
                        }
                    }
                }
            }),
        )
        .await?;
        Ok(())
    }

    /// Ensures that the collection exists.
    ///
    /// - If the collection already exists → no-op, returns `false`.
    /// - If missing → creates it with the given vector space, returns `true`.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<bool, RagError> {
        info!(
            collection = %self.collection,
            dimension = space.dimension,
            metric = %space.metric,
            "ensuring collection"
        );

        if self.list_collections().await?.iter().any(|c| *c == self.collection) {
            debug!(collection = %self.collection, "collection already exists");
            return Ok(false);
        }

        self.create_collection(space).await?;
        info!(collection = %self.collection, "collection created");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimilarityMetric;
    use crate::errors::RagErrorKind;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COLLECTION_PATH: &str = "/api/json/v1/ks/portfolio";
    const KEYSPACE_PATH: &str = "/api/json/v1/ks";

    fn facade(server: &MockServer) -> AstraFacade {
        AstraFacade::new(&RagConfig::new(server.uri(), "AstraCS:t", "ks", "portfolio")).unwrap()
    }

    #[tokio::test]
    async fn find_sorts_by_vector_and_returns_documents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COLLECTION_PATH))
            .and(header("Token", "AstraCS:t"))
            .and(body_partial_json(json!({
                "find": {"sort": {"$vector": [0.5, 0.25]}, "options": {"limit": 5}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"documents": [{"_id": "1", "text": "A"}, {"_id": "2", "content": "B"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let docs = facade(&server).find(json!({}), Some(&[0.5, 0.25][..]), 5).await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].context_text(), "A");
        assert_eq!(docs[1].context_text(), "B");
    }

    #[tokio::test]
    async fn errors_array_with_200_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errors": [{"message": "Mismatched vector dimension", "errorCode": "VECTOR_SIZE_MISMATCH"}]
            })))
            .mount(&server)
            .await;

        let err = facade(&server).find(json!({}), Some(&[1.0][..]), 5).await.unwrap_err();
        assert_eq!(err.kind(), RagErrorKind::DimensionMismatch);
    }

    #[tokio::test]
    async fn http_401_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = facade(&server).find(json!({}), None, 3).await.unwrap_err();
        assert!(matches!(err, RagError::HttpStatus { .. }));
        assert_eq!(err.kind(), RagErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn find_one_handles_empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"findOne": {"filter": {}}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"document": null}
            })))
            .mount(&server)
            .await;

        assert!(facade(&server).find_one(json!({})).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_one_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "insertOne": {"document": {"$vector": [1.0], "text": "chunk"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"insertedIds": ["abc"]}
            })))
            .mount(&server)
            .await;

        let id = facade(&server)
            .insert_one(&ChunkRecord {
                vector: vec![1.0],
                text: "chunk".into(),
            })
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn ensure_collection_creates_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYSPACE_PATH))
            .and(body_partial_json(json!({"findCollections": {}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"collections": ["other"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(KEYSPACE_PATH))
            .and(body_partial_json(json!({
                "createCollection": {
                    "name": "portfolio",
                    "options": {"vector": {"dimension": 768, "metric": "dot_product"}}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": {"ok": 1}})))
            .expect(1)
            .mount(&server)
            .await;

        let created = facade(&server)
            .ensure_collection(&VectorSpace {
                dimension: 768,
                metric: SimilarityMetric::DotProduct,
            })
            .await
            .unwrap();
        assert!(created);
    }

    #[tokio::test]
    async fn ensure_collection_is_noop_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(KEYSPACE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": {"collections": ["portfolio"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = facade(&server)
            .ensure_collection(&VectorSpace {
                dimension: 768,
                metric: SimilarityMetric::DotProduct,
            })
            .await
            .unwrap();
        assert!(!created);
    }
}
