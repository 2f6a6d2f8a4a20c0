//! Runtime and collection configuration.

use std::fmt;
use std::str::FromStr;

use crate::errors::RagError;

/// Similarity metric of the collection's vector index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SimilarityMetric {
    /// Dot product (the embeddings are normalized).
    #[default]
    DotProduct,
    /// Cosine similarity.
    Cosine,
    /// Euclidean distance (L2).
    Euclidean,
}

impl SimilarityMetric {
    /// Wire name used by `createCollection`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::DotProduct => "dot_product",
            SimilarityMetric::Cosine => "cosine",
            SimilarityMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMetric {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot_product" | "dot" => Ok(SimilarityMetric::DotProduct),
            "cosine" => Ok(SimilarityMetric::Cosine),
            "euclidean" | "l2" => Ok(SimilarityMetric::Euclidean),
            other => Err(RagError::Config(format!("unknown similarity metric: {other}"))),
        }
    }
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub dimension: usize,
    /// Similarity metric.
    pub metric: SimilarityMetric,
}

/// Connection settings for the Astra DB Data API.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Database API endpoint, e.g. `https://<id>-<region>.apps.astra.datastax.com`.
    pub api_endpoint: String,
    /// Application token sent in the `Token` header.
    pub token: String,
    /// Keyspace (namespace) holding the collection.
    pub namespace: String,
    /// Target collection name.
    pub collection: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Expected embedding dimension (collection creation and ingestion checks).
    pub embedding_dim: usize,
}

impl RagConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_EMBEDDING_DIM: usize = 768;

    /// Builds a config with default timeout and dimension.
    pub fn new(
        api_endpoint: impl Into<String>,
        token: impl Into<String>,
        namespace: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            token: token.into(),
            namespace: namespace.into(),
            collection: collection.into(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            embedding_dim: Self::DEFAULT_EMBEDDING_DIM,
        }
    }

    /// Reads `ASTRA_DB_*` and `EMBEDDING_DIM` from the process environment.
    pub fn from_env() -> Result<Self, RagError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`RagConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    /// `RagError::Config` naming the first missing or malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RagError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, RagError> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RagError::Config(format!("missing environment variable {name}")))
        };
        let number = |name: &str, default: u64| -> Result<u64, RagError> {
            match lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                None => Ok(default),
                Some(v) => v
                    .parse::<u64>()
                    .map_err(|_| RagError::Config(format!("{name} must be an unsigned integer"))),
            }
        };

        let cfg = Self {
            api_endpoint: required("ASTRA_DB_API_ENDPOINT")?,
            token: required("ASTRA_DB_APPLICATION_TOKEN")?,
            namespace: required("ASTRA_DB_NAMESPACE")?,
            collection: required("ASTRA_DB_COLLECTION")?,
            timeout_secs: number("ASTRA_DB_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?,
            embedding_dim: number("EMBEDDING_DIM", Self::DEFAULT_EMBEDDING_DIM as u64)? as usize,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        let endpoint = self.api_endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RagError::Config(
                "api_endpoint must start with http:// or https://".into(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(RagError::Config("token is empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(RagError::Config("namespace is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        if self.timeout_secs == 0 {
            return Err(RagError::Config("timeout_secs must be > 0".into()));
        }
        Ok(())
    }

    /// `{endpoint}/api/json/v1/{namespace}`: keyspace-level commands.
    pub fn keyspace_url(&self) -> String {
        format!(
            "{}/api/json/v1/{}",
            self.api_endpoint.trim().trim_end_matches('/'),
            self.namespace
        )
    }

    /// `{endpoint}/api/json/v1/{namespace}/{collection}`: collection-level commands.
    pub fn collection_url(&self) -> String {
        format!("{}/{}", self.keyspace_url(), self.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(k: &str) -> Option<String> {
        match k {
            "ASTRA_DB_API_ENDPOINT" => Some("https://db-1.apps.astra.datastax.com/".into()),
            "ASTRA_DB_APPLICATION_TOKEN" => Some("AstraCS:abc".into()),
            "ASTRA_DB_NAMESPACE" => Some("default_keyspace".into()),
            "ASTRA_DB_COLLECTION" => Some("portfolio".into()),
            _ => None,
        }
    }

    #[test]
    fn reads_required_vars_and_defaults() {
        let cfg = RagConfig::from_lookup(lookup).unwrap();
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.embedding_dim, 768);
        assert_eq!(
            cfg.collection_url(),
            "https://db-1.apps.astra.datastax.com/api/json/v1/default_keyspace/portfolio"
        );
    }

    #[test]
    fn missing_collection_is_reported() {
        let err = RagConfig::from_lookup(|k| {
            if k == "ASTRA_DB_COLLECTION" {
                None
            } else {
                lookup(k)
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("ASTRA_DB_COLLECTION"));
    }

    #[test]
    fn bad_dimension_is_rejected() {
        let err = RagConfig::from_lookup(|k| {
            if k == "EMBEDDING_DIM" {
                Some("wide".into())
            } else {
                lookup(k)
            }
        })
        .unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn metric_names() {
        assert_eq!("dot_product".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::DotProduct);
        assert_eq!("Cosine".parse::<SimilarityMetric>().unwrap(), SimilarityMetric::Cosine);
        assert!("manhattan".parse::<SimilarityMetric>().is_err());
        assert_eq!(SimilarityMetric::default().as_str(), "dot_product");
    }
}
