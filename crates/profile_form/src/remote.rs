//! HTTP client for the optional lookup backend.
//!
//! Endpoints:
//!   * `GET /{collection}` → `{ count, items, serverTimeMs }`
//!   * `GET /keys?pattern=` → `{ count, keys }`
//!   * `GET /key/{key}`    → `{ key, count, items }`
//!
//! Collection items are normalized at this boundary: strings are kept,
//! objects contribute their `name` field, anything else is skipped.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::Collection;
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionResponse {
    #[serde(default)]
    items: Value,
    #[serde(default)]
    server_time_ms: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct KeysResponse {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    #[serde(default)]
    items: Value,
}

/// Collection items plus timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedItems {
    pub items: Vec<String>,
    /// Client side round trip.
    pub fetch_time_ms: u64,
    /// Time the backend reported for its own lookup.
    pub server_time_ms: Option<u64>,
}

/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CollectionClient {
    http: Client,
    base: Url,
}

impl CollectionClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidBase {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidBase {
                url: base_url.to_string(),
                reason: "url cannot be a base".into(),
            });
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Normalized items of a collection. An empty list is an error so
    /// callers keep their fallback.
    pub async fn fetch_collection(&self, collection: Collection) -> Result<Vec<String>, FetchError> {
        Ok(self.fetch_collection_timed(collection).await?.items)
    }

    pub async fn fetch_collection_timed(
        &self,
        collection: Collection,
    ) -> Result<TimedItems, FetchError> {
        let url = self.endpoint(&[collection.as_ref()])?;
        let started = Instant::now();
        let body: CollectionResponse = self.get_json(url.clone()).await?;
        let fetch_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let raw = match body.items {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(FetchError::Malformed {
                    url: url.to_string(),
                    reason: format!("items is {}", kind_of(&other)),
                });
            }
        };
        let total = raw.len();
        let items = normalize_items(raw);
        if items.is_empty() {
            return Err(FetchError::Empty(collection.to_string()));
        }
        if items.len() < total {
            debug!(%collection, skipped = total - items.len(), "skipped unusable items");
        }
        let server_time_ms = body
            .server_time_ms
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| ms.round() as u64);
        info!(
            %collection,
            count = items.len(),
            fetch_time_ms,
            server_time_ms,
            "collection fetched"
        );
        Ok(TimedItems {
            items,
            fetch_time_ms,
            server_time_ms,
        })
    }

    /// Backend keys matching a glob pattern (`*` when `None`).
    pub async fn list_keys(&self, pattern: Option<&str>) -> Result<Vec<String>, FetchError> {
        let mut url = self.endpoint(&["keys"])?;
        url.query_pairs_mut()
            .append_pair("pattern", pattern.unwrap_or("*"));
        let body: KeysResponse = self.get_json(url).await?;
        Ok(body.keys)
    }

    /// Raw items stored under a key. Hash values come back as one object.
    pub async fn fetch_key(&self, key: &str) -> Result<Vec<Value>, FetchError> {
        let url = self.endpoint(&["key", key])?;
        let body: KeyResponse = self.get_json(url).await?;
        Ok(match body.items {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidBase {
                url: self.base.to_string(),
                reason: "url cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Strings as-is, objects by their string `name`, everything else dropped.
pub fn normalize_items(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Object(mut map) => match map.remove("name") {
                Some(Value::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn normalizes_strings_and_named_objects() {
        let items = vec![
            json!("Google"),
            json!({"name": "Stripe", "id": 7}),
            json!({"title": "nameless"}),
            json!({"name": 12}),
            json!(42),
            json!(null),
        ];
        assert_eq!(normalize_items(items), ["Google", "Stripe"]);
    }

    #[test]
    fn endpoints_join_onto_base_path() {
        let client = CollectionClient::new("http://localhost:8000", DEFAULT_TIMEOUT).expect("client");
        assert_eq!(
            client.endpoint(&["roles"]).expect("url").as_str(),
            "http://localhost:8000/roles"
        );
        let nested = CollectionClient::new("http://example.test/api/", DEFAULT_TIMEOUT).expect("client");
        assert_eq!(
            nested.endpoint(&["key", "a b/c"]).expect("url").as_str(),
            "http://example.test/api/key/a%20b%2Fc"
        );
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(
            CollectionClient::new("not a url", DEFAULT_TIMEOUT),
            Err(FetchError::InvalidBase { .. })
        ));
        assert!(matches!(
            CollectionClient::new("mailto:someone@example.test", DEFAULT_TIMEOUT),
            Err(FetchError::InvalidBase { .. })
        ));
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let body: CollectionResponse = serde_json::from_str(r#"{"count": 0}"#).expect("parse");
        assert_eq!(body.items, Value::Null);
        assert_eq!(body.server_time_ms, None);
        let body: CollectionResponse =
            serde_json::from_str(r#"{"items": ["a"], "serverTimeMs": 4}"#).expect("parse");
        assert_eq!(body.server_time_ms, Some(4.0));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let client = CollectionClient::new("http://127.0.0.1:9", Duration::from_millis(500)).expect("client");
        let err = client.fetch_collection(Collection::Roles).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "{err}");
    }
}
