use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

use super::RequestGateway;
use crate::config::ClientConfig;
use crate::error::{DocQueryError, Result};
use crate::models::{Acknowledged, BulkResult, GetResult, SearchResult, WriteResult};
use crate::payload::{BulkPayload, DocumentRef, IndexPayload, UpdatePayload};
use crate::query::CompiledSearch;
use crate::schema::TableDefinition;

const NDJSON: &str = "application/x-ndjson";

/// Gateway speaking the engine's REST API over HTTP
///
/// Requests rotate round-robin across the configured hosts. Failures are
/// returned as-is; this gateway never retries.
pub struct HttpGateway {
    http: reqwest::Client,
    base_urls: Vec<Url>,
    credentials: Option<(String, String)>,
    cursor: AtomicUsize,
}

impl HttpGateway {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_urls = config
            .base_urls()
            .iter()
            .map(|u| {
                Url::parse(u)
                    .map_err(|e| DocQueryError::Config(format!("invalid host '{}': {}", u, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| DocQueryError::Config(format!("failed to build HTTP client: {}", e)))?;

        let credentials = config
            .basic_auth()
            .map(|(user, pass)| (user.to_string(), pass.to_string()));

        Ok(Self {
            http,
            base_urls,
            credentials,
            cursor: AtomicUsize::new(0),
        })
    }

    /// URL on the next host with the given path segments (percent-encoded)
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.base_urls.len();
        let mut url = self.base_urls[slot].clone();
        url.path_segments_mut()
            .map_err(|_| DocQueryError::Config("host cannot be used as a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(method = %method, url = %url, "engine request");
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }

    /// Send and decode; a 404 maps to `NotFound` when the call addresses a document
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        document: Option<&DocumentRef>,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            if let Some(doc) = document {
                return Err(DocQueryError::NotFound {
                    table: doc.table.clone(),
                    id: doc.id.clone(),
                });
            }
        }

        let bytes = response.bytes().await?;
        trace!(status = status.as_u16(), len = bytes.len(), "engine response");

        if !status.is_success() {
            return Err(DocQueryError::Transport {
                status: Some(status.as_u16()),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn create_index(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        let url = self.url(&[table])?;
        let request = self.request(Method::PUT, url).json(&definition.create_body());
        self.send(request, None).await
    }

    async fn update_mapping(
        &self,
        table: &str,
        definition: &TableDefinition,
    ) -> Result<Acknowledged> {
        let url = self.url(&[table, "_mapping"])?;
        let request = self.request(Method::PUT, url).json(&definition.mapping_body());
        self.send(request, None).await
    }

    async fn get_mapping(&self, tables: &[String]) -> Result<Value> {
        let url = if tables.is_empty() {
            self.url(&["_mapping"])?
        } else {
            let joined = tables.join(",");
            self.url(&[joined.as_str(), "_mapping"])?
        };
        self.send(self.request(Method::GET, url), None).await
    }

    async fn index_document(&self, payload: &IndexPayload) -> Result<WriteResult> {
        let table = payload.table.as_str();
        let request = match &payload.id {
            Some(id) => self.request(Method::PUT, self.url(&[table, "_doc", id.as_str()])?),
            None => self.request(Method::POST, self.url(&[table, "_doc"])?),
        };
        self.send(request.json(&payload.body), None).await
    }

    async fn bulk(&self, payload: &BulkPayload) -> Result<BulkResult> {
        let body = payload.to_ndjson()?;
        let request = self
            .request(Method::POST, self.url(&["_bulk"])?)
            .header(reqwest::header::CONTENT_TYPE, NDJSON)
            .body(body);
        self.send(request, None).await
    }

    async fn get(&self, document: &DocumentRef) -> Result<GetResult> {
        let url = self.url(&[document.table.as_str(), "_doc", document.id.as_str()])?;
        self.send(self.request(Method::GET, url), Some(document)).await
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<WriteResult> {
        let url = self.url(&[payload.table.as_str(), "_update", payload.id.as_str()])?;
        let request = self.request(Method::POST, url).json(&payload.body);
        let document = DocumentRef {
            table: payload.table.clone(),
            id: payload.id.clone(),
        };
        self.send(request, Some(&document)).await
    }

    async fn delete(&self, document: &DocumentRef) -> Result<WriteResult> {
        let url = self.url(&[document.table.as_str(), "_doc", document.id.as_str()])?;
        self.send(self.request(Method::DELETE, url), Some(document)).await
    }

    async fn search(&self, search: &CompiledSearch) -> Result<SearchResult> {
        let url = self.url(&[search.table.as_str(), "_search"])?;
        let request = self.request(Method::POST, url).json(&search.body);
        self.send(request, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_hosts() {
        let config = ClientConfig::new(Vec::<String>::new());
        assert!(matches!(
            HttpGateway::new(&config),
            Err(DocQueryError::Config(_))
        ));
    }

    #[test]
    fn test_urls_rotate_and_encode() {
        let config = ClientConfig::new(["127.0.0.1:9201", "https://node-b:9200/"]);
        let gateway = HttpGateway::new(&config).unwrap();

        let first = gateway.url(&["my index", "_doc", "a/b"]).unwrap();
        assert_eq!(first.as_str(), "http://127.0.0.1:9201/my%20index/_doc/a%2Fb");

        let second = gateway.url(&["_bulk"]).unwrap();
        assert_eq!(second.as_str(), "https://node-b:9200/_bulk");

        let third = gateway.url(&["t1,t2", "_mapping"]).unwrap();
        assert_eq!(third.as_str(), "http://127.0.0.1:9201/t1,t2/_mapping");
    }
}
