//! JSON-over-HTTP page source.
//!
//! Speaks the list-endpoint dialect of the surrounding admin API: 1-based
//! `page`/`limit` query parameters, records under a collection key in the
//! response envelope (or a bare top-level array), and an optional
//! `pagination` block describing the total page count. Continuation tokens
//! carry the next page number.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::domain::{Page, PageToken};
use crate::source::{PageSource, SourceError};

/// Page source over a JSON list endpoint.
///
/// ```no_run
/// use pagefeed::RestSource;
/// use url::Url;
///
/// # #[derive(serde::Deserialize)] struct Product { id: String }
/// let endpoint = Url::parse("https://admin.example.com/api/products")?;
/// let source: RestSource<Product> = RestSource::new(endpoint)
///     .with_records_key("products")
///     .with_param("segment_id", "42");
/// # Ok::<(), url::ParseError>(())
/// ```
pub struct RestSource<R> {
    client: reqwest::Client,
    endpoint: Url,
    page_param: String,
    size_param: String,
    records_keys: Vec<String>,
    static_params: Vec<(String, String)>,
    _record: PhantomData<fn() -> R>,
}

impl<R> RestSource<R> {
    /// Creates a source for the given list endpoint with default parameter
    /// names (`page`, `limit`) and record keys (`data`, `items`, `records`).
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            page_param: "page".to_string(),
            size_param: "limit".to_string(),
            records_keys: vec![
                "data".to_string(),
                "items".to_string(),
                "records".to_string(),
            ],
            static_params: Vec::new(),
            _record: PhantomData,
        }
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies, headers).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Overrides the query parameter carrying the page number.
    pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    /// Overrides the query parameter carrying the page size.
    pub fn with_size_param(mut self, name: impl Into<String>) -> Self {
        self.size_param = name.into();
        self
    }

    /// Prepends a key to look the record array up under in the envelope.
    pub fn with_records_key(mut self, key: impl Into<String>) -> Self {
        self.records_keys.insert(0, key.into());
        self
    }

    /// Adds a fixed query parameter sent with every page request (filters).
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.static_params.push((name.into(), value.into()));
        self
    }
}

impl<R> RestSource<R>
where
    R: DeserializeOwned,
{
    /// Extracts a [`Page`] from a response body.
    ///
    /// End of collection is taken from `pagination.totalPages` when the
    /// envelope carries it, then from a `hasMore` flag, and otherwise from
    /// whether the page came back full.
    fn parse_page(
        &self,
        body: Value,
        page_number: usize,
        page_size: usize,
    ) -> Result<Page<R>, SourceError> {
        let array = match &body {
            Value::Array(records) => records.clone(),
            Value::Object(_) => self
                .records_keys
                .iter()
                .find_map(|key| match body.get(key) {
                    Some(Value::Array(records)) => Some(records.clone()),
                    _ => None,
                })
                .ok_or_else(|| {
                    SourceError::decode(format!(
                        "no record array under any of {:?}",
                        self.records_keys
                    ))
                })?,
            other => {
                return Err(SourceError::decode(format!(
                    "expected an object or array body, got {other}"
                )))
            }
        };

        let fetched = array.len();
        let records = array
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<R>, _>>()
            .map_err(SourceError::decode)?;

        let has_more = match body
            .get("pagination")
            .and_then(|p| p.get("totalPages"))
            .and_then(Value::as_u64)
        {
            Some(total_pages) => (page_number as u64) < total_pages,
            None => match body.get("hasMore").and_then(Value::as_bool) {
                Some(flag) => flag,
                // Full page heuristic: a short page is the last one.
                None => fetched == page_size,
            },
        };
        let next = has_more.then(|| PageToken::from_index(page_number + 1));

        Ok(Page::new(records, next))
    }
}

#[async_trait]
impl<R> PageSource for RestSource<R>
where
    R: DeserializeOwned + Send + Sync,
{
    type Record = R;

    async fn fetch_page(
        &self,
        token: Option<&PageToken>,
        page_size: usize,
    ) -> Result<Page<R>, SourceError> {
        let page_number = match token {
            Some(token) => token
                .index()
                .ok_or_else(|| SourceError::decode(format!("not a page token: {token}")))?,
            None => 1,
        };

        debug!(endpoint = %self.endpoint, page_number, page_size, "fetching page");

        let mut request = self.client.get(self.endpoint.clone()).query(&[
            (self.page_param.as_str(), page_number.to_string()),
            (self.size_param.as_str(), page_size.to_string()),
        ]);
        for (name, value) in &self.static_params {
            request = request.query(&[(name.as_str(), value.as_str())]);
        }

        let response = request.send().await.map_err(SourceError::transport)?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SourceError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body: Value = response.json().await.map_err(SourceError::decode)?;
        self.parse_page(body, page_number, page_size)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    struct Product {
        id: String,
        name: String,
    }

    fn source() -> RestSource<Product> {
        let endpoint = Url::parse("http://localhost/api/products").unwrap();
        RestSource::new(endpoint).with_records_key("products")
    }

    fn product(id: &str) -> Value {
        json!({ "id": id, "name": format!("Product {id}") })
    }

    #[test]
    fn parses_admin_envelope_with_total_pages() {
        let body = json!({
            "success": true,
            "products": [product("a"), product("b")],
            "pagination": { "page": 1, "limit": 2, "total": 3, "totalPages": 2 }
        });

        let page = source().parse_page(body, 1, 2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.records[0].id, "a");
        assert_eq!(page.next, Some(PageToken::from_index(2)));
    }

    #[test]
    fn last_page_by_total_pages() {
        let body = json!({
            "products": [product("c")],
            "pagination": { "page": 2, "limit": 2, "total": 3, "totalPages": 2 }
        });

        let page = source().parse_page(body, 2, 2).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn explicit_has_more_flag_wins_over_heuristic() {
        // A full page, but the server says there is nothing after it.
        let body = json!({ "data": [product("a"), product("b")], "hasMore": false });
        let page = source().parse_page(body, 1, 2).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn bare_array_uses_full_page_heuristic() {
        let body = json!([product("a"), product("b")]);
        let page = source().parse_page(body, 1, 2).unwrap();
        assert_eq!(page.next, Some(PageToken::from_index(2)));

        let body = json!([product("c")]);
        let page = source().parse_page(body, 2, 2).unwrap();
        assert!(page.is_last());
    }

    #[test]
    fn falls_back_through_record_keys() {
        let body = json!({ "items": [product("a")] });
        let page = source().parse_page(body, 1, 2).unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn missing_record_array_is_a_decode_error() {
        let body = json!({ "success": true });
        let err = source().parse_page(body, 1, 2).unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[test]
    fn malformed_record_is_a_decode_error() {
        let body = json!({ "products": [{ "id": 7 }] });
        let err = source().parse_page(body, 1, 2).unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
