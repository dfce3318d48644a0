//! Per-request query parameters and body.

use std::fmt::Display;

use serde_json::Value;
use url::Url;

/// Optional query string and JSON body for a single request.
///
/// Both parts are sent regardless of the HTTP verb, so a `GET` or `DELETE`
/// may carry a body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Query parameters, in insertion order. `None` sends no query string.
    pub query: Option<Vec<(String, String)>>,
    /// JSON request body. `None` sends an empty body.
    pub send: Option<Value>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.query
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.to_string()));
        self
    }

    /// Appends every entry of a JSON object as query parameters.
    ///
    /// String values are sent as-is; other values use their JSON rendering.
    /// Non-object values are ignored.
    pub fn with_query_object(mut self, object: &Value) -> Self {
        if let Value::Object(map) = object {
            let query = self.query.get_or_insert_with(Vec::new);
            for (key, value) in map {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                query.push((key.clone(), value));
            }
        }
        self
    }

    /// Sets the JSON request body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.send = Some(body);
        self
    }

    /// Appends the query parameters to the given URL, returning the modified URL.
    pub fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if let Some(query) = &self.query {
            if !query.is_empty() {
                url.query_pairs_mut().extend_pairs(query);
            }
        }
        url
    }
}
