//! Captured and synthetic batched-RPC responses.

use serde_json::{json, Value};

/// A captured response with one search block of two links.
///
/// The embedded document carries a stray closing bracket, as real captures
/// sometimes do, so it only decodes through the bracket scan.
pub const SAMPLE_RESPONSE: &str = concat!(
    ")]}'\n\n32884\n",
    r#"[["wrb.fr","e3bVqc","[[[\"id\",[\"id2\",[\"лесоустройство факты, filetype:PDF\",1],1,[[[\"http://a.example/x.pdf\",\"Title A\",\"Desc A\",1],[\"https://b.example/y\",\"Title B\",\"Desc B\",1]]],\"Summary\"],2]]]]",null,null,null,"generic"]]"#,
    "\n56\n[[\"di\",313]]\n27\n",
);

/// Query carried by [`SAMPLE_RESPONSE`].
pub const SAMPLE_QUERY: &str = "лесоустройство факты, filetype:PDF";

/// URLs carried by [`SAMPLE_RESPONSE`], in order.
pub const SAMPLE_URLS: [&str; 2] = ["http://a.example/x.pdf", "https://b.example/y"];

/// A response whose only query is a blacklisted UI label.
#[must_use]
pub fn blacklist_response() -> String {
    ResponseBuilder::new()
        .search(
            "Подробный анализ",
            &[("https://a.example/1", "One", "First"), ("https://a.example/2", "Two", "")],
        )
        .build()
}

/// Builds response bodies in the batched-RPC envelope.
///
/// Each payload becomes one chunk `[["wrb.fr", rpc_id, "<escaped payload>", ...]]`
/// preceded by a decimal length line, after the anti-hijacking prefix.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    rpc_id: String,
    payloads: Vec<Value>,
    truncated_head: bool,
    trailer: bool,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rpc_id: "e3bVqc".to_string(),
            payloads: Vec::new(),
            truncated_head: false,
            trailer: true,
        }
    }

    /// Sets the RPC id written into every chunk.
    #[must_use]
    pub fn with_rpc_id(mut self, rpc_id: impl Into<String>) -> Self {
        self.rpc_id = rpc_id.into();
        self
    }

    /// Adds a raw inner payload.
    #[must_use]
    pub fn payload(mut self, payload: Value) -> Self {
        self.payloads.push(payload);
        self
    }

    /// Adds a payload with one query signature and its link list.
    ///
    /// Links are `(url, title, description)`.
    #[must_use]
    pub fn search(self, query: &str, links: &[(&str, &str, &str)]) -> Self {
        let payload = search_payload(query, links);
        self.payload(payload)
    }

    /// Starts the body with a chunk cut off mid-string.
    ///
    /// The whole-text strategy then fails and every chunk is read per line.
    #[must_use]
    pub fn with_truncated_head(mut self) -> Self {
        self.truncated_head = true;
        self
    }

    /// Omits the trailing `di` bookkeeping chunk.
    #[must_use]
    pub fn without_trailer(mut self) -> Self {
        self.trailer = false;
        self
    }

    /// Renders the response body.
    #[must_use]
    pub fn build(&self) -> String {
        let mut body = String::from(")]}'\n\n");
        if self.truncated_head {
            push_chunk(&mut body, r#"[["wrb.fr","cut"#);
        }
        for payload in &self.payloads {
            let chunk = json!([[
                "wrb.fr",
                self.rpc_id,
                payload.to_string(),
                null,
                null,
                null,
                "generic"
            ]]);
            push_chunk(&mut body, &chunk.to_string());
        }
        if self.trailer {
            push_chunk(&mut body, r#"[["di",313]]"#);
        }
        body.push_str("27\n");
        body
    }
}

/// The inner document shape of a search turn.
#[must_use]
pub fn search_payload(query: &str, links: &[(&str, &str, &str)]) -> Value {
    let entries: Vec<Value> = links
        .iter()
        .map(|(url, title, description)| json!([url, title, description, 1]))
        .collect();
    json!([[["turn", ["turn-2", [query, 1], 1, [entries], "Summary"], 2]]])
}

fn push_chunk(body: &mut String, chunk: &str) {
    body.push_str(&chunk.len().to_string());
    body.push('\n');
    body.push_str(chunk);
    body.push('\n');
}
