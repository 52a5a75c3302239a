//! In-memory `ContentApi` for tests

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{ClientError, ContentApi, QueryOptions};
use crate::content::{ApiPage, Document};

/// Serves documents from memory; next-page cursors look like `fake://<type>/<page>/<size>`
#[derive(Default)]
pub(crate) struct FakeApi {
    documents: Vec<Value>,
    pages: HashMap<String, Value>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a post document
    pub(crate) fn with_post(mut self, uid: &str, title: &str) -> Self {
        self.documents.push(post_json(uid, title));
        self
    }

    pub(crate) fn with_document(mut self, document: Value) -> Self {
        self.documents.push(document);
        self
    }

    /// Answer `url` with a fixed page body
    pub(crate) fn with_page(mut self, url: &str, page: Value) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Fail requests for `key` (a cursor URL or a uid)
    pub(crate) fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn page_of(&self, doc_type: &str, page: u32, page_size: u32) -> Value {
        let matching: Vec<&Value> = self
            .documents
            .iter()
            .filter(|d| d["type"] == doc_type)
            .collect();
        let size = page_size.max(1) as usize;
        let total_pages = matching.len().div_ceil(size) as u32;
        let start = (page.saturating_sub(1) as usize) * size;
        let results: Vec<&Value> = matching.iter().skip(start).take(size).copied().collect();
        let next_page = (page < total_pages)
            .then(|| format!("fake://{}/{}/{}", doc_type, page + 1, page_size));

        json!({
            "page": page,
            "results_per_page": page_size,
            "results_size": results.len(),
            "total_results_size": matching.len(),
            "total_pages": total_pages,
            "next_page": next_page,
            "prev_page": null,
            "results": results,
        })
    }

    fn failure(url: &str) -> ClientError {
        ClientError::Status {
            url: url.to_string(),
            status: 500,
            body: "fake failure".to_string(),
        }
    }
}

fn decode<R: DeserializeOwned>(url: &str, value: Value) -> Result<R, ClientError> {
    serde_json::from_value(value).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

/// A post document in API shape
pub(crate) fn post_json(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("ID-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2021-03-25T19:25:28+0000",
        "last_publication_date": "2021-03-25T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": format!("About {}", title),
            "author": "Joseph Oliveira",
            "banner": { "url": format!("https://images.prismic.io/{}.png", uid) },
            "content": [
                {
                    "heading": "Intro",
                    "body": [{ "type": "paragraph", "text": "a b c d", "spans": [] }]
                }
            ]
        }
    })
}

impl ContentApi for FakeApi {
    async fn get_by_type<T>(
        &self,
        doc_type: &str,
        options: &QueryOptions,
    ) -> Result<ApiPage<Document<T>>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let page = options.page.unwrap_or(1);
        let page_size = options.page_size.unwrap_or(20);
        let url = format!("fake://{}/{}/{}", doc_type, page, page_size);
        self.record(format!("type:{}", url));
        if self.failing.contains(doc_type) {
            return Err(Self::failure(&url));
        }
        decode(&url, self.page_of(doc_type, page, page_size))
    }

    async fn get_by_uid<T>(&self, doc_type: &str, uid: &str) -> Result<Document<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.record(format!("uid:{}", uid));
        if self.failing.contains(uid) {
            return Err(Self::failure(uid));
        }
        let document = self
            .documents
            .iter()
            .find(|d| d["type"] == doc_type && d["uid"] == uid)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })?;
        decode(uid, document)
    }

    async fn get_page<T>(&self, url: &str) -> Result<ApiPage<Document<T>>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        self.record(format!("page:{}", url));
        if self.failing.contains(url) {
            return Err(Self::failure(url));
        }
        if let Some(page) = self.pages.get(url) {
            return decode(url, page.clone());
        }

        let parts: Vec<&str> = url
            .strip_prefix("fake://")
            .map(|rest| rest.split('/').collect())
            .unwrap_or_default();
        match parts.as_slice() {
            [doc_type, page, size] => {
                let page = page.parse().unwrap_or(1);
                let size = size.parse().unwrap_or(20);
                decode(url, self.page_of(doc_type, page, size))
            }
            _ => Err(ClientError::InvalidUrl {
                url: url.to_string(),
                reason: "unknown fake url".to_string(),
            }),
        }
    }
}
