//! Content Client - queries against the headless content API
//!
//! Two lookups are exposed, "by type" (paged) and "by uid", plus a plain
//! fetch of the opaque next-page URL a paged result hands back.

mod error;
mod prismic;
#[cfg(test)]
pub(crate) mod testing;

use serde::de::DeserializeOwned;
use std::future::Future;

use crate::content::{ApiPage, Document};

pub use error::ClientError;
pub use prismic::PrismicClient;

/// Read access to a content repository
pub trait ContentApi: Sync {
    /// Documents of one custom type, one page at a time
    fn get_by_type<T>(
        &self,
        doc_type: &str,
        options: &QueryOptions,
    ) -> impl Future<Output = Result<ApiPage<Document<T>>, ClientError>> + Send
    where
        T: DeserializeOwned + Send;

    /// A single document by its unique identifier
    fn get_by_uid<T>(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> impl Future<Output = Result<Document<T>, ClientError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Follow a `next_page` URL from a previous result
    fn get_page<T>(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<ApiPage<Document<T>>, ClientError>> + Send
    where
        T: DeserializeOwned + Send;
}

/// Optional parameters of a by-type query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub orderings: Option<String>,
    pub lang: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn orderings(mut self, orderings: Option<String>) -> Self {
        self.orderings = orderings;
        self
    }

    pub fn lang(mut self, lang: Option<String>) -> Self {
        self.lang = lang;
        self
    }
}
