//! Prismic REST API v2 client

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{ClientError, ContentApi, QueryOptions};
use crate::config::ApiConfig;
use crate::content::{ApiPage, Document};

/// Repository metadata returned by the API root
#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    #[serde(default)]
    refs: Vec<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
struct RepositoryRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// HTTP client for a single content repository
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: Client,
    endpoint: String,
    access_token: Option<String>,
    master_ref: Arc<OnceCell<String>>,
}

impl PrismicClient {
    /// Create a client for `endpoint` (the repository's `/api/v2` root)
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, ClientError> {
        let endpoint = endpoint.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&endpoint).map_err(|e| ClientError::InvalidUrl {
            url: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ClientError::Request {
                url: endpoint.clone(),
                source,
            })?;

        Ok(Self {
            http,
            endpoint,
            access_token,
            master_ref: Arc::new(OnceCell::new()),
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, ClientError> {
        Self::new(&api.endpoint, api.access_token.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The published content version; looked up once per client
    async fn master_ref(&self) -> Result<String, ClientError> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut request = self.http.get(&self.endpoint);
                if let Some(token) = &self.access_token {
                    request = request.query(&[("access_token", token)]);
                }
                let info: RepositoryInfo = self.fetch_json(&self.endpoint, request).await?;
                let reference = info
                    .refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or_else(|| ClientError::NoMasterRef(self.endpoint.clone()))?;
                tracing::debug!("Resolved master ref {}", reference);
                Ok::<_, ClientError>(reference)
            })
            .await?;
        Ok(reference.clone())
    }

    async fn search<T>(
        &self,
        predicate: String,
        options: &QueryOptions,
    ) -> Result<ApiPage<Document<T>>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let master_ref = self.master_ref().await?;
        let url = format!("{}/documents/search", self.endpoint);

        tracing::debug!("Querying {} with {}", url, predicate);

        let mut params: Vec<(&str, String)> = vec![("ref", master_ref), ("q", predicate)];
        if let Some(page_size) = options.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(page) = options.page {
            params.push(("page", page.to_string()));
        }
        if let Some(orderings) = &options.orderings {
            params.push(("orderings", orderings.clone()));
        }
        if let Some(lang) = &options.lang {
            params.push(("lang", lang.clone()));
        }
        if let Some(token) = &self.access_token {
            params.push(("access_token", token.clone()));
        }

        let request = self.http.get(&url).query(&params);
        self.fetch_json(&url, request).await
    }

    async fn fetch_json<R>(&self, url: &str, request: RequestBuilder) -> Result<R, ClientError>
    where
        R: DeserializeOwned + Send,
    {
        let response = request.send().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(ClientError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| ClientError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl ContentApi for PrismicClient {
    async fn get_by_type<T>(
        &self,
        doc_type: &str,
        options: &QueryOptions,
    ) -> Result<ApiPage<Document<T>>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let predicate = format!(r#"[[at(document.type,"{}")]]"#, escape_quotes(doc_type));
        self.search(predicate, options).await
    }

    async fn get_by_uid<T>(&self, doc_type: &str, uid: &str) -> Result<Document<T>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let predicate = format!(
            r#"[[at(my.{}.uid,"{}")]]"#,
            doc_type,
            escape_quotes(uid)
        );
        let page: ApiPage<Document<T>> =
            self.search(predicate, &QueryOptions::new().page_size(1)).await?;

        page.results
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound {
                doc_type: doc_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn get_page<T>(&self, url: &str) -> Result<ApiPage<Document<T>>, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        reqwest::Url::parse(url).map_err(|e| ClientError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        tracing::debug!("Fetching next page {}", url);
        self.fetch_json(url, self.http.get(url)).await
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
