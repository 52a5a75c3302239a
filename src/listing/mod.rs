//! Listing page state - a paginated feed of post summaries
//!
//! The listing starts from one API page and grows through `load_more`,
//! which follows the cursor, appends what it receives and takes over the
//! new cursor. `load_more` needs `&mut self`, so a second request on the
//! same listing cannot start while one is in flight.

use anyhow::Result;
use std::collections::HashSet;

use crate::client::{ContentApi, QueryOptions};
use crate::content::{ApiPage, PostPagination, PostSummary, PostSummaryData};

/// Accumulated feed plus the next-page cursor
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pagination: PostPagination,
}

impl Listing {
    pub fn new(pagination: PostPagination) -> Self {
        Self { pagination }
    }

    /// Fetch the first page of `doc_type`
    pub async fn fetch<A: ContentApi>(
        api: &A,
        doc_type: &str,
        options: &QueryOptions,
    ) -> Result<Self> {
        let page: ApiPage<PostSummary> = api.get_by_type::<PostSummaryData>(doc_type, options).await?;
        tracing::debug!(
            "Fetched {} {} (page {} of {})",
            page.results.len(),
            doc_type,
            page.page,
            page.total_pages
        );
        Ok(Self::new(page.into()))
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.pagination.results
    }

    pub fn next_page(&self) -> Option<&str> {
        self.pagination.cursor()
    }

    /// Whether the "load more" control should be offered
    pub fn can_load_more(&self) -> bool {
        self.pagination.has_more()
    }

    /// Fetch the page behind the cursor and append it.
    ///
    /// Returns the number of summaries added. Without a cursor nothing is
    /// requested. On failure the listing is left as it was.
    pub async fn load_more<A: ContentApi>(&mut self, api: &A) -> Result<usize> {
        let Some(cursor) = self.pagination.cursor().map(str::to_string) else {
            return Ok(0);
        };

        let page: ApiPage<PostSummary> = api.get_page::<PostSummaryData>(&cursor).await?;
        let added = self.pagination.extend(page);
        tracing::debug!(
            "Loaded {} more posts ({} total, more: {})",
            added,
            self.pagination.results.len(),
            self.can_load_more()
        );
        Ok(added)
    }

    /// Follow the cursor until it runs out
    pub async fn load_all<A: ContentApi>(&mut self, api: &A) -> Result<()> {
        let mut visited = HashSet::new();
        while let Some(cursor) = self.next_page().map(str::to_string) {
            if !visited.insert(cursor.clone()) {
                anyhow::bail!("pagination cursor revisited ({})", cursor);
            }
            self.load_more(api).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{post_json, FakeApi};
    use serde_json::json;

    fn uids(listing: &Listing) -> Vec<String> {
        listing
            .posts()
            .iter()
            .filter_map(|p| p.uid.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_load_more_appends_and_drops_cursor() {
        let api = FakeApi::new().with_page(
            "https://x/page2",
            json!({ "next_page": null, "results": [post_json("second", "Second")] }),
        );
        let first: PostSummary = serde_json::from_value(post_json("first", "First")).unwrap();
        let mut listing = Listing::new(PostPagination {
            next_page: Some("https://x/page2".to_string()),
            results: vec![first],
        });
        assert!(listing.can_load_more());

        let added = listing.load_more(&api).await.unwrap();

        assert_eq!(added, 1);
        assert_eq!(uids(&listing), vec!["first", "second"]);
        assert!(!listing.can_load_more());
        assert_eq!(listing.next_page(), None);
    }

    #[tokio::test]
    async fn test_load_more_without_cursor_is_noop() {
        let api = FakeApi::new();
        let mut listing = Listing::new(PostPagination {
            next_page: None,
            results: Vec::new(),
        });

        assert_eq!(listing.load_more(&api).await.unwrap(), 0);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_load_more_preserves_order() {
        let api = FakeApi::new()
            .with_post("a", "A")
            .with_post("b", "B")
            .with_post("c", "C")
            .with_post("d", "D");
        let mut listing = Listing::fetch(&api, "posts", &QueryOptions::new().page_size(1))
            .await
            .unwrap();
        assert_eq!(uids(&listing), vec!["a"]);

        listing.load_more(&api).await.unwrap();
        assert_eq!(uids(&listing), vec!["a", "b"]);

        listing.load_more(&api).await.unwrap();
        listing.load_more(&api).await.unwrap();
        assert_eq!(uids(&listing), vec!["a", "b", "c", "d"]);
        assert!(!listing.can_load_more());

        assert_eq!(listing.load_more(&api).await.unwrap(), 0);
        assert_eq!(api.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_state() {
        let api = FakeApi::new()
            .with_post("a", "A")
            .with_post("b", "B")
            .failing("fake://posts/2/1");
        let mut listing = Listing::fetch(&api, "posts", &QueryOptions::new().page_size(1))
            .await
            .unwrap();

        assert!(listing.load_more(&api).await.is_err());
        assert_eq!(uids(&listing), vec!["a"]);
        assert_eq!(listing.next_page(), Some("fake://posts/2/1"));
    }

    #[tokio::test]
    async fn test_load_all() {
        let api = FakeApi::new()
            .with_post("a", "A")
            .with_post("b", "B")
            .with_post("c", "C");
        let mut listing = Listing::fetch(&api, "posts", &QueryOptions::new().page_size(2))
            .await
            .unwrap();

        listing.load_all(&api).await.unwrap();
        assert_eq!(uids(&listing), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_load_all_stops_on_stuck_cursor() {
        let api = FakeApi::new().with_page(
            "https://x/loop",
            json!({ "next_page": "https://x/loop", "results": [] }),
        );
        let mut listing = Listing::new(PostPagination {
            next_page: Some("https://x/loop".to_string()),
            results: Vec::new(),
        });

        assert!(listing.load_all(&api).await.is_err());
    }

    #[tokio::test]
    async fn test_load_all_stops_on_cursor_cycle() {
        let api = FakeApi::new()
            .with_page(
                "https://x/a",
                json!({ "next_page": "https://x/b", "results": [post_json("a", "A")] }),
            )
            .with_page(
                "https://x/b",
                json!({ "next_page": "https://x/a", "results": [post_json("b", "B")] }),
            );
        let mut listing = Listing::new(PostPagination {
            next_page: Some("https://x/a".to_string()),
            results: Vec::new(),
        });

        assert!(listing.load_all(&api).await.is_err());
        assert_eq!(api.calls().len(), 2);
        assert_eq!(uids(&listing), vec!["a", "b"]);
    }
}
