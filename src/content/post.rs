//! Post models, reading time and the listing cursor

use serde::{Deserialize, Serialize};

use super::document::{null_as_default, ApiPage, Document};
use super::richtext::{as_text, RichTextFragment};
use crate::helpers::strip_html;

/// Reading speed used when none is configured
pub const WORDS_PER_MINUTE: usize = 200;

/// Fields shown for a post in the listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostSummaryData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
}

/// A post as it appears in the listing
pub type PostSummary = Document<PostSummaryData>;

/// Full post content for the detail page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub banner: Image,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Vec<ContentBlock>,
}

/// A post with everything needed to render it
pub type PostDetail = Document<PostData>;

/// Image field; an empty image comes back as `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One section of a post: an optional heading followed by rich text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RichTextFragment>,
}

impl PostData {
    /// Words across all headings
    pub fn heading_word_count(&self) -> usize {
        self.content
            .iter()
            .filter_map(|block| block.heading.as_deref())
            .map(count_words)
            .sum()
    }

    /// Words across all body fragments, markup excluded
    pub fn body_word_count(&self) -> usize {
        let body: Vec<RichTextFragment> = self
            .content
            .iter()
            .flat_map(|block| block.body.iter().cloned())
            .collect();
        count_words(&strip_html(&as_text(&body)))
    }

    pub fn word_count(&self) -> usize {
        self.heading_word_count() + self.body_word_count()
    }

    /// Estimated minutes to read the post
    pub fn reading_time(&self, words_per_minute: usize) -> usize {
        reading_time(self.word_count(), words_per_minute)
    }
}

/// Whitespace-separated tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `ceil(words / words_per_minute)`, never below one minute
pub fn reading_time(words: usize, words_per_minute: usize) -> usize {
    let wpm = if words_per_minute == 0 {
        WORDS_PER_MINUTE
    } else {
        words_per_minute
    };
    words.div_ceil(wpm).max(1)
}

/// Accumulated listing results plus the locator of the next page.
///
/// Results are only ever appended; existing entries keep their order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPagination {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostPagination {
    pub fn has_more(&self) -> bool {
        self.next_page
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }

    /// Cursor URL, if another page exists
    pub fn cursor(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Append a freshly fetched page and take over its cursor
    pub fn extend(&mut self, page: ApiPage<PostSummary>) -> usize {
        let added = page.results.len();
        self.results.extend(page.results);
        self.next_page = page.next_page;
        added
    }
}

impl From<ApiPage<PostSummary>> for PostPagination {
    fn from(page: ApiPage<PostSummary>) -> Self {
        Self {
            next_page: page.next_page,
            results: page.results,
        }
    }
}
