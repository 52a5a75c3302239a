//! View props - what the templates receive

use chrono::{DateTime, FixedOffset, Locale};
use chrono_tz::Tz;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{as_text, PostDetail, PostSummary};
use crate::helpers::{
    format_in_timezone, full_url_for, month_abbreviations, month_full_names, parse_locale,
    parse_timezone, post_path, strip_html, url_for,
};
use crate::listing::Listing;

const DESCRIPTION_CHARS: usize = 160;

/// A post entry in the listing
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
}

/// Everything the index page shows
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub posts: Vec<PostCard>,
    /// Present only when more posts can be loaded
    pub next_page: Option<String>,
    pub load_more_label: String,
    /// Localized `MMM` and `MMMM` names used by the page script
    pub month_names: Vec<String>,
    pub month_full_names: Vec<String>,
    /// Site timezone and date format, so runtime cards match the static ones
    pub time_zone: String,
    pub date_format: String,
    /// Prefix for runtime-built links (`/post/`)
    pub post_base: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockView {
    pub heading: Option<String>,
    /// Trusted markup, one entry per rich text fragment
    pub body: Vec<String>,
}

/// Everything the detail page shows
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub permalink: String,
    pub banner_url: Option<String>,
    pub banner_alt: String,
    pub title: String,
    /// Plain-text excerpt for the meta description
    pub description: String,
    pub date: Option<String>,
    pub author: String,
    pub reading_time: usize,
    pub blocks: Vec<BlockView>,
}

/// Detail page state while a path is generated on demand
#[derive(Debug, Clone)]
pub enum DetailPage {
    /// Still resolving; only a loading placeholder is shown
    Fallback,
    Resolved(Box<PostView>),
}

/// Maps content records into view props using the site settings
pub struct Presenter<'a> {
    config: &'a SiteConfig,
    locale: Locale,
    timezone: Option<Tz>,
}

impl<'a> Presenter<'a> {
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            locale: parse_locale(&config.locale_name()),
            timezone: parse_timezone(&config.timezone),
        }
    }

    /// Format a publication date; `None` stays `None`
    pub fn format_date(&self, date: Option<&DateTime<FixedOffset>>) -> Option<String> {
        date.map(|d| format_in_timezone(d, &self.config.date_format, self.locale, self.timezone))
    }

    /// A card for one summary; summaries without uid cannot be linked
    pub fn card(&self, summary: &PostSummary) -> Option<PostCard> {
        let uid = summary.uid.as_deref()?;
        Some(PostCard {
            uid: uid.to_string(),
            href: post_path(self.config, uid),
            title: summary.data.title.clone(),
            subtitle: summary.data.subtitle.clone(),
            author: summary.data.author.clone(),
            date: self.format_date(summary.first_publication_date.as_ref()),
        })
    }

    pub fn listing(&self, listing: &Listing) -> ListingView {
        let posts = listing
            .posts()
            .iter()
            .filter_map(|summary| {
                let card = self.card(summary);
                if card.is_none() {
                    tracing::warn!("Skipping post {} without uid", summary.id);
                }
                card
            })
            .collect();

        ListingView {
            posts,
            next_page: listing.next_page().map(str::to_string),
            load_more_label: self.config.labels.load_more.clone(),
            month_names: month_abbreviations(self.locale),
            month_full_names: month_full_names(self.locale),
            time_zone: self
                .timezone
                .map(|tz| tz.name().to_string())
                .unwrap_or_else(|| "UTC".to_string()),
            date_format: self.config.date_format.clone(),
            post_base: url_for(self.config, "post/"),
        }
    }

    pub fn post(&self, post: &PostDetail) -> PostView {
        let blocks = post
            .data
            .content
            .iter()
            .map(|block| BlockView {
                heading: block.heading.clone().filter(|h| !h.trim().is_empty()),
                body: block.body.iter().map(|f| f.to_html()).collect(),
            })
            .collect();

        PostView {
            uid: post.uid.clone().unwrap_or_default(),
            permalink: post
                .uid
                .as_deref()
                .map(|uid| full_url_for(self.config, &post_path(self.config, uid)))
                .unwrap_or_default(),
            banner_url: post.data.banner.url.clone(),
            banner_alt: post
                .data
                .banner
                .alt
                .clone()
                .unwrap_or_else(|| "banner".to_string()),
            title: post.data.title.clone(),
            description: excerpt(post, DESCRIPTION_CHARS),
            date: self.format_date(post.first_publication_date.as_ref()),
            author: post.data.author.clone(),
            reading_time: post.data.reading_time(self.config.words_per_minute),
            blocks,
        }
    }
}

/// First characters of the post's body text, whitespace collapsed
fn excerpt(post: &PostDetail, max_chars: usize) -> String {
    let text = post
        .data
        .content
        .iter()
        .map(|block| strip_html(&as_text(&block.body)))
        .collect::<Vec<_>>()
        .join(" ");
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let truncated: String = collapsed.chars().take(max_chars).collect();
        format!("{}...", truncated.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::post_json;
    use crate::content::PostPagination;
    use serde_json::json;

    fn config() -> SiteConfig {
        SiteConfig {
            timezone: "UTC".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_card() {
        let config = config();
        let presenter = Presenter::new(&config);
        let summary: PostSummary =
            serde_json::from_value(post_json("como-utilizar-hooks", "Como utilizar Hooks"))
                .unwrap();

        let card = presenter.card(&summary).unwrap();
        assert_eq!(card.href, "/post/como-utilizar-hooks/");
        assert_eq!(card.title, "Como utilizar Hooks");
        assert_eq!(card.author, "Joseph Oliveira");
        assert_eq!(card.date.as_deref(), Some("25 mar 2021"));
    }

    #[test]
    fn test_card_without_date_or_uid() {
        let config = config();
        let presenter = Presenter::new(&config);
        let summary: PostSummary = serde_json::from_value(json!({
            "id": "X",
            "uid": "draft",
            "type": "posts",
            "first_publication_date": null,
            "data": { "title": "Draft" }
        }))
        .unwrap();
        assert_eq!(presenter.card(&summary).unwrap().date, None);

        let anonymous: PostSummary = serde_json::from_value(json!({
            "id": "Y",
            "type": "posts",
            "data": { "title": "No uid" }
        }))
        .unwrap();
        assert!(presenter.card(&anonymous).is_none());
    }

    #[test]
    fn test_listing_view_cursor() {
        let config = config();
        let presenter = Presenter::new(&config);
        let first: PostSummary = serde_json::from_value(post_json("a", "A")).unwrap();

        let with_more = Listing::new(PostPagination {
            next_page: Some("https://x/page2".to_string()),
            results: vec![first.clone()],
        });
        let view = presenter.listing(&with_more);
        assert_eq!(view.posts.len(), 1);
        assert_eq!(view.next_page.as_deref(), Some("https://x/page2"));
        assert_eq!(view.month_names.len(), 12);
        assert_eq!(view.time_zone, "UTC");
        assert_eq!(view.date_format, "D MMM YYYY");

        let done = Listing::new(PostPagination {
            next_page: Some(String::new()),
            results: vec![first],
        });
        assert_eq!(presenter.listing(&done).next_page, None);
    }

    #[test]
    fn test_post_view() {
        let config = config();
        let presenter = Presenter::new(&config);
        let detail: PostDetail = serde_json::from_value(post_json("a", "A")).unwrap();

        let view = presenter.post(&detail);
        assert_eq!(view.reading_time, 1);
        assert_eq!(view.banner_url.as_deref(), Some("https://images.prismic.io/a.png"));
        assert_eq!(view.blocks.len(), 1);
        assert_eq!(view.blocks[0].heading.as_deref(), Some("Intro"));
        assert_eq!(view.blocks[0].body, vec!["a b c d".to_string()]);
        assert_eq!(view.description, "a b c d");
        assert_eq!(view.permalink, "http://localhost:4000/post/a/");
    }
}
