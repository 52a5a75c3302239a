//! Content module - documents, posts, rich text and pagination state

mod document;
mod post;
mod richtext;

pub use document::{parse_timestamp, ApiPage, Document};
pub use post::{
    count_words, reading_time, ContentBlock, Image, PostData, PostDetail, PostPagination,
    PostSummary, PostSummaryData, WORDS_PER_MINUTE,
};
pub use richtext::{as_text, RichTextFragment, Span, SpanData};
