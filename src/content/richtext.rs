//! Rich text fragments as delivered by the content API

use serde::{Deserialize, Serialize};

use super::document::null_as_default;

/// A block-level rich text node (paragraph, heading, list item, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichTextFragment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
}

/// Inline formatting over a character range of a fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

impl RichTextFragment {
    /// Plain paragraph without formatting
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    /// Render the fragment text as HTML.
    ///
    /// The text is trusted and emitted as-is (it may already carry markup);
    /// `strong`, `em` and `hyperlink` spans are applied on top.
    pub fn to_html(&self) -> String {
        let spans: Vec<&Span> = self
            .spans
            .iter()
            .filter(|s| s.start < s.end && open_tag(s).is_some())
            .collect();
        if spans.is_empty() {
            return self.text.clone();
        }

        // span offsets count UTF-16 code units
        let len = self.text.encode_utf16().count();
        let mut bounds: Vec<usize> = vec![0, len];
        for span in &spans {
            bounds.push(span.start.min(len));
            bounds.push(span.end.min(len));
        }
        bounds.sort_unstable();
        bounds.dedup();

        let mut html = String::with_capacity(self.text.len() * 2);
        for window in bounds.windows(2) {
            let (from, to) = (window[0], window[1]);
            let segment =
                &self.text[utf16_to_byte(&self.text, from)..utf16_to_byte(&self.text, to)];

            // Outermost first: earlier start, then longer range
            let mut covering: Vec<&&Span> = spans
                .iter()
                .filter(|s| s.start <= from && s.end >= to)
                .collect();
            covering.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

            for span in &covering {
                html.push_str(&open_tag(span).unwrap_or_default());
            }
            html.push_str(segment);
            for span in covering.iter().rev() {
                html.push_str(close_tag(span));
            }
        }
        html
    }
}

/// Byte offset of a UTF-16 offset, snapped back to a char boundary
fn utf16_to_byte(text: &str, offset: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units + ch.len_utf16() > offset {
            return index;
        }
        units += ch.len_utf16();
    }
    text.len()
}

fn open_tag(span: &Span) -> Option<String> {
    match span.kind.as_str() {
        "strong" => Some("<strong>".to_string()),
        "em" => Some("<em>".to_string()),
        "hyperlink" => {
            let data = span.data.as_ref()?;
            let url = data.url.as_deref()?;
            Some(match data.target.as_deref() {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    url, target
                ),
                None => format!(r#"<a href="{}">"#, url),
            })
        }
        _ => None,
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        _ => "</a>",
    }
}

/// Concatenate the text of all fragments, separated by a single space
pub fn as_text(fragments: &[RichTextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
