//! Rendering via `action=parse`.

use crate::base::neterror::NetError;
use crate::client::WikiClient;
use crate::wiki::{extract, validate_title};
use serde::Deserialize;

/// Rendered HTML plus the categories and links found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub title: String,
    pub page_id: Option<u64>,
    pub text: String,
    pub categories: Vec<String>,
    pub links: Vec<String>,
}

#[derive(Deserialize)]
struct RawParse {
    title: String,
    pageid: Option<u64>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    categories: Vec<RawCategory>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Deserialize)]
struct RawCategory {
    category: String,
}

#[derive(Deserialize)]
struct RawLink {
    title: String,
}

impl From<RawParse> for ParsedPage {
    fn from(raw: RawParse) -> Self {
        ParsedPage {
            title: raw.title,
            // Ad-hoc wikitext parses report page id 0.
            page_id: raw.pageid.filter(|id| *id != 0),
            text: raw.text,
            categories: raw.categories.into_iter().map(|c| c.category).collect(),
            links: raw.links.into_iter().map(|l| l.title).collect(),
        }
    }
}

const PARSE_PROPS: &str = "text|categories|links";

impl WikiClient {
    /// Render the current revision of an existing page.
    pub async fn parse_page(&self, title: &str) -> Result<ParsedPage, NetError> {
        validate_title("title", title)?;

        let mut body = self
            .get([
                ("action", "parse"),
                ("page", title),
                ("prop", PARSE_PROPS),
                ("redirects", "1"),
            ])
            .await?;

        let raw: RawParse = extract(&mut body, "/parse")?;
        Ok(raw.into())
    }

    /// Render arbitrary wikitext as if it were the content of `title`.
    ///
    /// Sent as a POST so large inputs do not hit URL length limits.
    pub async fn parse_wikitext(&self, wikitext: &str, title: &str) -> Result<ParsedPage, NetError> {
        validate_title("title", title)?;

        let mut body = self
            .post([
                ("action", "parse"),
                ("text", wikitext),
                ("title", title),
                ("contentmodel", "wikitext"),
                ("prop", PARSE_PROPS),
            ])
            .await?;

        let raw: RawParse = extract(&mut body, "/parse")?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_page_from_raw() {
        let raw: RawParse = serde_json::from_value(json!({
            "title": "Rust",
            "pageid": 42,
            "text": "<div class=\"mw-parser-output\"><p>Hi</p></div>",
            "categories": [{"sortkey": "", "category": "Languages", "hidden": false}],
            "links": [{"ns": 0, "title": "Mozilla", "exists": true}]
        }))
        .unwrap();

        let page = ParsedPage::from(raw);
        assert_eq!(page.page_id, Some(42));
        assert_eq!(page.categories, vec!["Languages"]);
        assert_eq!(page.links, vec!["Mozilla"]);
    }

    #[test]
    fn test_adhoc_parse_has_no_page_id() {
        let raw: RawParse =
            serde_json::from_value(json!({"title": "API", "pageid": 0, "text": "<p>x</p>"}))
                .unwrap();
        assert_eq!(ParsedPage::from(raw).page_id, None);
    }
}
