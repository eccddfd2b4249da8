//! `action=query` page lookups.

use crate::base::neterror::NetError;
use crate::client::WikiClient;
use crate::wiki::{extract, validate_title};
use serde::Deserialize;

/// Most titles a single query may name (the API limit for non-bot users).
pub const MAX_TITLES_PER_QUERY: usize = 50;

/// A page as returned by a query, with its latest revision if it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub page_id: Option<u64>,
    pub namespace: Option<i64>,
    pub title: String,
    pub missing: bool,
    pub invalid: bool,
    pub invalid_reason: Option<String>,
    pub last_rev_id: Option<u64>,
    pub revision: Option<Revision>,
}

impl Page {
    /// Whether the page exists on the wiki.
    pub fn exists(&self) -> bool {
        !self.missing && !self.invalid
    }

    /// Wikitext of the latest revision, if it was returned.
    pub fn content(&self) -> Option<&str> {
        self.revision.as_ref()?.content.as_deref()
    }
}

/// One page revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub rev_id: u64,
    pub timestamp: String,
    pub content: Option<String>,
}

#[derive(Deserialize)]
struct RawPage {
    pageid: Option<u64>,
    ns: Option<i64>,
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    invalidreason: Option<String>,
    lastrevid: Option<u64>,
    #[serde(default)]
    revisions: Vec<RawRevision>,
}

#[derive(Deserialize)]
struct RawRevision {
    revid: u64,
    timestamp: String,
    slots: Option<RawSlots>,
}

#[derive(Deserialize)]
struct RawSlots {
    main: Option<RawSlot>,
}

#[derive(Deserialize)]
struct RawSlot {
    content: Option<String>,
}

impl From<RawPage> for Page {
    fn from(raw: RawPage) -> Self {
        let revision = raw.revisions.into_iter().next().map(|rev| Revision {
            rev_id: rev.revid,
            timestamp: rev.timestamp,
            content: rev.slots.and_then(|s| s.main).and_then(|m| m.content),
        });

        Page {
            page_id: raw.pageid,
            namespace: raw.ns,
            title: raw.title,
            missing: raw.missing,
            invalid: raw.invalid,
            invalid_reason: raw.invalidreason,
            last_rev_id: raw.lastrevid,
            revision,
        }
    }
}

impl WikiClient {
    /// Fetch one page with the content of its latest revision.
    ///
    /// A page that does not exist is returned with `missing` set rather
    /// than as an error. The returned title is the wiki's normalized form.
    pub async fn query_page(&self, title: &str) -> Result<Page, NetError> {
        self.query_pages(&[title])
            .await?
            .into_iter()
            .next()
            .ok_or(NetError::InvalidResponse)
    }

    /// Fetch up to [`MAX_TITLES_PER_QUERY`] pages in one request.
    ///
    /// Results follow the wiki's ordering, which need not match `titles`.
    pub async fn query_pages(&self, titles: &[&str]) -> Result<Vec<Page>, NetError> {
        if titles.is_empty() || titles.len() > MAX_TITLES_PER_QUERY {
            return Err(NetError::invalid_parameter(
                "titles",
                format!("expected 1 to {} titles, got {}", MAX_TITLES_PER_QUERY, titles.len()),
            ));
        }
        for title in titles {
            validate_title("titles", title)?;
        }

        let mut body = self
            .get([
                ("action", "query".to_string()),
                ("prop", "info|revisions".to_string()),
                ("rvprop", "ids|timestamp|content".to_string()),
                ("rvslots", "main".to_string()),
                ("titles", titles.join("|")),
            ])
            .await?;

        let pages: Vec<RawPage> = extract(&mut body, "/query/pages")?;
        Ok(pages.into_iter().map(Page::from).collect())
    }
}
