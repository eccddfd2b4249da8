//! Page edits via `action=edit`.

use crate::base::neterror::NetError;
use crate::client::WikiClient;
use crate::wiki::{extract, validate_title};
use serde::Deserialize;

/// A full-text replacement of one page.
///
/// ```
/// use wikinet::wiki::EditRequest;
///
/// let edit = EditRequest::new("Sandbox", "Hello")
///     .summary("test edit")
///     .minor(true);
/// assert_eq!(edit.title(), "Sandbox");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    title: String,
    text: String,
    summary: Option<String>,
    minor: bool,
    bot: bool,
    base_timestamp: Option<String>,
}

impl EditRequest {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            summary: None,
            minor: false,
            bot: false,
            base_timestamp: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn minor(mut self, minor: bool) -> Self {
        self.minor = minor;
        self
    }

    /// Mark the edit as a bot edit. Ignored unless the account has the
    /// `bot` right.
    pub fn bot(mut self, bot: bool) -> Self {
        self.bot = bot;
        self
    }

    /// Timestamp of the revision the new text was based on. The wiki
    /// reports an `editconflict` error if the page changed since.
    pub fn base_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.base_timestamp = Some(timestamp.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Form parameters for the request, token last.
    fn to_params(&self, token: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("action", "edit".to_string()),
            ("title", self.title.clone()),
            ("text", self.text.clone()),
        ];
        if let Some(summary) = &self.summary {
            params.push(("summary", summary.clone()));
        }
        if self.minor {
            params.push(("minor", "1".to_string()));
        }
        if self.bot {
            params.push(("bot", "1".to_string()));
        }
        if let Some(ts) = &self.base_timestamp {
            params.push(("basetimestamp", ts.clone()));
        }
        params.push(("token", token.to_string()));
        params
    }
}

/// Outcome of an edit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EditResult {
    pub result: String,
    #[serde(rename = "pageid")]
    pub page_id: Option<u64>,
    pub title: Option<String>,
    #[serde(rename = "oldrevid")]
    pub old_rev_id: Option<u64>,
    #[serde(rename = "newrevid")]
    pub new_rev_id: Option<u64>,
    #[serde(rename = "newtimestamp")]
    pub new_timestamp: Option<String>,
    /// The submitted text matched the current revision; nothing was saved.
    #[serde(rename = "nochange", default)]
    pub no_change: bool,
}

impl EditResult {
    pub fn is_success(&self) -> bool {
        self.result == "Success"
    }
}

impl WikiClient {
    /// Replace the text of a page, creating it if needed.
    ///
    /// Hard failures (protected page, edit conflict, bad token) come back
    /// as [`NetError::Api`]. A soft failure such as a CAPTCHA challenge is
    /// returned as an [`EditResult`] whose `result` is not `Success`.
    pub async fn edit(&self, request: &EditRequest) -> Result<EditResult, NetError> {
        validate_title("title", &request.title)?;

        let token = self.csrf_token().await?;
        let mut body = self.post(request.to_params(&token)).await?;

        let result: EditResult = extract(&mut body, "/edit")?;
        if result.is_success() {
            tracing::info!(
                title = ?result.title,
                new_rev_id = ?result.new_rev_id,
                no_change = result.no_change,
                "edit saved"
            );
        } else {
            tracing::warn!(title = %request.title, result = %result.result, "edit not saved");
        }
        Ok(result)
    }
}
