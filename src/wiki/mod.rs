//! Typed wrappers over MediaWiki Action API modules.
//!
//! Each submodule adds methods to [`WikiClient`](crate::client::WikiClient)
//! for one family of API calls and defines the result types it returns.
//! Only the commonly used fields are mapped; the raw JSON of any call is
//! available through [`WikiClient::get`](crate::client::WikiClient::get) and
//! [`WikiClient::post`](crate::client::WikiClient::post).

pub mod auth;
pub mod edit;
pub mod parse;
pub mod query;
pub mod search;

pub use auth::LoginInfo;
pub use edit::{EditRequest, EditResult};
pub use parse::ParsedPage;
pub use query::{Page, Revision};
pub use search::SearchHit;

use crate::base::neterror::NetError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Move the value at `pointer` out of `body` and deserialize it.
pub(crate) fn extract<T: DeserializeOwned>(body: &mut Value, pointer: &str) -> Result<T, NetError> {
    let value = body.pointer_mut(pointer).map(Value::take).ok_or_else(|| {
        tracing::debug!(pointer, "API response missing expected field");
        NetError::InvalidResponse
    })?;

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(pointer, error = %e, "unexpected API response shape");
        NetError::InvalidResponse
    })
}

/// Reject empty values and values the API would split on `|`.
pub(crate) fn validate_title(name: &'static str, title: &str) -> Result<(), NetError> {
    if title.trim().is_empty() {
        return Err(NetError::invalid_parameter(name, "must not be empty"));
    }
    if title.contains('|') {
        return Err(NetError::invalid_parameter(name, "must not contain '|'"));
    }
    Ok(())
}
