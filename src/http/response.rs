//! HTTP Response with a fully read body.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};

/// HTTP Response with accessible body.
///
/// API responses are small JSON documents, so transports read the whole
/// body before handing the response back.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            body: body.into(),
        }
    }

    /// Set the protocol version the response arrived with.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str, NetError> {
        std::str::from_utf8(&self.body).map_err(|_| NetError::InvalidUtf8)
    }

    /// Body deserialized from JSON.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        if self.body.is_empty() {
            return Err(NetError::EmptyResponse);
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::debug!(error = %e, "response body is not valid JSON");
            NetError::JsonParseError
        })
    }
}
