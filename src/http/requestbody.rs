//! Request body for POST operations.

use bytes::Bytes;

/// Request body for HTTP methods that send data.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body (GET).
    #[default]
    Empty,
    /// Body with raw bytes.
    Bytes(Bytes),
    /// `application/x-www-form-urlencoded` fields, encoded when sent.
    Form(Vec<(String, String)>),
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl RequestBody {
    /// Build a form body from key/value pairs.
    pub fn form<K, V, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the length of the body in bytes, as sent on the wire.
    pub fn len(&self) -> usize {
        match self {
            RequestBody::Empty => 0,
            RequestBody::Bytes(b) => b.len(),
            RequestBody::Form(_) => self.encode_form().len(),
        }
    }

    /// The `Content-Type` this body needs, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            _ => None,
        }
    }

    /// Look up the first value of a form field.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match self {
            RequestBody::Form(fields) => fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Encode the body into the bytes sent on the wire.
    pub fn into_bytes(self) -> Bytes {
        match self {
            RequestBody::Empty => Bytes::new(),
            RequestBody::Bytes(b) => b,
            RequestBody::Form(_) => Bytes::from(self.encode_form()),
        }
    }

    fn encode_form(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let RequestBody::Form(fields) = self {
            serializer.extend_pairs(fields.iter());
        }
        serializer.finish()
    }
}
