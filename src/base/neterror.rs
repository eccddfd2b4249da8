use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection aborted")]
    ConnectionAborted,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Socket not connected")]
    SocketNotConnected,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Connection timed out")]
    ConnectionTimedOut,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("Invalid HTTP response")]
    InvalidHttpResponse,

    // Body decoding
    #[error("Failed to read response body")]
    HttpBodyError,
    #[error("Response body is not valid UTF-8")]
    InvalidUtf8,
    #[error("Failed to parse JSON response")]
    JsonParseError,

    // Errors carrying context
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },
    #[error("API error [{code}]: {info}")]
    Api { code: String, info: String },
    #[error("Login failed ({result}): {reason}")]
    LoginFailed { result: String, reason: String },
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("Token missing from API response")]
    MissingToken,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    /// Create an API error from the `error` object of a response.
    pub fn api(code: impl Into<String>, info: impl Into<String>) -> Self {
        NetError::Api {
            code: code.into(),
            info: info.into(),
        }
    }

    /// Create a parameter validation error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        NetError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// The API error code, if this error came from the wiki itself.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            NetError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionAborted => -103,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::SslProtocolError => -107,
            NetError::SocketNotConnected => -112,
            NetError::ConnectionTimedOut => -118,

            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,
            NetError::InvalidResponse => -320,
            NetError::EmptyResponse => -324,
            NetError::InvalidHttpResponse => -370,

            // Client-side codes (custom range starting at -950)
            NetError::HttpBodyError => -950,
            NetError::InvalidUtf8 => -951,
            NetError::JsonParseError => -952,
            NetError::UrlParse(_) => -953,
            NetError::HttpStatus { .. } => -954,
            NetError::Api { .. } => -955,
            NetError::LoginFailed { .. } => -956,
            NetError::InvalidParameter { .. } => -957,
            NetError::MissingToken => -958,
            NetError::Unknown(code) => *code,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -103 => NetError::ConnectionAborted,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -112 => NetError::SocketNotConnected,
            -118 => NetError::ConnectionTimedOut,

            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,
            -320 => NetError::InvalidResponse,
            -324 => NetError::EmptyResponse,
            -370 => NetError::InvalidHttpResponse,

            -950 => NetError::HttpBodyError,
            -951 => NetError::InvalidUtf8,
            -952 => NetError::JsonParseError,
            -958 => NetError::MissingToken,
            _ => NetError::Unknown(code),
        }
    }
}
