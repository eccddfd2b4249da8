use crate::cookies::parsed_cookie::{parse_cookie_date, ParsedCookie};
use time::OffsetDateTime;

/// Represents a stored cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
    /// Stored verbatim; a server-side client has no cross-site context to enforce it in.
    pub same_site: Option<String>,
    pub host_only: bool,
    pub creation_time: OffsetDateTime,
}

/// Identity of a stored cookie. At most one cookie exists per key.
///
/// The domain is held in ASCII lowercase, matching how hosts are compared
/// when cookies are sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CookieKey {
    pub name: String,
    pub domain: String,
    pub path: String,
}

impl CanonicalCookie {
    /// Session cookie scoped to exactly `domain`, path `/`.
    pub fn new(name: String, value: String, domain: String, creation_time: OffsetDateTime) -> Self {
        Self {
            name,
            value,
            domain,
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
            host_only: true,
            creation_time,
        }
    }

    /// Build a cookie from one `Set-Cookie` header value.
    ///
    /// Never fails: unparseable `Expires` values and unknown attributes are
    /// skipped. Without a `Domain` attribute the cookie is host-only and
    /// scoped to `origin_host`.
    pub fn from_set_cookie(line: &str, origin_host: &str, now: OffsetDateTime) -> Self {
        let parsed = ParsedCookie::parse(line);

        let mut cookie = Self {
            domain: String::new(),
            host_only: false,
            ..Self::new(
                parsed.name.to_string(),
                parsed.value.to_string(),
                String::new(),
                now,
            )
        };

        for (attr, value) in parsed.attributes() {
            match attr.to_ascii_lowercase().as_str() {
                "expires" => match parse_cookie_date(value) {
                    Some(expires) => cookie.expires = Some(expires),
                    None => {
                        tracing::debug!(cookie = %cookie.name, value, "ignoring unparseable Expires");
                    }
                },
                "path" => cookie.path = value.to_string(),
                "domain" => {
                    cookie.domain = value.strip_prefix('.').unwrap_or(value).to_string();
                }
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                "samesite" => cookie.same_site = Some(value.to_string()),
                _ => {}
            }
        }

        if cookie.domain.is_empty() {
            cookie.domain = origin_host.to_string();
            cookie.host_only = true;
        }

        cookie
    }

    pub fn key(&self) -> CookieKey {
        CookieKey {
            name: self.name.clone(),
            domain: self.domain.to_ascii_lowercase(),
            path: self.path.clone(),
        }
    }

    /// A cookie expiring exactly at `current_time` is still valid.
    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expiry| expiry < current_time)
    }

    /// The `name=value` pair as sent in a `Cookie` request header.
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}
