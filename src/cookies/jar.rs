use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::{CanonicalCookie, CookieKey};
use http::HeaderMap;
use indexmap::IndexMap;
use time::OffsetDateTime;
use url::Url;

/// In-memory cookie jar owned by a single client.
///
/// Cookies are keyed by `(name, domain, path)`. Storing a cookie under an
/// existing key replaces it in place, so the iteration order (and the
/// order of the `Cookie` header) stays the order in which keys were first
/// seen. Expired cookies are never evicted; they are filtered on read.
///
/// The jar does no locking of its own. Writers take `&mut self`; share it
/// behind a mutex when several tasks need it.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    store: IndexMap<CookieKey, CanonicalCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one `Set-Cookie` header value received from `origin_host`
    /// and store the result.
    pub fn parse_set_cookie(&mut self, header_line: &str, origin_host: &str) {
        let cookie =
            CanonicalCookie::from_set_cookie(header_line, origin_host, OffsetDateTime::now_utc());
        self.store(cookie);
    }

    /// Store a cookie, replacing any cookie with the same name, domain and path.
    pub fn store(&mut self, cookie: CanonicalCookie) {
        let (index, replaced) = self.store.insert_full(cookie.key(), cookie);
        if let Some(old) = replaced {
            tracing::trace!(
                name = %old.name,
                domain = %old.domain,
                path = %old.path,
                index,
                "replaced cookie"
            );
        } else {
            tracing::trace!(index, "stored cookie");
        }
    }

    /// Feed every `Set-Cookie` value of a response into the jar.
    /// Returns the number of header values processed.
    ///
    /// Values are decoded as UTF-8; invalid sequences become U+FFFD rather
    /// than dropping the cookie.
    pub fn store_response_cookies(&mut self, headers: &HeaderMap, origin_host: &str) -> usize {
        let mut count = 0;
        for val in headers.get_all(http::header::SET_COOKIE) {
            let line = String::from_utf8_lossy(val.as_bytes());
            if val.to_str().is_err() {
                tracing::debug!(host = origin_host, "Set-Cookie value is not plain ASCII");
            }
            self.parse_set_cookie(&line, origin_host);
            count += 1;
        }
        count
    }

    /// Cookies to send with a request to `url`, in storage order.
    ///
    /// Fails only if `url` is not a valid absolute URL.
    pub fn get_cookie_header(&self, url: &str) -> Result<Vec<CanonicalCookie>, NetError> {
        let url = Url::parse(url)?;
        Ok(self.cookies_for_url(&url))
    }

    /// Cookies to send with a request to `url`, evaluated against the current time.
    pub fn cookies_for_url(&self, url: &Url) -> Vec<CanonicalCookie> {
        self.cookies_for_url_at(url, OffsetDateTime::now_utc())
    }

    /// Cookies to send with a request to `url`, evaluated at `now`.
    pub fn cookies_for_url_at(&self, url: &Url, now: OffsetDateTime) -> Vec<CanonicalCookie> {
        let host = url.host_str().unwrap_or("");
        let is_secure = url.scheme() == "https";

        self.store
            .values()
            .filter(|cookie| !cookie.is_expired(now))
            .filter(|cookie| !cookie.secure || is_secure)
            .filter(|cookie| Self::domain_matches(&cookie.domain, host, cookie.host_only))
            .filter(|cookie| Self::path_matches(&cookie.path, url.path()))
            .cloned()
            .collect()
    }

    /// The `Cookie` request header value for `url`, or `None` if no cookie applies.
    pub fn cookie_header_value(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies_for_url(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(CanonicalCookie::header_pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Check if cookie domain matches request host.
    ///
    /// Host-only cookies need an exact match; domain cookies also match
    /// any subdomain. Comparison ignores ASCII case.
    fn domain_matches(cookie_domain: &str, request_host: &str, host_only: bool) -> bool {
        if request_host.eq_ignore_ascii_case(cookie_domain) {
            return true;
        }
        if host_only || request_host.len() <= cookie_domain.len() {
            return false;
        }

        let split = request_host.len() - cookie_domain.len();
        request_host.is_char_boundary(split)
            && request_host[split..].eq_ignore_ascii_case(cookie_domain)
            && request_host[..split].ends_with('.')
    }

    /// Check if request path matches cookie path.
    ///
    /// Plain string prefix: a cookie for `/wiki` is also sent to `/wikipedia`.
    /// This is looser than RFC 6265 section 5.1.4, which requires the match
    /// to end on a `/` boundary.
    fn path_matches(cookie_path: &str, request_path: &str) -> bool {
        request_path.starts_with(cookie_path)
    }

    /// Number of stored cookies, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Iterate over all stored cookies in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalCookie> + '_ {
        self.store.values()
    }

    /// Clear all cookies.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn names(cookies: &[CanonicalCookie]) -> Vec<&str> {
        cookies.iter().map(|c| c.name.as_str()).collect()
    }

    fn http_date_in(offset: Duration, future: bool) -> (String, SystemTime) {
        let now = SystemTime::now();
        let at = if future { now + offset } else { now - offset };
        (httpdate::fmt_http_date(at), at)
    }

    #[test]
    fn test_round_trip_host_only() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("name=value", "wiki.example.org");

        let cookies = jar.get_cookie_header("https://wiki.example.org/").unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "name");
        assert_eq!(cookies[0].value, "value");
        assert_eq!(cookies[0].domain, "wiki.example.org");
        assert_eq!(cookies[0].path, "/");
        assert!(cookies[0].host_only);
    }

    #[test]
    fn test_full_attribute_parsing() {
        let (expires, at) = http_date_in(Duration::from_secs(86_400), true);
        let mut jar = CookieJar::new();
        jar.parse_set_cookie(
            &format!(
                "baz=qux; Expires={}; Path=/path; Domain=.example.com; Secure; HttpOnly; SameSite=Lax",
                expires
            ),
            "www.example.com",
        );

        let c = jar.iter().next().unwrap();
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert!(c.secure);
        assert!(c.http_only);
        assert_eq!(c.same_site.as_deref(), Some("Lax"));

        let expected = at.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs() as i64;
        assert_eq!(c.expires.unwrap().unix_timestamp(), expected);
    }

    #[test]
    fn test_domain_suffix_matching() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("parent=1; Domain=example.com", "sub.example.com");
        jar.parse_set_cookie("child=1", "sub.example.com");

        let cookies = jar.cookies_for_url(&url("https://sub.example.com/"));
        assert_eq!(names(&cookies), vec!["parent", "child"]);

        let cookies = jar.cookies_for_url(&url("https://another.sub.example.com/"));
        assert_eq!(names(&cookies), vec!["parent"]);

        let cookies = jar.cookies_for_url(&url("https://example.com/"));
        assert_eq!(names(&cookies), vec!["parent"]);
    }

    #[test]
    fn test_domain_suffix_requires_dot_boundary() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1; Domain=example.com", "example.com");

        assert!(jar.cookies_for_url(&url("https://badexample.com/")).is_empty());
        assert!(jar.cookies_for_url(&url("https://example.com.evil.org/")).is_empty());
    }

    #[test]
    fn test_domain_match_ignores_case() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1; Domain=Example.COM", "example.com");

        assert_eq!(jar.cookies_for_url(&url("https://www.example.com/")).len(), 1);
    }

    #[test]
    fn test_path_prefix_matching() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("root=1; Path=/", "example.com");
        jar.parse_set_cookie("path=1; Path=/path", "example.com");
        jar.parse_set_cookie("deep=1; Path=/path/deep", "example.com");

        let cookies = jar.cookies_for_url(&url("https://example.com/path/deeper"));
        assert_eq!(names(&cookies), vec!["root", "path", "deep"]);

        let cookies = jar.cookies_for_url(&url("https://example.com/other"));
        assert_eq!(names(&cookies), vec!["root"]);
    }

    #[test]
    fn test_path_prefix_is_not_segment_aware() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1; Path=/path", "example.com");

        assert_eq!(jar.cookies_for_url(&url("https://example.com/pathXYZ")).len(), 1);
    }

    #[test]
    fn test_secure_filter() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("sec=1; Secure", "example.com");
        jar.parse_set_cookie("plain=1", "example.com");

        let cookies = jar.cookies_for_url(&url("http://example.com/"));
        assert_eq!(names(&cookies), vec!["plain"]);

        let cookies = jar.cookies_for_url(&url("https://example.com/"));
        assert_eq!(names(&cookies), vec!["sec", "plain"]);
    }

    #[test]
    fn test_expiry_filter() {
        let (past, _) = http_date_in(Duration::from_secs(3_600), false);
        let (future, _) = http_date_in(Duration::from_secs(3_600), true);

        let mut jar = CookieJar::new();
        jar.parse_set_cookie(&format!("old=1; Expires={}", past), "example.com");
        jar.parse_set_cookie(&format!("new=1; Expires={}", future), "example.com");
        jar.parse_set_cookie("session=1", "example.com");

        let cookies = jar.cookies_for_url(&url("https://example.com/"));
        assert_eq!(names(&cookies), vec!["new", "session"]);

        // Lazy expiry: the expired cookie is still stored.
        assert_eq!(jar.len(), 3);
    }

    #[test]
    fn test_expiry_evaluated_at_given_time() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie(
            "a=1; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
            "example.com",
        );
        let u = url("https://example.com/");

        let before = time::macros::datetime!(2015-10-21 07:28:00 UTC);
        assert_eq!(jar.cookies_for_url_at(&u, before).len(), 1);

        let after = time::macros::datetime!(2015-10-21 07:28:01 UTC);
        assert!(jar.cookies_for_url_at(&u, after).is_empty());
    }

    #[test]
    fn test_update_in_place() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("first=1", "example.com");
        jar.parse_set_cookie("token=old", "example.com");
        jar.parse_set_cookie("last=1", "example.com");
        jar.parse_set_cookie("token=new", "example.com");

        assert_eq!(jar.len(), 3);
        let cookies = jar.cookies_for_url(&url("https://example.com/"));
        assert_eq!(names(&cookies), vec!["first", "token", "last"]);
        assert_eq!(cookies[1].value, "new");
    }

    #[test]
    fn test_same_name_different_path_kept_apart() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=root; Path=/", "example.com");
        jar.parse_set_cookie("a=wiki; Path=/wiki", "example.com");

        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_malformed_pair_still_stored() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("garbage", "example.com");

        let c = jar.iter().next().unwrap();
        assert_eq!(c.name, "garbage");
        assert_eq!(c.value, "");
    }

    #[test]
    fn test_empty_jar_and_no_match() {
        let jar = CookieJar::new();
        assert!(jar.get_cookie_header("https://example.com/").unwrap().is_empty());
        assert!(jar.cookie_header_value(&url("https://example.com/")).is_none());
    }

    #[test]
    fn test_invalid_url_propagates() {
        let jar = CookieJar::new();
        let err = jar.get_cookie_header("not a url").unwrap_err();
        assert!(matches!(err, NetError::UrlParse(_)));
    }

    #[test]
    fn test_cookie_header_value_joins_in_order() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1", "example.com");
        jar.parse_set_cookie("b=2", "example.com");

        assert_eq!(
            jar.cookie_header_value(&url("https://example.com/")).as_deref(),
            Some("a=1; b=2")
        );
    }

    #[test]
    fn test_store_response_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(http::header::SET_COOKIE, "a=1; Path=/".parse().unwrap());
        headers.append(http::header::SET_COOKIE, "b=2; HttpOnly".parse().unwrap());
        headers.append(http::header::CONTENT_TYPE, "text/html".parse().unwrap());

        let mut jar = CookieJar::new();
        let count = jar.store_response_cookies(&headers, "example.com");

        assert_eq!(count, 2);
        assert_eq!(jar.len(), 2);
    }

    #[test]
    fn test_store_response_cookies_non_ascii() {
        let mut headers = HeaderMap::new();
        headers.append(
            http::header::SET_COOKIE,
            http::HeaderValue::from_bytes("user=José; Path=/".as_bytes()).unwrap(),
        );
        headers.append(
            http::header::SET_COOKIE,
            http::HeaderValue::from_bytes(b"raw=\xff\xfe; Path=/").unwrap(),
        );

        let mut jar = CookieJar::new();
        let count = jar.store_response_cookies(&headers, "example.com");

        assert_eq!(count, 2);
        let cookies = jar.cookies_for_url(&url("https://example.com/"));
        assert_eq!(names(&cookies), vec!["user", "raw"]);
        assert_eq!(cookies[0].value, "José");
        assert_eq!(cookies[1].value, "\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_domain_case_shares_one_record() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("sid=old; Domain=Example.com; Path=/", "www.example.com");
        jar.parse_set_cookie("sid=new; Domain=example.COM; Path=/", "www.example.com");

        assert_eq!(jar.len(), 1);
        assert_eq!(
            jar.cookie_header_value(&url("https://www.example.com/")).as_deref(),
            Some("sid=new")
        );
    }

    #[test]
    fn test_host_only_case_shares_one_record() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1", "Example.com");
        jar.parse_set_cookie("a=2", "example.com");

        assert_eq!(jar.len(), 1);
        assert_eq!(
            jar.cookie_header_value(&url("http://EXAMPLE.com/")).as_deref(),
            Some("a=2")
        );
    }

    #[test]
    fn test_clear() {
        let mut jar = CookieJar::new();
        jar.parse_set_cookie("a=1", "example.com");
        jar.clear();
        assert!(jar.is_empty());
    }
}
