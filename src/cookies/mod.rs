//! Cookie parsing and storage.
//!
//! The jar is the only stateful part of the client: every request asks it
//! which cookies apply to the target URL, and every response feeds its
//! `Set-Cookie` headers back in.
//!
//! # Architecture
//!
//! | Chromium (C++) | wikinet (Rust) | Responsibility |
//! |----------------|----------------|----------------|
//! | `net::CookieMonster` | [`CookieJar`](jar::CookieJar) | Keyed storage and URL matching |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | Single cookie representation |
//! | `net::ParsedCookie` | [`ParsedCookie`](parsed_cookie::ParsedCookie) | `Set-Cookie` tokenizing |
//!
//! # Matching rules
//!
//! A stored cookie is sent with a request when it is not expired, the URL
//! is `https` if the cookie is `Secure`, the host matches its domain
//! (exactly for host-only cookies, or as a subdomain otherwise), and the
//! URL path starts with the cookie path.
//!
//! ```rust
//! use wikinet::cookies::jar::CookieJar;
//!
//! let mut jar = CookieJar::new();
//! jar.parse_set_cookie("session=abc; Path=/; Secure; HttpOnly", "en.wikipedia.org");
//!
//! let cookies = jar.get_cookie_header("https://en.wikipedia.org/w/api.php")?;
//! assert_eq!(cookies.len(), 1);
//! assert_eq!(cookies[0].value, "abc");
//! # Ok::<(), wikinet::base::neterror::NetError>(())
//! ```

pub mod canonical_cookie;
pub mod jar;
pub mod parsed_cookie;

pub use canonical_cookie::{CanonicalCookie, CookieKey};
pub use jar::CookieJar;
