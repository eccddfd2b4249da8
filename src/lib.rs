//! # wikinet
//!
//! A typed client for the MediaWiki Action API.
//!
//! `wikinet` sends API calls over its own HTTP/1.1 stack and keeps the
//! session alive through an in-memory cookie jar, so a login made with
//! one call carries over to every call that follows.
//!
//! ## Features
//!
//! - **Cookie Jar**: `Set-Cookie` parsing, domain/path matching and lazy expiry
//! - **Typed Calls**: query, search, parse, login/logout and edit
//! - **Retries**: exponential backoff with `Retry-After` and `maxlag` support
//! - **TLS**: BoringSSL connections with ALPN pinned to HTTP/1.1
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikinet::client::WikiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wikinet::base::neterror::NetError> {
//!     let client = WikiClient::new("https://en.wikipedia.org/w/api.php")?;
//!     let page = client.query_page("Rust (programming language)").await?;
//!     println!("{} exists: {}", page.title, page.exists());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookie parsing and the jar
//! - [`http`] - Request bodies, responses, retry policy and the transport seam
//! - [`socket`] - TCP and TLS connection setup
//! - [`client`] - The API client and its configuration
//! - [`wiki`] - Typed API calls

pub mod base;
pub mod client;
pub mod cookies;
pub mod http;
pub mod socket;
pub mod wiki;

pub use base::neterror::NetError;
pub use client::{WikiClient, WikiClientBuilder, WikiClientConfig};
pub use cookies::{CanonicalCookie, CookieJar};
