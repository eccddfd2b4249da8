//! Connection establishment.
//!
//! One connection per API call: DNS via tokio, TCP, then BoringSSL for
//! `https` URLs.

pub mod connectjob;
pub mod stream;
pub mod tls;
