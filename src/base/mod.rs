//! Base types and error handling.
//!
//! Provides the foundational error type shared by every layer:
//! - [`NetError`](neterror::NetError): network error codes matching Chromium's
//!   `net_error_list.h`, extended with wiki API and validation errors.

pub mod neterror;
