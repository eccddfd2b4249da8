pub mod requestbody;
pub mod response;
pub mod retry;
pub mod transport;

// Re-exports for convenience
pub use requestbody::RequestBody;
pub use response::HttpResponse;
pub use retry::RetryConfig;
pub use transport::{HttpTransport, Transport};
