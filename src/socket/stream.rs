//! Socket abstraction over plain TCP and TLS streams.
//!
//! Based on Chromium's `StreamSocket` interface, which gives
//! `TcpClientSocket` and `SSLClientSocket` one shape so the HTTP layer
//! does not care which it got.

use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A trait for any socket that supports async read/write operations.
///
/// Chromium equivalent: `net::StreamSocket`
pub trait StreamSocket: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {}

impl StreamSocket for TcpStream {}

impl<S: StreamSocket> StreamSocket for SslStream<S> {}

/// A boxed [`StreamSocket`], so TCP and TLS connections share one type.
pub struct BoxedSocket {
    inner: Pin<Box<dyn StreamSocket>>,
}

impl BoxedSocket {
    /// Create a new BoxedSocket from any StreamSocket.
    pub fn new<S: StreamSocket>(socket: S) -> Self {
        Self {
            inner: Box::pin(socket),
        }
    }
}

impl AsyncRead for BoxedSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for BoxedSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}
