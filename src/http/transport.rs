//! The seam between the API client and the wire.
//!
//! [`WikiClient`](crate::client::WikiClient) hands a fully built request to a
//! [`Transport`] and gets back a response with the body already read. The
//! default [`HttpTransport`] opens a fresh HTTP/1.1 connection per request;
//! tests plug in their own implementation to script responses.

use crate::base::neterror::NetError;
use crate::http::requestbody::RequestBody;
use crate::http::response::HttpResponse;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use futures::future::BoxFuture;
use http::header::{HeaderValue, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST};
use http::uri::PathAndQuery;
use http::{Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use url::Url;

/// Alias for the `Future` type returned by a transport.
pub type Sending = BoxFuture<'static, Result<HttpResponse, NetError>>;

/// Sends one request and returns the complete response.
///
/// The request URI is always absolute. Implementations must be
/// thread-safe; the client may send from several tasks at once.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request<RequestBody>) -> Sending;
}

/// Blanket implementation for Arc-wrapped transports.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: Request<RequestBody>) -> Sending {
        (**self).send(request)
    }
}

/// HTTP/1.1 transport over TCP or TLS, one connection per request.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    tls: Arc<TlsConfig>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls_config(tls: TlsConfig) -> Self {
        Self { tls: Arc::new(tls) }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request<RequestBody>) -> Sending {
        let tls = Arc::clone(&self.tls);
        Box::pin(async move {
            let url = Url::parse(&request.uri().to_string())?;
            let socket = ConnectJob::connect(&url, &tls).await?;

            let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
                .await
                .map_err(map_hyper_error)?;

            // Spawn the connection driver
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(error = %e, "connection driver finished with error");
                }
            });

            let request = into_origin_form(request, &url)?;
            tracing::debug!(method = %request.method(), uri = %request.uri(), "sending request");

            let response = sender
                .send_request(request)
                .await
                .map_err(map_hyper_error)?;

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|_| NetError::HttpBodyError)?
                .to_bytes();

            Ok(HttpResponse::new(parts.status, parts.headers, body).with_version(parts.version))
        })
    }
}

/// Rewrite an absolute-form request for the wire: origin-form URI, `Host`
/// header, and an encoded body with its length and content type.
fn into_origin_form(
    request: Request<RequestBody>,
    url: &Url,
) -> Result<Request<Full<bytes::Bytes>>, NetError> {
    let (mut parts, body) = request.into_parts();

    let path_and_query = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    parts.uri = Uri::from(
        PathAndQuery::try_from(path_and_query).map_err(|_| NetError::InvalidUrl)?,
    );

    if !parts.headers.contains_key(HOST) {
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        parts.headers.insert(
            HOST,
            HeaderValue::from_str(&authority).map_err(|_| NetError::InvalidUrl)?,
        );
    }

    if let Some(content_type) = body.content_type() {
        parts
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    parts
        .headers
        .insert(CONNECTION, HeaderValue::from_static("close"));

    let bytes = body.into_bytes();
    if !bytes.is_empty() {
        parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    }

    Ok(Request::from_parts(parts, Full::new(bytes)))
}

fn map_hyper_error(e: hyper::Error) -> NetError {
    tracing::debug!(error = %e, "HTTP exchange failed");
    if e.is_timeout() {
        NetError::ConnectionTimedOut
    } else if e.is_parse() {
        NetError::InvalidHttpResponse
    } else if e.is_incomplete_message() || e.is_closed() || e.is_canceled() {
        NetError::ConnectionClosed
    } else {
        NetError::ConnectionReset
    }
}
