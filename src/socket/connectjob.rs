use crate::base::neterror::NetError;
use crate::socket::stream::BoxedSocket;
use crate::socket::tls::TlsConfig;
use boring::ssl::{SslConnector, SslMethod};
use tokio::net::TcpStream;
use url::Url;

/// Manages the connection process: DNS -> TCP -> SSL.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob;

impl ConnectJob {
    pub async fn connect(url: &Url, tls: &TlsConfig) -> Result<BoxedSocket, NetError> {
        let use_tls = match url.scheme() {
            "https" => true,
            "http" => false,
            _ => return Err(NetError::DisallowedUrlScheme),
        };
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        // IPv6 literals come bracketed from the URL
        let host = host.trim_start_matches('[').trim_end_matches(']');

        // 1. DNS Resolution
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| {
                tracing::debug!(host, error = %e, "DNS resolution failed");
                NetError::NameNotResolved
            })?;

        // 2. TCP Connect, first address that answers
        let mut last_error = NetError::NameNotResolved;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "TCP connect failed");
                    last_error = map_connect_error(&e);
                }
            }
        }
        let stream = stream.ok_or(last_error)?;

        // 3. SSL Handshake (if https)
        if !use_tls {
            return Ok(BoxedSocket::new(stream));
        }

        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|_| NetError::SslProtocolError)?;
        tls.apply_to_builder(&mut builder)?;

        let connector = builder.build();
        let mut config = connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        if !TlsConfig::should_set_sni(host) {
            config.set_use_server_name_indication(false);
        }

        let tls_stream = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                tracing::debug!(host, error = ?e, "SSL handshake failed");
                NetError::SslProtocolError
            })?;

        Ok(BoxedSocket::new(tls_stream))
    }
}

fn map_connect_error(e: &std::io::Error) -> NetError {
    match e.kind() {
        std::io::ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
        std::io::ErrorKind::ConnectionReset => NetError::ConnectionReset,
        std::io::ErrorKind::ConnectionAborted => NetError::ConnectionAborted,
        std::io::ErrorKind::TimedOut => NetError::ConnectionTimedOut,
        _ => NetError::ConnectionFailed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[tokio::test]
    async fn test_rejects_unsupported_scheme_before_dns() {
        let url = Url::parse("ftp://does-not-resolve.invalid/file").unwrap();
        let result = ConnectJob::connect(&url, &TlsConfig::default()).await;
        assert!(matches!(result, Err(NetError::DisallowedUrlScheme)));
    }

    #[test]
    fn test_connect_error_mapping() {
        let refused = Error::from(ErrorKind::ConnectionRefused);
        assert_eq!(map_connect_error(&refused), NetError::ConnectionRefused);
        let timed_out = Error::from(ErrorKind::TimedOut);
        assert_eq!(map_connect_error(&timed_out), NetError::ConnectionTimedOut);
        let other = Error::from(ErrorKind::PermissionDenied);
        assert_eq!(map_connect_error(&other), NetError::ConnectionFailed);
    }
}
