use crate::base::neterror::NetError;
use boring::ssl::{SslConnectorBuilder, SslVerifyMode, SslVersion};

/// TLS protocol versions that may be negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

impl From<TlsVersion> for SslVersion {
    fn from(version: TlsVersion) -> Self {
        match version {
            TlsVersion::Tls12 => SslVersion::TLS1_2,
            TlsVersion::Tls13 => SslVersion::TLS1_3,
        }
    }
}

/// TLS settings for connections to the wiki.
///
/// The transport only speaks HTTP/1.1, so that is the only protocol
/// offered over ALPN.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<TlsVersion>,
    pub max_version: Option<TlsVersion>,
    pub alpn_protos: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: Some(TlsVersion::Tls12),
            max_version: Some(TlsVersion::Tls13),
            alpn_protos: vec!["http/1.1".to_string()],
        }
    }
}

impl TlsConfig {
    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        if let Some(min) = self.min_version {
            builder
                .set_min_proto_version(Some(min.into()))
                .map_err(|_| NetError::SslProtocolError)?;
        }
        if let Some(max) = self.max_version {
            builder
                .set_max_proto_version(Some(max.into()))
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if !self.alpn_protos.is_empty() {
            builder
                .set_alpn_protos(&Self::alpn_wire_format(&self.alpn_protos)?)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        builder.set_verify(SslVerifyMode::PEER);
        Ok(())
    }

    /// Length-prefixed ALPN protocol list.
    fn alpn_wire_format(protos: &[String]) -> Result<Vec<u8>, NetError> {
        let mut wire = Vec::new();
        for proto in protos {
            let len = u8::try_from(proto.len()).map_err(|_| NetError::SslProtocolError)?;
            wire.push(len);
            wire.extend_from_slice(proto.as_bytes());
        }
        Ok(wire)
    }

    /// Check if SNI (Server Name Indication) should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        host.parse::<std::net::IpAddr>().is_err()
    }
}
