//! TLS acceptor construction for channel mode
//!
//! Channel-mode deployments run the whole protocol over TLS: the server
//! presents a certificate and refuses plaintext connections by construction
//! (a non-TLS client fails the handshake and is dropped). Client
//! certificates are not requested.

use crate::{Result, ServerError};
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use rustls_pemfile::{certs, private_key};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::info;

/// Load certificates from a PEM file
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| {
        ServerError::Tls(format!("Failed to open {}: {e}", path.display()))
    })?;
    let mut reader = BufReader::new(file);

    let certs: Vec<CertificateDer<'static>> = certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("Invalid certificate: {e}")))?;

    if certs.is_empty() {
        return Err(ServerError::Tls(format!(
            "No certificates found in {}",
            path.display()
        )));
    }

    info!("Loaded {} certificates from {:?}", certs.len(), path);
    Ok(certs)
}

/// Load a private key from a PEM file
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path).map_err(|e| {
        ServerError::Tls(format!("Failed to open {}: {e}", path.display()))
    })?;
    let mut reader = BufReader::new(file);

    let key = private_key(&mut reader)
        .map_err(|e| ServerError::Tls(format!("Invalid private key: {e}")))?
        .ok_or_else(|| {
            ServerError::Tls(format!("No private key found in {}", path.display()))
        })?;

    info!("Loaded private key from {:?}", path);
    Ok(key)
}

/// Build a TLS acceptor from a certificate chain and private key
pub fn build_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor> {
    let certs = load_certs(cert_path)?;
    let key = load_private_key(key_path)?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    info!("Created server TLS configuration");
    Ok(TlsAcceptor::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_cert_file_is_an_error() {
        assert!(load_certs(Path::new("/nonexistent/server.crt")).is_err());
    }

    #[test]
    fn test_pem_without_certificates_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a certificate").unwrap();
        assert!(load_certs(file.path()).is_err());
    }

    #[test]
    fn test_pem_without_key_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a key").unwrap();
        assert!(load_private_key(file.path()).is_err());
    }
}
