//! TLS configuration and certificate loading.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load TLS configuration from certificate and key files.
///
/// The PEM files are parsed once here so a missing or empty certificate
/// chain fails startup with a readable error.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, io::Error> {
    let certs = count_certs(cert_path)?;
    if certs == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("No certificates found in {:?}", cert_path),
        ));
    }

    let mut reader = BufReader::new(open(key_path)?);
    if rustls_pemfile::private_key(&mut reader)?.is_none() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("No private key found in {:?}", key_path),
        ));
    }

    tracing::debug!(cert = ?cert_path, certs, "TLS material loaded");
    RustlsConfig::from_pem_file(cert_path, key_path).await
}

fn open(path: &Path) -> Result<File, io::Error> {
    File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("Cannot open {:?}: {}", path, e))
    })
}

fn count_certs(path: &Path) -> Result<usize, io::Error> {
    let mut reader = BufReader::new(open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<Result<Vec<_>, _>>()?;
    Ok(certs.len())
}
