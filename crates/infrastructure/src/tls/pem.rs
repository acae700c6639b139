use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls_pemfile::{certs, private_key};
use std::fs::File;
use std::io::BufReader;

/// Loads every certificate of a PEM file.
pub fn load_certificates(path: &str) -> Result<Vec<CertificateDer<'static>>, String> {
    let file = File::open(path)
        .map_err(|e| format!("unable to open certificate file '{}': {}", path, e))?;
    let mut reader = BufReader::new(file);
    let loaded = certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("unable to parse certificate file '{}': {}", path, e))?;

    if loaded.is_empty() {
        return Err(format!("no certificate found in '{}'", path));
    }
    Ok(loaded)
}

/// Loads the first private key of a PEM file.
pub fn load_private_key(path: &str) -> Result<PrivateKeyDer<'static>, String> {
    let file =
        File::open(path).map_err(|e| format!("unable to open key file '{}': {}", path, e))?;
    let mut reader = BufReader::new(file);

    private_key(&mut reader)
        .map_err(|e| format!("unable to parse key file '{}': {}", path, e))?
        .ok_or_else(|| format!("no private key found in '{}'", path))
}
