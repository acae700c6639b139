use ferrous_proxy_domain::endpoint::TlsClientParams;
use ferrous_proxy_domain::listener::{TlsCertificate, TlsServerParams};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A self-signed certificate and its key written to a temporary directory.
pub struct TlsFixture {
    pub dir: TempDir,
    pub cert_path: String,
    pub key_path: String,
    pub combined_path: String,
}

impl TlsFixture {
    pub fn generate(names: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let certified = rcgen::generate_simple_self_signed(
            names.iter().map(|n| n.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();
        let cert_pem = certified.cert.pem();
        let key_pem = certified.key_pair.serialize_pem();

        let cert_path = write(dir.path(), "cert.pem", &cert_pem);
        let key_path = write(dir.path(), "key.pem", &key_pem);
        let combined_path = write(
            dir.path(),
            "combined.pem",
            &format!("{}{}", cert_pem, key_pem),
        );
        Self {
            dir,
            cert_path,
            key_path,
            combined_path,
        }
    }

    pub fn write(&self, name: &str, content: &str) -> String {
        write(self.dir.path(), name, content)
    }

    pub fn server_params(&self) -> TlsServerParams {
        server_params(vec![certificate(&self.cert_path, &self.key_path)])
    }
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

pub fn certificate(cert: &str, key: &str) -> TlsCertificate {
    TlsCertificate {
        certificate: cert.to_string(),
        key: key.to_string(),
        password: None,
    }
}

pub fn server_params(certificates: Vec<TlsCertificate>) -> TlsServerParams {
    TlsServerParams {
        provider: "rustls".to_string(),
        certificates,
        ocsp_response_files: Vec::new(),
        ciphers: String::new(),
        ciphers_tls_13: String::new(),
        minimum_version: "tls1.2".to_string(),
        ticket_key_file: String::new(),
        key_log_file: String::new(),
        number_of_stored_sessions: 20_480,
        session_timeout: 0,
        tickets_keys_rotation_delay: 43_200,
        number_of_tickets_keys: 5,
        prefer_server_ciphers: true,
        session_tickets: true,
        release_buffers: true,
        enable_renegotiation: false,
        async_mode: false,
        ktls: false,
        read_ahead: true,
        proxy_protocol_outside_tls: false,
        ignore_configuration_errors: false,
    }
}

pub fn client_params(subject_name: &str, ca_store: &str) -> TlsClientParams {
    TlsClientParams {
        provider: "rustls".to_string(),
        subject_name: subject_name.to_string(),
        subject_address: None,
        ciphers: String::new(),
        ciphers_tls_13: String::new(),
        ca_store: ca_store.to_string(),
        key_log_file: String::new(),
        validate_certificate: true,
        release_buffers: true,
        enable_renegotiation: false,
        ktls: false,
        ignore_configuration_errors: false,
    }
}
