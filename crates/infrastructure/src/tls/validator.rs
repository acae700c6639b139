use ferrous_proxy_application::ports::TlsContextValidator;
use ferrous_proxy_domain::endpoint::TlsClientParams;
use ferrous_proxy_domain::listener::{TlsCertificate, TlsServerParams};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore, ServerConfig, SupportedProtocolVersion};
use std::sync::Arc;
use tracing::{debug, warn};

use super::pem::{load_certificates, load_private_key};

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];
static TLS12_AND_UP: &[&SupportedProtocolVersion] =
    &[&rustls::version::TLS13, &rustls::version::TLS12];

/// Builds rustls server and client configurations to prove the parameters
/// are usable. The configurations themselves are thrown away.
pub struct RustlsContextValidator {
    provider: Arc<CryptoProvider>,
}

impl Default for RustlsContextValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RustlsContextValidator {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(rustls::crypto::aws_lc_rs::default_provider()),
        }
    }

    fn build_server_config(
        &self,
        params: &TlsServerParams,
        versions: &'static [&'static SupportedProtocolVersion],
        pair: &TlsCertificate,
        ocsp: Option<&str>,
    ) -> Result<ServerConfig, String> {
        if pair.password.is_some() {
            return Err(format!(
                "encrypted private key for '{}' is not supported",
                pair.certificate
            ));
        }
        let chain = load_certificates(&pair.certificate)?;
        let key_path = if pair.key.is_empty() {
            &pair.certificate
        } else {
            &pair.key
        };
        let key = load_private_key(key_path)?;

        let builder = ServerConfig::builder_with_provider(self.provider.clone())
            .with_protocol_versions(versions)
            .map_err(|e| format!("unusable TLS versions: {}", e))?
            .with_no_client_auth();
        let config = match ocsp {
            Some(path) => {
                let response = std::fs::read(path)
                    .map_err(|e| format!("unable to read OCSP response '{}': {}", path, e))?;
                builder.with_single_cert_with_ocsp(chain, key, response)
            }
            None => builder.with_single_cert(chain, key),
        }
        .map_err(|e| {
            format!(
                "certificate '{}' does not match key '{}': {}",
                pair.certificate, key_path, e
            )
        })?;

        debug!(provider = %params.provider, certificate = %pair.certificate, "Server TLS context built");
        Ok(config)
    }
}

fn check_provider(provider: &str) -> Result<(), String> {
    if provider.is_empty() || provider.eq_ignore_ascii_case("rustls") {
        Ok(())
    } else {
        Err(format!(
            "TLS provider '{}' is not available, only rustls is built in",
            provider
        ))
    }
}

fn protocol_versions(
    minimum: &str,
) -> Result<&'static [&'static SupportedProtocolVersion], String> {
    match minimum.to_ascii_lowercase().as_str() {
        "" | "tls1.2" => Ok(TLS12_AND_UP),
        "tls1.3" => Ok(TLS13_ONLY),
        "tls1.0" | "tls1.1" => {
            warn!(minimum_version = %minimum, "TLS versions below 1.2 are not supported, using tls1.2");
            Ok(TLS12_AND_UP)
        }
        other => Err(format!("unknown minimum TLS version '{}'", other)),
    }
}

impl TlsContextValidator for RustlsContextValidator {
    fn validate_server(&self, params: &TlsServerParams) -> Result<(), String> {
        check_provider(&params.provider)?;
        if !params.has_certificates() {
            return Err("no certificate has been configured".to_string());
        }
        let versions = protocol_versions(&params.minimum_version)?;
        if !params.ciphers.is_empty() || !params.ciphers_tls_13.is_empty() {
            debug!("Cipher lists are ignored, rustls picks its own suites");
        }
        if !params.ticket_key_file.is_empty() {
            std::fs::metadata(&params.ticket_key_file).map_err(|e| {
                format!(
                    "unable to access ticket key file '{}': {}",
                    params.ticket_key_file, e
                )
            })?;
        }

        for (index, pair) in params.certificates.iter().enumerate() {
            let ocsp = params.ocsp_response_files.get(index).map(String::as_str);
            self.build_server_config(params, versions, pair, ocsp)?;
        }
        Ok(())
    }

    fn validate_client(&self, params: &TlsClientParams) -> Result<(), String> {
        check_provider(&params.provider)?;

        let mut roots = RootCertStore::empty();
        if params.ca_store.is_empty() {
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        } else {
            for cert in load_certificates(&params.ca_store)? {
                roots
                    .add(cert)
                    .map_err(|e| format!("invalid CA in '{}': {}", params.ca_store, e))?;
            }
        }

        match params.verification_name() {
            Some(name) => {
                ServerName::try_from(name.clone())
                    .map_err(|e| format!("invalid subject name '{}': {}", name, e))?;
            }
            None if params.validate_certificate => {
                warn!("Certificate validation enabled without a subject name or address");
            }
            None => {}
        }

        ClientConfig::builder_with_provider(self.provider.clone())
            .with_protocol_versions(rustls::DEFAULT_VERSIONS)
            .map_err(|e| format!("unusable TLS versions: {}", e))?
            .with_root_certificates(roots)
            .with_no_client_auth();
        Ok(())
    }
}
