use ferrous_proxy_domain::endpoint::TlsClientParams;
use ferrous_proxy_domain::listener::TlsServerParams;

/// Port that tries to build a TLS context from the given parameters.
pub trait TlsContextValidator: Send + Sync {
    fn validate_server(&self, params: &TlsServerParams) -> Result<(), String>;

    fn validate_client(&self, params: &TlsClientParams) -> Result<(), String>;
}
