use ferrous_proxy_domain::DomainError;

/// Port for reading files referenced by the configuration.
pub trait FileSource: Send + Sync {
    fn read_to_string(&self, path: &str) -> Result<String, DomainError>;
}
