use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ferrous_proxy_domain::config::server::{MetricsConfig, TuningConfig};
use ferrous_proxy_domain::config::{
    ConsoleConfig, DynamicRulesSettingsConfig, QueryCountConfig, WebserverConfig,
};
use ferrous_proxy_domain::settings::{
    parse_tcp_fast_open_key, CarbonEndpoint, ConsoleSettings, QueryCountSettings, TlsTuning,
    WebserverSettings, DEFAULT_CONSOLE_PORT,
};
use ferrous_proxy_domain::{
    parse_socket_addr, DnsActionKind, DomainError, NetmaskGroup, RuntimeSettings, ScriptFlavour,
};
use tracing::{debug, warn};

use super::context::LoadContext;
use super::scripting::{resolve_optional_function, ScriptSource};

const CARBON_PORT: u16 = 2003;
const WEBSERVER_PORT: u16 = 8083;

/// Builds a netmask group from a list of masks.
pub fn netmask_group(masks: &[String], context: &str) -> Result<NetmaskGroup, DomainError> {
    let mut group = NetmaskGroup::new();
    for mask in masks {
        group
            .add_mask(mask)
            .map_err(|e| DomainError::validation(context, e))?;
    }
    Ok(group)
}

pub fn console_settings(config: &ConsoleConfig) -> Result<Option<ConsoleSettings>, DomainError> {
    if config.listen_address.is_empty() && config.key.is_empty() {
        return Ok(None);
    }
    let listen_address = if config.listen_address.is_empty() {
        None
    } else {
        Some(
            parse_socket_addr(&config.listen_address, DEFAULT_CONSOLE_PORT)
                .map_err(|e| DomainError::validation("console", e))?,
        )
    };
    let key = if config.key.is_empty() {
        Vec::new()
    } else {
        STANDARD
            .decode(config.key.trim())
            .map_err(|e| DomainError::validation("console", format!("invalid key: {}", e)))?
    };
    Ok(Some(ConsoleSettings {
        listen_address,
        acl: netmask_group(&config.acl, "console ACL")?,
        key,
    }))
}

pub fn tls_tuning(config: &TuningConfig) -> TlsTuning {
    for engine in &config.tls.engines {
        warn!(engine = %engine, "TLS engines are not supported by this build, ignoring");
    }
    for provider in &config.tls.providers {
        if !provider.eq_ignore_ascii_case("rustls") {
            warn!(provider = %provider, "Unknown TLS provider, ignoring");
        }
    }
    TlsTuning {
        engines: config.tls.engines.clone(),
        providers: config.tls.providers.clone(),
    }
}

pub fn webserver_settings(
    config: &WebserverConfig,
) -> Result<Option<WebserverSettings>, DomainError> {
    if config.listen_addresses.is_empty() {
        return Ok(None);
    }
    let listen_addresses = config
        .listen_addresses
        .iter()
        .map(|raw| {
            parse_socket_addr(raw, WEBSERVER_PORT)
                .map_err(|e| DomainError::validation("webserver", e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if !config.hash_plaintext_credentials {
        if !config.password.is_empty() && !is_hashed(&config.password) {
            warn!("Webserver password is stored in plain text");
        }
        if !config.api_key.is_empty() && !is_hashed(&config.api_key) {
            warn!("Webserver API key is stored in plain text");
        }
    }
    Ok(Some(WebserverSettings {
        listen_addresses,
        password: config.password.clone(),
        api_key: config.api_key.clone(),
        hash_plaintext_credentials: config.hash_plaintext_credentials,
        acl: netmask_group(&config.acl, "webserver ACL")?,
        custom_headers: config
            .custom_headers
            .iter()
            .map(|h| (h.key.to_ascii_lowercase(), h.value.clone()))
            .collect(),
        api_requires_authentication: config.api_requires_authentication,
        stats_require_authentication: config.stats_require_authentication,
        dashboard_requires_authentication: config.dashboard_requires_authentication,
        max_concurrent_connections: config.max_concurrent_connections,
        api_configuration_directory: config.api_configuration_directory.clone(),
        api_read_write: config.api_read_write,
    }))
}

// Hashed credentials use the `$scrypt$...` modular crypt notation.
fn is_hashed(credential: &str) -> bool {
    credential.starts_with('$')
}

pub fn carbon_endpoints(config: &MetricsConfig) -> Result<Vec<CarbonEndpoint>, DomainError> {
    config
        .carbon
        .iter()
        .map(|carbon| {
            let address = parse_socket_addr(&carbon.address, CARBON_PORT)
                .map_err(|e| DomainError::validation("carbon endpoint", e))?;
            Ok(CarbonEndpoint {
                address,
                name: carbon.name.clone(),
                interval: carbon.interval,
                namespace: carbon.namespace.clone(),
                instance: carbon.instance.clone(),
            })
        })
        .collect()
}

pub fn query_count_settings(
    ctx: &LoadContext<'_>,
    config: &QueryCountConfig,
) -> Result<Option<QueryCountSettings>, DomainError> {
    if !config.enabled {
        return Ok(None);
    }
    let filter = resolve_optional_function(
        ctx,
        ScriptFlavour::Native,
        ScriptSource::new(
            &config.filter_function_name,
            &config.filter_function_code,
            &config.filter_function_file,
        ),
        "query count filter",
    )?;
    Ok(Some(QueryCountSettings {
        enabled: true,
        filter,
    }))
}

pub fn dynamic_block_default_action(
    config: &DynamicRulesSettingsConfig,
) -> Result<DnsActionKind, DomainError> {
    config
        .default_action
        .parse::<DnsActionKind>()
        .map_err(|e| DomainError::validation("dynamic rules settings", e))
}

/// TCP fast-open key and retained capabilities.
pub fn apply_system_tuning(
    settings: &mut RuntimeSettings,
    tuning: &TuningConfig,
    capabilities: &[String],
) -> Result<(), DomainError> {
    if !tuning.tcp.fast_open_key.is_empty() {
        let key = parse_tcp_fast_open_key(&tuning.tcp.fast_open_key)
            .map_err(|e| DomainError::validation("tuning.tcp", e))?;
        settings.tcp_fast_open_key = Some(key);
    }
    settings.capabilities_to_retain = capabilities.to_vec();
    debug!(
        capabilities = settings.capabilities_to_retain.len(),
        fast_open = settings.tcp_fast_open_key.is_some(),
        "System tuning applied"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_defaults_port_and_decodes_key() {
        let config = ConsoleConfig {
            listen_address: "127.0.0.1".to_string(),
            key: STANDARD.encode(b"secret"),
            acl: vec!["127.0.0.0/8".to_string()],
        };
        let console = console_settings(&config).unwrap().unwrap();
        assert_eq!(console.listen_address.unwrap().port(), DEFAULT_CONSOLE_PORT);
        assert_eq!(console.key, b"secret".to_vec());
        assert_eq!(console.acl.len(), 1);
    }

    #[test]
    fn test_console_invalid_key_is_validation_error() {
        let config = ConsoleConfig {
            listen_address: String::new(),
            key: "***".to_string(),
            acl: Vec::new(),
        };
        assert!(matches!(
            console_settings(&config),
            Err(DomainError::Validation { .. })
        ));
    }

    #[test]
    fn test_webserver_lowercases_header_names() {
        let config: WebserverConfig = toml::from_str(
            r#"
            listen_addresses = ["127.0.0.1:8083"]
            custom_headers = [{ key = "X-Frame-Options", value = "DENY" }]
            "#,
        )
        .unwrap();
        let webserver = webserver_settings(&config).unwrap().unwrap();
        assert_eq!(
            webserver.custom_headers,
            vec![("x-frame-options".to_string(), "DENY".to_string())]
        );
    }

    #[test]
    fn test_webserver_rejects_bad_address() {
        let config: WebserverConfig =
            toml::from_str(r#"listen_addresses = ["not an address"]"#).unwrap();
        assert!(webserver_settings(&config).is_err());
    }
}
