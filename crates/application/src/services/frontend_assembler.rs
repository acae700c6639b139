use ferrous_proxy_domain::config::{BindConfig, IncomingQuicConfig, IncomingTlsConfig};
use ferrous_proxy_domain::listener::{
    CongestionControl, DnsCryptParams, DohEngine, DohListenerParams, DohResponse,
    QuicListenerParams, TcpTuning, TlsCertificate, TlsServerParams,
};
use ferrous_proxy_domain::objects::XskMap;
use ferrous_proxy_domain::{
    parse_socket_addr, DnsProtocol, DomainError, FrontendListener, ListenerExtension, Transport,
};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::context::LoadContext;

/// Port of a DoH listener serving plain HTTP.
const PLAIN_HTTP_PORT: u16 = 80;

/// Parses a space separated CPU list such as `"0 1 2"`.
pub fn parse_cpu_list(raw: &str, context: &str) -> Result<Vec<u32>, DomainError> {
    raw.split_whitespace()
        .map(|cpu| {
            cpu.parse::<u32>().map_err(|_| {
                DomainError::validation(context, format!("invalid CPU index '{}'", cpu))
            })
        })
        .collect()
}

/// Builds the listeners of every bind, in declaration order.
pub fn assemble_frontends(
    ctx: &LoadContext<'_>,
    binds: &[BindConfig],
) -> Result<Vec<FrontendListener>, DomainError> {
    let mut listeners = Vec::new();
    for bind in binds {
        match build_bind(ctx, bind)? {
            Some(mut built) => listeners.append(&mut built),
            None => continue,
        }
    }
    info!(listeners = listeners.len(), "Frontends assembled");
    Ok(listeners)
}

/// Builds the listeners of one bind. `None` means the bind asked for TLS
/// configuration errors to be ignored and its TLS context failed to build.
pub fn build_bind(
    ctx: &LoadContext<'_>,
    bind: &BindConfig,
) -> Result<Option<Vec<FrontendListener>>, DomainError> {
    let context = format!("bind '{}'", bind.listen_address);
    let protocol = bind
        .protocol
        .parse::<DnsProtocol>()
        .map_err(|e| DomainError::validation(&context, e))?;
    let plain_http = protocol == DnsProtocol::DoH && bind.tls.certificates.is_empty();
    let default_port = if plain_http {
        PLAIN_HTTP_PORT
    } else {
        protocol.default_port()
    };
    let address = parse_socket_addr(&bind.listen_address, default_port)
        .map_err(|e| DomainError::validation(&context, e))?;

    if bind.threads == 0 {
        return Err(DomainError::validation(&context, "threads must be at least 1"));
    }
    let cpus: BTreeSet<u32> = parse_cpu_list(&bind.cpus, &context)?.into_iter().collect();

    let xsk_map = if bind.xsk.is_empty() {
        None
    } else {
        match ctx.resolve::<Arc<XskMap>>(&bind.xsk, &context)? {
            Some(map) if u32::from(map.queues) != bind.threads => {
                return Err(DomainError::validation(
                    &context,
                    format!(
                        "XSK map '{}' has {} queues but the bind uses {} threads",
                        map.name, map.queues, bind.threads
                    ),
                ));
            }
            _ => Some(bind.xsk.clone()),
        }
    };

    let additional_addresses = bind
        .additional_addresses
        .iter()
        .filter_map(|raw| match parse_socket_addr(raw, address.port()) {
            Ok(addr) => Some(addr),
            Err(e) => {
                warn!(bind = %bind.listen_address, address = %raw, error = %e, "Ignoring additional address");
                None
            }
        })
        .collect::<Vec<SocketAddr>>();

    let extension = build_extension(ctx, protocol, bind, plain_http, &context)?;

    let tls = if protocol.requires_tls() && !plain_http {
        let params = server_tls_params(&bind.tls);
        if !tls_context_usable(ctx, &params, &context) {
            return Ok(None);
        }
        Some(params)
    } else {
        None
    };

    let tcp = TcpTuning {
        fast_open_queue_size: bind.tcp.fast_open_queue_size,
        listen_queue_size: bind.tcp.listen_queue_size,
        max_in_flight_queries: bind.tcp.max_in_flight_queries,
        max_concurrent_connections: bind.tcp.max_concurrent_connections,
    };

    let transports: &[Transport] = if protocol.is_quic() {
        &[Transport::Quic]
    } else if protocol.has_udp_listener() {
        &[Transport::Udp, Transport::Tcp]
    } else {
        &[Transport::Tcp]
    };

    let mut listeners = Vec::with_capacity(bind.threads as usize * transports.len());
    for thread_index in 0..bind.threads {
        for transport in transports {
            listeners.push(FrontendListener {
                address,
                protocol,
                transport: *transport,
                threads: bind.threads,
                thread_index,
                reuseport: bind.reuseport,
                interface: bind.interface.clone(),
                cpus: cpus.clone(),
                enable_proxy_protocol: bind.enable_proxy_protocol,
                tcp,
                tls: tls.clone(),
                extension: extension.clone(),
                xsk_map: xsk_map.clone(),
                additional_addresses: additional_addresses.clone(),
                activate: ctx.mode.activates(),
            });
        }
    }
    debug!(address = %address, protocol = %protocol, listeners = listeners.len(), "Bind loaded");
    Ok(Some(listeners))
}

fn server_tls_params(config: &IncomingTlsConfig) -> TlsServerParams {
    TlsServerParams {
        provider: config.provider.clone(),
        certificates: config
            .certificates
            .iter()
            .map(|cert| TlsCertificate {
                certificate: cert.certificate.clone(),
                key: cert.key.clone(),
                password: (!cert.password.is_empty()).then(|| cert.password.clone()),
            })
            .collect(),
        ocsp_response_files: config.ocsp_response_files.clone(),
        ciphers: config.ciphers.clone(),
        ciphers_tls_13: config.ciphers_tls_13.clone(),
        minimum_version: config.minimum_version.clone(),
        ticket_key_file: config.ticket_key_file.clone(),
        key_log_file: config.key_log_file.clone(),
        number_of_stored_sessions: config.number_of_stored_sessions,
        session_timeout: config.session_timeout,
        tickets_keys_rotation_delay: config.tickets_keys_rotation_delay,
        number_of_tickets_keys: config.number_of_tickets_keys,
        prefer_server_ciphers: config.prefer_server_ciphers,
        session_tickets: config.session_tickets,
        release_buffers: config.release_buffers,
        enable_renegotiation: config.enable_renegotiation,
        async_mode: config.async_mode,
        ktls: config.ktls,
        read_ahead: config.read_ahead,
        proxy_protocol_outside_tls: config.proxy_protocol_outside_tls,
        ignore_configuration_errors: config.ignore_configuration_errors,
    }
}

/// The server context is only built here when the bind asked for
/// configuration errors to be ignored; `false` drops the bind.
fn tls_context_usable(ctx: &LoadContext<'_>, params: &TlsServerParams, context: &str) -> bool {
    if !params.ignore_configuration_errors {
        return true;
    }
    match ctx.ports.tls.validate_server(params) {
        Ok(()) => true,
        Err(e) => {
            warn!(bind = %context, error = %e, "Ignoring frontend with invalid TLS configuration");
            false
        }
    }
}

fn quic_params(config: &IncomingQuicConfig, context: &str) -> QuicListenerParams {
    let congestion_control = config
        .congestion_control
        .parse::<CongestionControl>()
        .unwrap_or_else(|e| {
            warn!(context = %context, error = %e, "Keeping default congestion control");
            CongestionControl::default()
        });
    QuicListenerParams {
        idle_timeout: config.idle_timeout,
        congestion_control,
        internal_pipe_buffer_size: config.internal_pipe_buffer_size,
    }
}

fn require_feature(enabled: bool, feature: &str, context: &str) -> Result<(), DomainError> {
    if enabled {
        Ok(())
    } else {
        Err(DomainError::UnsupportedFeature(format!(
            "{} requested by {} is not compiled in",
            feature, context
        )))
    }
}

fn build_extension(
    ctx: &LoadContext<'_>,
    protocol: DnsProtocol,
    bind: &BindConfig,
    plain_http: bool,
    context: &str,
) -> Result<ListenerExtension, DomainError> {
    let features = &ctx.ports.features;
    let extension = match protocol {
        DnsProtocol::Do53 | DnsProtocol::DoT => ListenerExtension::None,
        DnsProtocol::DoH => {
            let engine = bind
                .doh
                .provider
                .parse::<DohEngine>()
                .map_err(|e| DomainError::validation(context, e))?;
            let compiled = match engine {
                DohEngine::Nghttp2 => features.doh_nghttp2,
                DohEngine::H2o => features.doh_h2o,
            };
            require_feature(compiled, &format!("DoH engine {}", engine), context)?;
            ListenerExtension::Doh(DohListenerParams {
                engine,
                paths: bind.doh.paths.clone(),
                idle_timeout: bind.doh.idle_timeout,
                server_tokens: bind.doh.server_tokens.clone(),
                send_cache_control_headers: bind.doh.send_cache_control_headers,
                keep_incoming_headers: bind.doh.keep_incoming_headers,
                trust_forwarded_for_header: bind.doh.trust_forwarded_for_header,
                early_acl_drop: bind.doh.early_acl_drop,
                exact_path_matching: bind.doh.exact_path_matching,
                internal_pipe_buffer_size: bind.doh.internal_pipe_buffer_size,
                custom_response_headers: bind
                    .doh
                    .custom_response_headers
                    .iter()
                    .map(|h| (h.key.clone(), h.value.clone()))
                    .collect(),
                responses_map: bind
                    .doh
                    .responses_map
                    .iter()
                    .map(|r| DohResponse {
                        path_regex: r.expression.clone(),
                        status: r.status,
                        content: r.content.clone(),
                        headers: r
                            .headers
                            .iter()
                            .map(|h| (h.key.clone(), h.value.clone()))
                            .collect(),
                    })
                    .collect(),
                plain_http,
            })
        }
        DnsProtocol::DoH3 => {
            require_feature(features.doh3, "DNS over HTTP/3", context)?;
            ListenerExtension::Doh3 {
                paths: bind.doh.paths.clone(),
                quic: quic_params(&bind.quic, context),
            }
        }
        DnsProtocol::DoQ => {
            require_feature(features.doq, "DNS over QUIC", context)?;
            ListenerExtension::Doq(quic_params(&bind.quic, context))
        }
        DnsProtocol::DnsCrypt => {
            require_feature(features.dnscrypt, "DNSCrypt", context)?;
            if bind.dnscrypt.provider_name.is_empty() {
                return Err(DomainError::validation(
                    context,
                    "DNSCrypt needs a provider name",
                ));
            }
            ListenerExtension::DnsCrypt(DnsCryptParams {
                provider_name: bind.dnscrypt.provider_name.clone(),
                certificates: bind
                    .dnscrypt
                    .certificates
                    .iter()
                    .map(|c| (c.certificate.clone(), c.key.clone()))
                    .collect(),
            })
        }
    };
    Ok(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_list_parses_whitespace_separated_indexes() {
        assert_eq!(parse_cpu_list("0 1  3", "bind").unwrap(), vec![0, 1, 3]);
        assert!(parse_cpu_list("", "bind").unwrap().is_empty());
    }

    #[test]
    fn test_cpu_list_rejects_garbage() {
        let err = parse_cpu_list("0 one", "bind '0.0.0.0'").unwrap_err();
        assert!(err.to_string().contains("invalid CPU index 'one'"));
    }
}
