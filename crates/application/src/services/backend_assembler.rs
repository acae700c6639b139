use ferrous_proxy_domain::config::{BackendConfig, HealthCheckConfig, OutgoingTlsConfig};
use ferrous_proxy_domain::endpoint::{
    AutoUpgrade, DohBackendParams, LazyHealthCheck, TcpTimeouts, TlsClientParams,
};
use ferrous_proxy_domain::objects::{ServerPool, XskMap};
use ferrous_proxy_domain::{
    parse_socket_addr, Availability, BackendEndpoint, DnsName, DnsProtocol, DomainError,
    HealthCheckParams, LazyHealthCheckMode, QClass, QType, ScriptFlavour,
};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::context::LoadContext;
use super::frontend_assembler::parse_cpu_list;
use super::scripting::{resolve_optional_function, ScriptSource};

/// Pool every backend without explicit membership joins.
pub const DEFAULT_POOL: &str = "";

/// Builds every backend and records it in the pools it belongs to.
pub fn assemble_backends(
    ctx: &LoadContext<'_>,
    backends: &[BackendConfig],
    pools: &mut BTreeMap<String, ServerPool>,
) -> Result<Vec<Arc<BackendEndpoint>>, DomainError> {
    let mut built = Vec::with_capacity(backends.len());
    for config in backends {
        let Some(endpoint) = build_backend(ctx, config)? else {
            continue;
        };
        for pool in &endpoint.pools {
            pools
                .entry(pool.clone())
                .or_insert_with(|| ServerPool::new(pool.clone()))
                .backends
                .push(endpoint.id);
        }
        built.push(Arc::new(endpoint));
    }
    info!(backends = built.len(), "Backends assembled");
    Ok(built)
}

/// Builds one backend. `None` means its TLS context could not be built and
/// it asked for configuration errors to be ignored.
pub fn build_backend(
    ctx: &LoadContext<'_>,
    config: &BackendConfig,
) -> Result<Option<BackendEndpoint>, DomainError> {
    let context = if config.name.is_empty() {
        format!("backend '{}'", config.address)
    } else {
        format!("backend '{}'", config.name)
    };
    let protocol = config.protocol.parse::<DnsProtocol>().unwrap_or_else(|e| {
        warn!(backend = %context, error = %e, "Falling back to Do53");
        DnsProtocol::Do53
    });
    let address = parse_socket_addr(&config.address, protocol.default_port())
        .map_err(|e| DomainError::validation(&context, e))?;
    let id = if config.id.is_empty() {
        Uuid::new_v4()
    } else {
        Uuid::parse_str(&config.id).map_err(|e| {
            DomainError::validation(&context, format!("invalid id '{}': {}", config.id, e))
        })?
    };

    let tls = if protocol.requires_tls() {
        let params = client_tls_params(&config.tls, &context);
        if let Err(e) = ctx.ports.tls.validate_client(&params) {
            if !params.ignore_configuration_errors {
                return Err(DomainError::validation(&context, e));
            }
            warn!(backend = %context, protocol = %protocol, error = %e, "Skipping backend with invalid TLS configuration");
            return Ok(None);
        }
        Some(params)
    } else {
        None
    };

    let xsk_map = if config.xsk.is_empty() {
        None
    } else {
        ctx.resolve::<Arc<XskMap>>(&config.xsk, &context)?
            .map(|map| {
                debug!(backend = %context, map = %map.name, interface = %map.interface, "Backend attached to XSK map");
                map.name.clone()
            })
    };

    let doh = (protocol == DnsProtocol::DoH).then(|| DohBackendParams {
        path: config.doh.path.clone(),
        add_x_forwarded_headers: config.doh.add_x_forwarded_headers,
    });

    let auto_upgrade = (config.auto_upgrade.enabled && !protocol.requires_tls()).then(|| {
        AutoUpgrade {
            interval: config.auto_upgrade.interval,
            pool: config.auto_upgrade.pool.clone(),
            doh_key: config.auto_upgrade.doh_key,
            keep: config.auto_upgrade.keep,
            use_lazy_health_check: config.auto_upgrade.use_lazy_health_check,
        }
    });

    let pools = if config.pools.is_empty() {
        vec![DEFAULT_POOL.to_string()]
    } else {
        config.pools.clone()
    };

    let endpoint = BackendEndpoint {
        id,
        name: config.name.clone(),
        address,
        source: config.source.clone(),
        protocol,
        pools,
        order: config.order,
        weight: config.weight,
        sockets: config.sockets,
        qps: (config.queries_per_second > 0).then_some(config.queries_per_second),
        max_in_flight: config.max_in_flight,
        max_concurrent_tcp_connections: config.max_concurrent_tcp_connections,
        tcp_only: config.tcp_only,
        use_client_subnet: config.use_client_subnet,
        use_proxy_protocol: config.use_proxy_protocol,
        disable_zero_scope: config.disable_zero_scope,
        reconnect_on_up: config.reconnect_on_up,
        tcp_timeouts: TcpTimeouts {
            connect: config.tcp.connect_timeout,
            send: config.tcp.send_timeout,
            receive: config.tcp.receive_timeout,
        },
        cpus: parse_cpu_list(&config.cpus, &context)?,
        tls,
        doh,
        health_check: health_check_params(ctx, &config.health_checks, &context)?,
        auto_upgrade,
        xsk_map,
        activate: ctx.mode.activates(),
    };
    debug!(backend = %endpoint.display_name(), protocol = %protocol, "Backend loaded");
    Ok(Some(endpoint))
}

fn client_tls_params(config: &OutgoingTlsConfig, context: &str) -> TlsClientParams {
    let subject_address = if config.subject_address.is_empty() {
        None
    } else {
        match config.subject_address.parse::<IpAddr>() {
            Ok(ip) => Some(ip),
            Err(e) => {
                error!(backend = %context, subject_address = %config.subject_address, error = %e, "Ignoring invalid TLS subject address");
                None
            }
        }
    };
    TlsClientParams {
        provider: config.provider.clone(),
        subject_name: config.subject_name.clone(),
        subject_address,
        ciphers: config.ciphers.clone(),
        ciphers_tls_13: config.ciphers_tls_13.clone(),
        ca_store: config.ca_store.clone(),
        key_log_file: config.key_log_file.clone(),
        validate_certificate: config.validate_certificate,
        release_buffers: config.release_buffers,
        enable_renegotiation: config.enable_renegotiation,
        ktls: config.ktls,
        ignore_configuration_errors: config.ignore_configuration_errors,
    }
}

/// Captures active and lazy health-check settings.
pub fn health_check_params(
    ctx: &LoadContext<'_>,
    config: &HealthCheckConfig,
    context: &str,
) -> Result<HealthCheckParams, DomainError> {
    let availability = config
        .mode
        .parse::<Availability>()
        .map_err(|e| DomainError::validation(context, e))?;
    let qname = config
        .qname
        .parse::<DnsName>()
        .map_err(|e| DomainError::validation(context, e))?;
    let qtype = config
        .qtype
        .parse::<QType>()
        .map_err(|e| DomainError::validation(context, e))?;
    let qclass = config
        .qclass
        .parse::<QClass>()
        .map_err(|e| DomainError::validation(context, e))?;
    let function = resolve_optional_function(
        ctx,
        ScriptFlavour::Native,
        ScriptSource::new(&config.function, &config.lua, &config.lua_file),
        context,
    )?;

    let mode = if availability != Availability::Lazy {
        LazyHealthCheckMode::Disabled
    } else if config.lazy.mode.is_empty() {
        LazyHealthCheckMode::TimeoutOrServFail
    } else {
        config
            .lazy
            .mode
            .parse::<LazyHealthCheckMode>()
            .unwrap_or_else(|e| {
                warn!(backend = %context, error = %e, "Using TimeoutOrServFail lazy health-check mode");
                LazyHealthCheckMode::TimeoutOrServFail
            })
    };

    Ok(HealthCheckParams {
        availability,
        qname,
        qtype,
        qclass,
        timeout_ms: config.timeout,
        interval: config.interval,
        use_tcp: config.use_tcp,
        set_cd: config.set_cd,
        must_resolve: config.must_resolve,
        max_failures: config.max_failures,
        rise: config.rise,
        function,
        lazy: LazyHealthCheck {
            mode,
            sample_size: config.lazy.sample_size,
            min_sample_count: config.lazy.min_sample_count,
            threshold: config.lazy.threshold,
            interval: config.lazy.interval,
            use_exponential_back_off: config.lazy.use_exponential_back_off,
            max_back_off: config.lazy.max_back_off,
        },
    })
}
