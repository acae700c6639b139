use ferrous_proxy_domain::config::objects::{DnstapLoggerConfig, ProtobufLoggerConfig};
use ferrous_proxy_domain::config::{
    CustomLoadBalancingPolicyConfig, EbpfConfig, KeyValueStoresConfig, NetmaskGroupConfig,
    PacketCacheConfig, PoolConfig, RemoteLoggingConfig, XskConfig,
};
use ferrous_proxy_domain::objects::{
    BuiltinPolicy, DnstapTransport, EbpfFilter, EbpfMap, EbpfMapFormat, EbpfMapKind,
    FrameStreamOptions, KeyValueBackend, KeyValueStore, LoadBalancingPolicy, LookupKey,
    LookupKeyKind, PacketCache, PacketCacheSettings, RemoteLogger, RemoteLoggerKind, ServerPool,
    XskMap, DNS_HEADER_SIZE, EDNS_OPTION_COOKIE,
};
use ferrous_proxy_domain::{DomainError, NetmaskGroup, ScriptFlavour};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::context::LoadContext;
use super::scripting::{resolve_function, ScriptSource};

fn require_feature(enabled: bool, feature: &str, name: &str) -> Result<(), DomainError> {
    if enabled {
        Ok(())
    } else {
        Err(DomainError::UnsupportedFeature(format!(
            "{} '{}' cannot be created, support is not compiled in",
            feature, name
        )))
    }
}

/// Registers the shipped load-balancing policies under their own names.
pub fn declare_builtin_policies(ctx: &LoadContext<'_>) -> Result<(), DomainError> {
    for policy in BuiltinPolicy::ALL {
        ctx.registry
            .register(policy.as_str(), Arc::new(LoadBalancingPolicy::Builtin(policy)))?;
    }
    Ok(())
}

pub fn declare_netmask_groups(
    ctx: &LoadContext<'_>,
    groups: &[NetmaskGroupConfig],
) -> Result<(), DomainError> {
    for config in groups {
        let context = format!("netmask group '{}'", config.name);
        let mut group = NetmaskGroup::new();
        for mask in &config.netmasks {
            group
                .add_mask(mask)
                .map_err(|e| DomainError::validation(&context, e))?;
        }
        let name = ctx.registry.register(&config.name, Arc::new(group))?;
        debug!(group = %name, masks = config.netmasks.len(), "Netmask group declared");
    }
    Ok(())
}

/// Registers key-value stores, then their lookup keys.
pub fn declare_key_value_stores(
    ctx: &LoadContext<'_>,
    config: &KeyValueStoresConfig,
) -> Result<(), DomainError> {
    let features = &ctx.ports.features;
    for lmdb in &config.lmdb {
        require_feature(features.lmdb, "LMDB key-value store", &lmdb.name)?;
        let store = KeyValueStore {
            name: lmdb.name.clone(),
            backend: KeyValueBackend::Lmdb {
                file_name: lmdb.file_name.clone(),
                database_name: lmdb.database_name.clone(),
                no_lock: lmdb.no_lock,
            },
        };
        ctx.registry.register(&lmdb.name, Arc::new(store))?;
    }
    for cdb in &config.cdb {
        require_feature(features.cdb, "CDB key-value store", &cdb.name)?;
        let store = KeyValueStore {
            name: cdb.name.clone(),
            backend: KeyValueBackend::Cdb {
                file_name: cdb.file_name.clone(),
                refresh_delay: cdb.refresh_delay,
            },
        };
        ctx.registry.register(&cdb.name, Arc::new(store))?;
    }

    let keys = &config.lookup_keys;
    let mut declared = Vec::new();
    for key in &keys.source_ip_keys {
        if key.v4_mask > 32 || key.v6_mask > 128 {
            return Err(DomainError::validation(
                format!("source IP lookup key '{}'", key.name),
                format!("masks out of range (v4 {}, v6 {})", key.v4_mask, key.v6_mask),
            ));
        }
        declared.push((
            key.name.clone(),
            LookupKeyKind::SourceIp {
                v4_mask: key.v4_mask,
                v6_mask: key.v6_mask,
                include_port: key.include_port,
            },
        ));
    }
    for key in &keys.qname_keys {
        declared.push((
            key.name.clone(),
            LookupKeyKind::QName {
                wire_format: key.wire_format,
            },
        ));
    }
    for key in &keys.suffix_keys {
        declared.push((
            key.name.clone(),
            LookupKeyKind::Suffix {
                minimum_labels: key.minimum_labels,
                wire_format: key.wire_format,
            },
        ));
    }
    for key in &keys.tag_keys {
        declared.push((key.name.clone(), LookupKeyKind::Tag { tag: key.tag.clone() }));
    }
    for (name, kind) in declared {
        ctx.registry
            .register(&name, Arc::new(LookupKey { name: name.clone(), kind }))?;
    }
    Ok(())
}

/// Registers remote loggers. Outside normal mode nothing ever connects, so
/// placeholders are registered instead.
pub fn declare_remote_loggers(
    ctx: &LoadContext<'_>,
    config: &RemoteLoggingConfig,
) -> Result<(), DomainError> {
    for logger in &config.protobuf_loggers {
        let kind = protobuf_logger(ctx, logger)?;
        ctx.registry.register(
            &logger.name,
            Arc::new(RemoteLogger {
                name: logger.name.clone(),
                kind,
            }),
        )?;
    }
    for logger in &config.dnstap_loggers {
        let kind = dnstap_logger(ctx, logger)?;
        ctx.registry.register(
            &logger.name,
            Arc::new(RemoteLogger {
                name: logger.name.clone(),
                kind,
            }),
        )?;
    }
    Ok(())
}

fn protobuf_logger(
    ctx: &LoadContext<'_>,
    config: &ProtobufLoggerConfig,
) -> Result<RemoteLoggerKind, DomainError> {
    require_feature(ctx.ports.features.protobuf, "protobuf logger", &config.name)?;
    if !ctx.mode.activates() {
        return Ok(RemoteLoggerKind::Placeholder);
    }
    let address = config.address.parse::<SocketAddr>().map_err(|e| {
        DomainError::validation(
            format!("protobuf logger '{}'", config.name),
            format!("invalid address '{}': {}", config.address, e),
        )
    })?;
    Ok(RemoteLoggerKind::Protobuf {
        address,
        timeout: config.timeout,
        max_queued_entries: config.max_queued_entries,
        reconnect_wait_time: config.reconnect_wait_time,
    })
}

fn dnstap_logger(
    ctx: &LoadContext<'_>,
    config: &DnstapLoggerConfig,
) -> Result<RemoteLoggerKind, DomainError> {
    require_feature(ctx.ports.features.dnstap, "dnstap logger", &config.name)?;
    let transport = config
        .transport
        .parse::<DnstapTransport>()
        .map_err(|e| DomainError::validation(format!("dnstap logger '{}'", config.name), e))?;
    if !ctx.mode.activates() {
        return Ok(RemoteLoggerKind::Placeholder);
    }
    Ok(RemoteLoggerKind::Dnstap {
        transport,
        address: config.address.clone(),
        options: FrameStreamOptions {
            buffer_hint: config.buffer_hint,
            flush_timeout: config.flush_timeout,
            input_queue_size: config.input_queue_size,
            output_queue_size: config.output_queue_size,
            queue_notify_threshold: config.queue_notify_threshold,
            reopen_interval: config.reopen_interval,
        },
    })
}

/// Describes the default eBPF filter. Check-config runs never create one.
pub fn ebpf_filter(
    ctx: &LoadContext<'_>,
    config: &EbpfConfig,
) -> Result<Option<EbpfFilter>, DomainError> {
    if config.ipv4.max_entries == 0
        || config.ipv6.max_entries == 0
        || config.qnames.max_entries == 0
    {
        return Ok(None);
    }
    if !ctx.mode.activates() {
        debug!("Not creating the eBPF filter in this mode");
        return Ok(None);
    }
    require_feature(ctx.ports.features.ebpf, "eBPF filter", "default")?;

    let maps: Vec<EbpfMap> = [
        (EbpfMapKind::Ipv4, &config.ipv4),
        (EbpfMapKind::Ipv6, &config.ipv6),
        (EbpfMapKind::QNames, &config.qnames),
        (EbpfMapKind::Cidr4, &config.cidr_ipv4),
        (EbpfMapKind::Cidr6, &config.cidr_ipv6),
    ]
    .into_iter()
    .filter(|(_, map)| map.max_entries > 0)
    .map(|(kind, map)| EbpfMap {
        kind,
        max_entries: map.max_entries,
        pinned_path: map.pinned_path.clone(),
    })
    .collect();
    let format = if config.external {
        EbpfMapFormat::WithActions
    } else {
        EbpfMapFormat::Legacy
    };
    info!(maps = maps.len(), external = config.external, "eBPF filter configured");
    Ok(Some(EbpfFilter {
        format,
        external: config.external,
        maps,
    }))
}

pub fn declare_xsk_maps(
    ctx: &LoadContext<'_>,
    maps: &[XskConfig],
) -> Result<Vec<Arc<XskMap>>, DomainError> {
    let mut declared = Vec::with_capacity(maps.len());
    for config in maps {
        require_feature(ctx.ports.features.xsk, "XSK map", &config.name)?;
        if config.queues == 0 {
            return Err(DomainError::validation(
                format!("XSK map '{}'", config.name),
                "at least one queue is required",
            ));
        }
        let map = Arc::new(XskMap {
            name: config.name.clone(),
            interface: config.interface.clone(),
            queues: config.queues,
            frames: config.frames,
            map_path: config.map_path.clone(),
        });
        ctx.registry.register(&config.name, map.clone())?;
        declared.push(map);
    }
    Ok(declared)
}

/// Builds and registers packet caches, keyed by the name they were stored under.
pub fn declare_packet_caches(
    ctx: &LoadContext<'_>,
    caches: &[PacketCacheConfig],
) -> Result<BTreeMap<String, Arc<PacketCache>>, DomainError> {
    let mut declared = BTreeMap::new();
    for config in caches {
        let context = format!("packet cache '{}'", config.name);
        let mut options_to_skip = BTreeSet::new();
        for option in &config.options_to_skip {
            let code = option.parse::<u16>().map_err(|_| {
                DomainError::validation(&context, format!("invalid EDNS option code '{}'", option))
            })?;
            options_to_skip.insert(code);
        }
        if !config.cookie_hashing {
            options_to_skip.insert(EDNS_OPTION_COOKIE);
        }
        let defaults = PacketCacheSettings::default();
        let maximum_entry_size = if config.maximum_entry_size >= DNS_HEADER_SIZE {
            config.maximum_entry_size
        } else {
            warn!(cache = %config.name, size = config.maximum_entry_size, "Ignoring maximum entry size below DNS header size");
            defaults.maximum_entry_size
        };
        let settings = PacketCacheSettings {
            size: config.size,
            max_ttl: config.max_ttl,
            min_ttl: config.min_ttl,
            temporary_failure_ttl: config.temporary_failure_ttl,
            max_negative_ttl: config.max_negative_ttl,
            stale_ttl: config.stale_ttl,
            dont_age: config.dont_age,
            shards: config.shards,
            deferrable_insert_lock: config.deferrable_insert_lock,
            parse_ecs: config.parse_ecs,
            keep_stale_data: config.keep_stale_data,
            options_to_skip,
            maximum_entry_size,
        };
        let cache = Arc::new(PacketCache {
            name: config.name.clone(),
            settings,
        });
        let name = ctx.registry.register(&config.name, cache.clone())?;
        declared.insert(name, cache);
    }
    Ok(declared)
}

pub fn declare_custom_policies(
    ctx: &LoadContext<'_>,
    policies: &[CustomLoadBalancingPolicyConfig],
) -> Result<(), DomainError> {
    for config in policies {
        let context = format!("load-balancing policy '{}'", config.name);
        let policy = if config.ffi && config.per_thread {
            if config.function_code.is_empty() {
                return Err(DomainError::validation(
                    &context,
                    "per-thread policies need inline function code",
                ));
            }
            LoadBalancingPolicy::PerThread {
                name: config.name.clone(),
                code: config.function_code.clone(),
            }
        } else {
            let flavour = if config.ffi {
                ScriptFlavour::Ffi
            } else {
                ScriptFlavour::Native
            };
            let function = resolve_function(
                ctx,
                flavour,
                ScriptSource::new(
                    &config.function_name,
                    &config.function_code,
                    &config.function_file,
                ),
                &context,
            )?;
            LoadBalancingPolicy::Scripted {
                name: config.name.clone(),
                function,
            }
        };
        ctx.registry.register(&config.name, Arc::new(policy))?;
        debug!(policy = %config.name, "Custom load-balancing policy declared");
    }
    Ok(())
}

/// Resolves the policy used by pools without one.
pub fn resolve_default_policy(
    ctx: &LoadContext<'_>,
    name: &str,
) -> Result<Option<Arc<LoadBalancingPolicy>>, DomainError> {
    if name.is_empty() {
        return Ok(None);
    }
    ctx.resolve::<Arc<LoadBalancingPolicy>>(name, "default load-balancing policy")
}

/// Applies the `pools` section, creating pools no backend joined yet.
pub fn configure_pools(
    ctx: &LoadContext<'_>,
    configs: &[PoolConfig],
    pools: &mut BTreeMap<String, ServerPool>,
) -> Result<(), DomainError> {
    for config in configs {
        let context = format!("pool '{}'", config.name);
        let pool = pools
            .entry(config.name.clone())
            .or_insert_with(|| ServerPool::new(config.name.clone()));
        if !config.packet_cache.is_empty() {
            pool.packet_cache = ctx.resolve::<Arc<PacketCache>>(&config.packet_cache, &context)?;
        }
        if !config.policy.is_empty() {
            pool.policy = ctx.resolve::<Arc<LoadBalancingPolicy>>(&config.policy, &context)?;
        }
    }
    info!(pools = pools.len(), "Pools configured");
    Ok(())
}
