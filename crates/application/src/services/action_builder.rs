use ferrous_proxy_domain::action::{
    DnstapLogSettings, LoggerBinding, RemoteLogSettings, ResponseConfig,
};
use ferrous_proxy_domain::config::{
    ActionConfig, ActionKindConfig, DnstapLogActionConfig, RemoteLogActionConfig,
    ResponseActionConfig, ResponseActionKindConfig, SpoofVarsConfig,
};
use ferrous_proxy_domain::objects::{RemoteLogger, DNS_HEADER_SIZE};
use ferrous_proxy_domain::{
    Action, DnsName, DomainError, QType, RCode, ResponseAction, ScriptFlavour,
};
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use super::context::LoadContext;
use super::scripting::{resolve_function, resolve_optional_function, ScriptSource};
use super::selector_builder::kvs_binding;

/// Builds and registers the `actions` section.
pub fn declare_actions(
    ctx: &mut LoadContext<'_>,
    actions: &[ActionConfig],
) -> Result<(), DomainError> {
    for config in actions {
        let action = build_unregistered_action(ctx, config)?;
        if !matches!(config.kind, ActionKindConfig::ByName { .. }) {
            let name = ctx.registry.register(&config.name, action)?;
            debug!(action = %name, "Declared action");
        }
    }
    Ok(())
}

/// Builds and registers the `response_actions` section.
pub fn declare_response_actions(
    ctx: &mut LoadContext<'_>,
    actions: &[ResponseActionConfig],
) -> Result<(), DomainError> {
    for config in actions {
        let action = build_unregistered_response_action(ctx, config)?;
        if !matches!(config.kind, ResponseActionKindConfig::ByName { .. }) {
            let name = ctx.registry.register(&config.name, action)?;
            debug!(action = %name, "Declared response action");
        }
    }
    Ok(())
}

/// Builds an action embedded in a rule, registering it when named.
pub fn build_action(
    ctx: &mut LoadContext<'_>,
    config: &ActionConfig,
) -> Result<Arc<Action>, DomainError> {
    let action = build_unregistered_action(ctx, config)?;
    if !config.name.is_empty() && !matches!(config.kind, ActionKindConfig::ByName { .. }) {
        ctx.registry.register(&config.name, action.clone())?;
    }
    Ok(action)
}

pub fn build_response_action(
    ctx: &mut LoadContext<'_>,
    config: &ResponseActionConfig,
) -> Result<Arc<ResponseAction>, DomainError> {
    let action = build_unregistered_response_action(ctx, config)?;
    if !config.name.is_empty() && !matches!(config.kind, ResponseActionKindConfig::ByName { .. })
    {
        ctx.registry.register(&config.name, action.clone())?;
    }
    Ok(action)
}

fn describe(name: &str, type_name: &str) -> String {
    if name.is_empty() {
        format!("{} action", type_name)
    } else {
        format!("{} action '{}'", type_name, name)
    }
}

fn response_config(vars: &SpoofVarsConfig) -> ResponseConfig {
    let defaults = ResponseConfig::default();
    ResponseConfig {
        set_aa: vars.set_aa,
        set_ad: vars.set_ad,
        set_ra: vars.set_ra,
        ttl: vars.ttl.unwrap_or(defaults.ttl),
    }
}

fn parse_qtypes(raw: &[String], context: &str) -> Result<BTreeSet<QType>, DomainError> {
    raw.iter()
        .map(|t| {
            t.parse::<QType>()
                .map_err(|e| DomainError::validation(context, e))
        })
        .collect()
}

fn logger_binding(
    ctx: &LoadContext<'_>,
    logger_name: &str,
    context: &str,
) -> Result<LoggerBinding, DomainError> {
    Ok(LoggerBinding {
        name: logger_name.to_string(),
        logger: ctx.resolve::<Arc<RemoteLogger>>(logger_name, context)?,
    })
}

fn remote_log_settings(
    ctx: &LoadContext<'_>,
    config: &RemoteLogActionConfig,
    context: &str,
) -> Result<RemoteLogSettings, DomainError> {
    Ok(RemoteLogSettings {
        logger: logger_binding(ctx, &config.logger_name, context)?,
        alter_function: resolve_optional_function(
            ctx,
            ScriptFlavour::Native,
            ScriptSource::new(
                &config.alter_function_name,
                &config.alter_function_code,
                &config.alter_function_file,
            ),
            context,
        )?,
        server_id: config.server_id.clone(),
        ip_encrypt_key: config.ip_encrypt_key.clone(),
        export_tags: config.export_tags.clone(),
        metas: config
            .metas
            .iter()
            .map(|meta| (meta.key.clone(), meta.value.clone()))
            .collect(),
    })
}

fn dnstap_settings(
    ctx: &LoadContext<'_>,
    config: &DnstapLogActionConfig,
    context: &str,
) -> Result<DnstapLogSettings, DomainError> {
    Ok(DnstapLogSettings {
        identity: config.identity.clone(),
        logger: logger_binding(ctx, &config.logger_name, context)?,
        alter_function: resolve_optional_function(
            ctx,
            ScriptFlavour::Native,
            ScriptSource::new(
                &config.alter_function_name,
                &config.alter_function_code,
                &config.alter_function_file,
            ),
            context,
        )?,
    })
}

fn build_unregistered_action(
    ctx: &mut LoadContext<'_>,
    config: &ActionConfig,
) -> Result<Arc<Action>, DomainError> {
    let name = config.name.as_str();
    let action = match &config.kind {
        ActionKindConfig::Allow => Action::Allow,
        ActionKindConfig::Drop => Action::Drop,
        ActionKindConfig::NoOp => Action::NoOp,
        ActionKindConfig::Truncate => Action::Truncate,
        ActionKindConfig::NoRecurse => Action::NoRecurse,
        ActionKindConfig::SetDisableValidation => Action::SetDisableValidation,
        ActionKindConfig::Rcode { rcode } => Action::Rcode(
            rcode
                .parse::<RCode>()
                .map_err(|e| DomainError::validation(describe(name, "rcode"), e))?,
        ),
        ActionKindConfig::Pool {
            pool_name,
            stop_processing,
        } => Action::Pool {
            pool_name: pool_name.clone(),
            stop_processing: *stop_processing,
        },
        ActionKindConfig::Delay { msec } => Action::Delay { msec: *msec },
        ActionKindConfig::SetTag { tag, value } => Action::SetTag {
            tag: tag.clone(),
            value: value.clone(),
        },
        ActionKindConfig::Spoof { ips, vars } => {
            let context = describe(name, "spoof");
            let ips = ips
                .iter()
                .map(|ip| {
                    ip.parse::<IpAddr>().map_err(|e| {
                        DomainError::validation(&context, format!("invalid address '{}': {}", ip, e))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Action::Spoof {
                ips,
                response: response_config(vars),
            }
        }
        ActionKindConfig::SpoofCname { cname, vars } => Action::SpoofCname {
            cname: cname
                .parse::<DnsName>()
                .map_err(|e| DomainError::validation(describe(name, "spoof-cname"), e))?,
            response: response_config(vars),
        },
        ActionKindConfig::SpoofRaw {
            answers,
            qtype_for_any,
            vars,
        } => {
            let qtype_for_any = if qtype_for_any.is_empty() {
                None
            } else {
                Some(
                    qtype_for_any
                        .parse::<QType>()
                        .map_err(|e| DomainError::validation(describe(name, "spoof-raw"), e))?,
                )
            };
            Action::SpoofRaw {
                answers: answers.iter().map(|a| a.as_bytes().to_vec()).collect(),
                qtype_for_any,
                response: response_config(vars),
            }
        }
        ActionKindConfig::SpoofPacket { response, len } => {
            let context = describe(name, "spoof-packet");
            let bytes = response.as_bytes();
            let len = len.unwrap_or(bytes.len());
            if len < DNS_HEADER_SIZE {
                return Err(DomainError::validation(
                    context,
                    format!(
                        "response size {} is smaller than a DNS header ({} bytes)",
                        len, DNS_HEADER_SIZE
                    ),
                ));
            }
            let packet = bytes.get(..len).ok_or_else(|| {
                DomainError::validation(
                    &context,
                    format!("size {} exceeds the {} bytes of the response", len, bytes.len()),
                )
            })?;
            Action::SpoofPacket {
                packet: packet.to_vec(),
            }
        }
        ActionKindConfig::SetProxyProtocolValues { values } => Action::SetProxyProtocolValues(
            values
                .iter()
                .map(|v| (v.key, v.value.clone()))
                .collect(),
        ),
        ActionKindConfig::KvsLookup {
            kvs_name,
            lookup_key_name,
            destination_tag,
        } => Action::KvsLookup {
            binding: kvs_binding(ctx, kvs_name, lookup_key_name, &describe(name, "kvs-lookup"))?,
            destination_tag: destination_tag.clone(),
        },
        ActionKindConfig::KvsRangeLookup {
            kvs_name,
            lookup_key_name,
            destination_tag,
        } => Action::KvsRangeLookup {
            binding: kvs_binding(
                ctx,
                kvs_name,
                lookup_key_name,
                &describe(name, "kvs-range-lookup"),
            )?,
            destination_tag: destination_tag.clone(),
        },
        ActionKindConfig::RemoteLog(remote) => {
            Action::RemoteLog(remote_log_settings(ctx, remote, &describe(name, "remote-log"))?)
        }
        ActionKindConfig::DnstapLog(dnstap) => {
            Action::DnstapLog(dnstap_settings(ctx, dnstap, &describe(name, "dnstap-log"))?)
        }
        ActionKindConfig::Lua(source) => Action::Script(resolve_function(
            ctx,
            ScriptFlavour::Native,
            ScriptSource::from(source),
            &describe(name, "lua"),
        )?),
        ActionKindConfig::LuaFfi(source) => Action::Script(resolve_function(
            ctx,
            ScriptFlavour::Ffi,
            ScriptSource::from(source),
            &describe(name, "lua-ffi"),
        )?),
        ActionKindConfig::Continue { action } => Action::Continue(build_action(ctx, action)?),
        ActionKindConfig::ByName { action_name } => {
            return ctx.require::<Arc<Action>>(action_name, &describe(name, "by-name"));
        }
    };
    Ok(Arc::new(action))
}

fn build_unregistered_response_action(
    ctx: &mut LoadContext<'_>,
    config: &ResponseActionConfig,
) -> Result<Arc<ResponseAction>, DomainError> {
    let name = config.name.as_str();
    let action = match &config.kind {
        ResponseActionKindConfig::Allow => ResponseAction::Allow,
        ResponseActionKindConfig::Drop => ResponseAction::Drop,
        ResponseActionKindConfig::NoOp => ResponseAction::NoOp,
        ResponseActionKindConfig::ServFail => ResponseAction::ServFail,
        ResponseActionKindConfig::Delay { msec } => ResponseAction::Delay { msec: *msec },
        ResponseActionKindConfig::SetTag { tag, value } => ResponseAction::SetTag {
            tag: tag.clone(),
            value: value.clone(),
        },
        ResponseActionKindConfig::ClearRecordTypes { types } => ResponseAction::ClearRecordTypes(
            parse_qtypes(types, &describe(name, "clear-record-types"))?,
        ),
        ResponseActionKindConfig::LimitTtl { min, max, types } => {
            let context = describe(name, "limit-ttl");
            if min > max {
                return Err(DomainError::validation(
                    context,
                    format!("minimum TTL {} is above maximum TTL {}", min, max),
                ));
            }
            ResponseAction::LimitTtl {
                min: *min,
                max: *max,
                types: parse_qtypes(types, &context)?,
            }
        }
        ResponseActionKindConfig::SetMinTtl { min } => ResponseAction::SetMinTtl(*min),
        ResponseActionKindConfig::SetMaxTtl { max } => ResponseAction::SetMaxTtl(*max),
        ResponseActionKindConfig::RemoteLog(remote) => ResponseAction::RemoteLog {
            settings: remote_log_settings(ctx, remote, &describe(name, "remote-log"))?,
            include_cname: remote.include_cname,
            export_extended_errors_to_meta: remote.export_extended_errors_to_meta.clone(),
        },
        ResponseActionKindConfig::DnstapLog(dnstap) => {
            ResponseAction::DnstapLog(dnstap_settings(ctx, dnstap, &describe(name, "dnstap-log"))?)
        }
        ResponseActionKindConfig::Lua(source) => ResponseAction::Script(resolve_function(
            ctx,
            ScriptFlavour::Native,
            ScriptSource::from(source),
            &describe(name, "lua"),
        )?),
        ResponseActionKindConfig::LuaFfi(source) => ResponseAction::Script(resolve_function(
            ctx,
            ScriptFlavour::Ffi,
            ScriptSource::from(source),
            &describe(name, "lua-ffi"),
        )?),
        ResponseActionKindConfig::ByName { action_name } => {
            return ctx.require::<Arc<ResponseAction>>(action_name, &describe(name, "by-name"));
        }
    };
    Ok(Arc::new(action))
}
