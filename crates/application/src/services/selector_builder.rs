use ferrous_proxy_domain::config::{SelectorConfig, SelectorKindConfig};
use ferrous_proxy_domain::objects::{KeyValueStore, LookupKey};
use ferrous_proxy_domain::selector::KvsBinding;
use ferrous_proxy_domain::{
    DnsName, DnsNameSet, DomainError, NetmaskGroup, QType, ScriptFlavour, SelectorId,
    SelectorNode, SuffixMatchNode,
};
use std::sync::Arc;
use tracing::debug;

use super::context::LoadContext;
use super::scripting::{resolve_function, ScriptSource};

/// Builds every entry of the `selectors` section. Each one is registered,
/// under a generated name when it has none.
pub fn declare_selectors(
    ctx: &mut LoadContext<'_>,
    selectors: &[SelectorConfig],
) -> Result<(), DomainError> {
    for config in selectors {
        let id = build_node(ctx, config)?;
        if !matches!(config.kind, SelectorKindConfig::ByName { .. }) {
            let name = ctx.registry.register(&config.name, id)?;
            debug!(selector = %name, "Declared selector");
        }
    }
    Ok(())
}

/// Builds a selector embedded in another declaration. It is registered only
/// when it carries a name.
pub fn build_selector(
    ctx: &mut LoadContext<'_>,
    config: &SelectorConfig,
) -> Result<SelectorId, DomainError> {
    let id = build_node(ctx, config)?;
    if !config.name.is_empty() && !matches!(config.kind, SelectorKindConfig::ByName { .. }) {
        ctx.registry.register(&config.name, id)?;
    }
    Ok(id)
}

fn describe(config: &SelectorConfig, type_name: &str) -> String {
    if config.name.is_empty() {
        format!("{} selector", type_name)
    } else {
        format!("{} selector '{}'", type_name, config.name)
    }
}

fn parse_name(raw: &str, context: &str) -> Result<DnsName, DomainError> {
    raw.parse::<DnsName>()
        .map_err(|e| DomainError::validation(context, e))
}

pub(crate) fn kvs_binding(
    ctx: &LoadContext<'_>,
    kvs_name: &str,
    lookup_key_name: &str,
    context: &str,
) -> Result<KvsBinding, DomainError> {
    let store = ctx.resolve::<Arc<KeyValueStore>>(kvs_name, context)?;
    let key = ctx.resolve::<Arc<LookupKey>>(lookup_key_name, context)?;
    Ok(KvsBinding {
        store_name: kvs_name.to_string(),
        key_name: lookup_key_name.to_string(),
        store,
        key,
    })
}

fn build_node(
    ctx: &mut LoadContext<'_>,
    config: &SelectorConfig,
) -> Result<SelectorId, DomainError> {
    let node = match &config.kind {
        SelectorKindConfig::All => SelectorNode::All,
        SelectorKindConfig::QName { qname } => {
            SelectorNode::QName(parse_name(qname, &describe(config, "qname"))?)
        }
        SelectorKindConfig::QnameSet { qnames } => {
            let context = describe(config, "qname-set");
            let names = qnames
                .iter()
                .map(|raw| parse_name(raw, &context))
                .collect::<Result<DnsNameSet, _>>()?;
            SelectorNode::QNameSet(names)
        }
        SelectorKindConfig::QnameSuffix { suffixes, quiet } => {
            let context = describe(config, "qname-suffix");
            let mut node = SuffixMatchNode::new();
            for raw in suffixes {
                node.add(parse_name(raw, &context)?);
            }
            SelectorNode::QNameSuffix {
                suffixes: node,
                quiet: *quiet,
            }
        }
        SelectorKindConfig::Qtype { qtype } => {
            let qtype = qtype
                .parse::<QType>()
                .map_err(|e| DomainError::validation(describe(config, "qtype"), e))?;
            SelectorNode::QType(qtype)
        }
        SelectorKindConfig::Tag { tag, value } => SelectorNode::Tag {
            tag: tag.clone(),
            value: (!value.is_empty()).then(|| value.clone()),
        },
        SelectorKindConfig::NetmaskGroup {
            netmask_group_name,
            netmasks,
            source,
            quiet,
        } => {
            let context = describe(config, "netmask-group");
            // the registered group is copied, extra masks never leak into it
            let mut group = if netmask_group_name.is_empty() {
                NetmaskGroup::new()
            } else {
                ctx.resolve::<Arc<NetmaskGroup>>(netmask_group_name, &context)?
                    .map(|shared| (*shared).clone())
                    .unwrap_or_default()
            };
            for mask in netmasks {
                group
                    .add_mask(mask)
                    .map_err(|e| DomainError::validation(&context, e))?;
            }
            SelectorNode::Netmask {
                group,
                use_source: *source,
                quiet: *quiet,
            }
        }
        SelectorKindConfig::KvsLookup {
            kvs_name,
            lookup_key_name,
        } => SelectorNode::KvsLookup(kvs_binding(
            ctx,
            kvs_name,
            lookup_key_name,
            &describe(config, "kvs-lookup"),
        )?),
        SelectorKindConfig::KvsRangeLookup {
            kvs_name,
            lookup_key_name,
        } => SelectorNode::KvsRangeLookup(kvs_binding(
            ctx,
            kvs_name,
            lookup_key_name,
            &describe(config, "kvs-range-lookup"),
        )?),
        SelectorKindConfig::Lua(source) => SelectorNode::Script(resolve_function(
            ctx,
            ScriptFlavour::Native,
            ScriptSource::from(source),
            &describe(config, "lua"),
        )?),
        SelectorKindConfig::LuaFfi(source) => SelectorNode::Script(resolve_function(
            ctx,
            ScriptFlavour::Ffi,
            ScriptSource::from(source),
            &describe(config, "lua-ffi"),
        )?),
        SelectorKindConfig::And { selectors } => {
            SelectorNode::And(build_children(ctx, selectors)?)
        }
        SelectorKindConfig::Or { selectors } => SelectorNode::Or(build_children(ctx, selectors)?),
        SelectorKindConfig::Not { selector } => SelectorNode::Not(build_selector(ctx, selector)?),
        SelectorKindConfig::ByName { selector_name } => {
            return ctx.require::<SelectorId>(selector_name, &describe(config, "by-name"));
        }
    };
    Ok(ctx.selectors.push(node))
}

fn build_children(
    ctx: &mut LoadContext<'_>,
    children: &[SelectorConfig],
) -> Result<Vec<SelectorId>, DomainError> {
    children
        .iter()
        .map(|child| build_selector(ctx, child))
        .collect()
}
