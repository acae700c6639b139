use ferrous_proxy_domain::config::{Config, QueryRuleConfig, ResponseRuleConfig};
use ferrous_proxy_domain::{ChainKind, DomainError, Rule, RuleChain, RuleChains};
use tracing::{debug, info};
use uuid::Uuid;

use super::action_builder::{build_action, build_response_action};
use super::context::LoadContext;
use super::selector_builder::build_selector;

/// Builds the seven rule chains. The first failing rule aborts the whole pass.
pub fn assemble_chains(
    ctx: &mut LoadContext<'_>,
    config: &Config,
) -> Result<RuleChains, DomainError> {
    let mut chains = RuleChains::default();
    chains.query = assemble_query_chain(ctx, ChainKind::Query, &config.query_rules)?;
    chains.cache_miss = assemble_query_chain(ctx, ChainKind::CacheMiss, &config.cache_miss_rules)?;
    chains.response = assemble_response_chain(ctx, ChainKind::Response, &config.response_rules)?;
    chains.cache_hit_response = assemble_response_chain(
        ctx,
        ChainKind::CacheHitResponse,
        &config.cache_hit_response_rules,
    )?;
    chains.cache_inserted_response = assemble_response_chain(
        ctx,
        ChainKind::CacheInsertedResponse,
        &config.cache_inserted_response_rules,
    )?;
    chains.self_answered_response = assemble_response_chain(
        ctx,
        ChainKind::SelfAnsweredResponse,
        &config.self_answered_response_rules,
    )?;
    chains.xfr_response = assemble_response_chain(
        ctx,
        ChainKind::XfrResponse,
        &config.xfr_response_rules,
    )?;

    info!(rules = chains.total_rules(), "Rule chains assembled");
    Ok(chains)
}

/// Parses an explicit rule identity, or generates one when none is given.
pub fn rule_identity(raw: &str, context: &str) -> Result<Uuid, DomainError> {
    if raw.is_empty() {
        return Ok(Uuid::new_v4());
    }
    Uuid::parse_str(raw)
        .map_err(|e| DomainError::validation(context, format!("invalid rule UUID '{}': {}", raw, e)))
}

fn rule_context(kind: ChainKind, index: usize, name: &str) -> String {
    if name.is_empty() {
        format!("{}[{}]", kind.section(), index)
    } else {
        format!("{} rule '{}'", kind.section(), name)
    }
}

fn assemble_query_chain(
    ctx: &mut LoadContext<'_>,
    kind: ChainKind,
    declarations: &[QueryRuleConfig],
) -> Result<RuleChain<ferrous_proxy_domain::Action>, DomainError> {
    let mut chain = RuleChain::new(kind);
    for (index, declaration) in declarations.iter().enumerate() {
        let context = rule_context(kind, index, &declaration.name);
        let id = rule_identity(&declaration.uuid, &context)?;
        if chain.contains_id(&id) {
            debug!(chain = %kind, uuid = %id, "Rule identity already present in chain");
        }
        let selector = build_selector(ctx, &declaration.selector)?;
        let action = build_action(ctx, &declaration.action)?;
        chain.push(Rule {
            id,
            name: declaration.name.clone(),
            priority: declaration.priority,
            selector,
            action,
        });
    }
    debug!(chain = %kind, rules = chain.len(), "Chain loaded");
    Ok(chain)
}

fn assemble_response_chain(
    ctx: &mut LoadContext<'_>,
    kind: ChainKind,
    declarations: &[ResponseRuleConfig],
) -> Result<RuleChain<ferrous_proxy_domain::ResponseAction>, DomainError> {
    let mut chain = RuleChain::new(kind);
    for (index, declaration) in declarations.iter().enumerate() {
        let context = rule_context(kind, index, &declaration.name);
        let id = rule_identity(&declaration.uuid, &context)?;
        if chain.contains_id(&id) {
            debug!(chain = %kind, uuid = %id, "Rule identity already present in chain");
        }
        let selector = build_selector(ctx, &declaration.selector)?;
        let action = build_response_action(ctx, &declaration.action)?;
        chain.push(Rule {
            id,
            name: declaration.name.clone(),
            priority: declaration.priority,
            selector,
            action,
        });
    }
    debug!(chain = %kind, rules = chain.len(), "Chain loaded");
    Ok(chain)
}
