use ferrous_proxy_domain::config::{DynamicRuleConfig, DynamicRulesConfig};
use ferrous_proxy_domain::dynblock::{RateThreshold, RatioThreshold};
use ferrous_proxy_domain::{
    Detector, DnsActionKind, DnsName, DomainError, DynamicBlockGroup, DynamicBlockKind,
    DynamicBlockRule, QType, RCode, ScriptFlavour, TagSettings,
};
use tracing::{debug, info, warn};

use super::context::LoadContext;
use super::scripting::{resolve_function, ScriptSource};

/// Builds every dynamic block group. Group-level settings are strict, a
/// broken rule only costs that rule.
pub fn build_dynamic_groups(
    ctx: &LoadContext<'_>,
    groups: &[DynamicRulesConfig],
) -> Result<Vec<DynamicBlockGroup>, DomainError> {
    let mut built = Vec::with_capacity(groups.len());
    for (index, config) in groups.iter().enumerate() {
        let context = if config.name.is_empty() {
            format!("dynamic_rules[{}]", index)
        } else {
            format!("dynamic rules '{}'", config.name)
        };
        let group = build_group(ctx, config, &context)?;
        info!(
            group = %context,
            rules = group.rules.len(),
            "Dynamic block group loaded"
        );
        built.push(group);
    }
    Ok(built)
}

fn build_group(
    ctx: &LoadContext<'_>,
    config: &DynamicRulesConfig,
    context: &str,
) -> Result<DynamicBlockGroup, DomainError> {
    if config.mask_ipv4 > 32 || config.mask_ipv6 > 128 || config.mask_port > 16 {
        return Err(DomainError::validation(
            context,
            format!(
                "masks out of range (v4 {}, v6 {}, port {})",
                config.mask_ipv4, config.mask_ipv6, config.mask_port
            ),
        ));
    }

    let mut group = DynamicBlockGroup {
        v4_mask: config.mask_ipv4,
        v6_mask: config.mask_ipv6,
        port_mask: config.mask_port,
        ..DynamicBlockGroup::default()
    };
    for range in &config.exclude_ranges {
        group
            .exclude_ranges
            .add_mask(range)
            .map_err(|e| DomainError::validation(context, e))?;
    }
    for range in &config.include_ranges {
        group
            .include_ranges
            .add_mask(range)
            .map_err(|e| DomainError::validation(context, e))?;
    }
    for domain in &config.exclude_domains {
        let name = domain
            .parse::<DnsName>()
            .map_err(|e| DomainError::validation(context, e))?;
        group.excluded_domains.add(name);
    }

    for rule in &config.rules {
        let Ok(kind) = rule.rule_type.parse::<DynamicBlockKind>() else {
            debug!(group = %context, rule_type = %rule.rule_type, "Skipping unknown dynamic rule type");
            continue;
        };
        match build_rule(ctx, kind, rule, context) {
            Ok(built) => group.rules.push(built),
            Err(e) => {
                warn!(group = %context, rule_type = %kind, error = %e, "Skipping dynamic rule");
            }
        }
    }
    Ok(group)
}

/// Builds one rule of a known kind.
pub fn build_rule(
    ctx: &LoadContext<'_>,
    kind: DynamicBlockKind,
    config: &DynamicRuleConfig,
    group_context: &str,
) -> Result<DynamicBlockRule, DomainError> {
    let context = format!("{} {} rule", group_context, kind);
    let action = if config.action.is_empty() {
        DnsActionKind::None
    } else {
        config
            .action
            .parse::<DnsActionKind>()
            .map_err(|e| DomainError::validation(&context, e))?
    };
    let tag = (action == DnsActionKind::SetTag && !config.tag_name.is_empty()).then(|| {
        TagSettings {
            tag_name: config.tag_name.clone(),
            tag_value: config.tag_value.clone(),
        }
    });

    let rate = RateThreshold {
        rate: config.rate,
        warning_rate: config.warning_rate,
    };
    let ratio = RatioThreshold {
        ratio: config.ratio,
        warning_ratio: config.warning_ratio,
        minimum_number_of_responses: config.minimum_number_of_responses,
    };
    let parse_rcode = || {
        config
            .rcode
            .parse::<RCode>()
            .map_err(|e| DomainError::validation(&context, e))
    };

    let detector = match kind {
        DynamicBlockKind::QueryRate => Detector::QueryRate(rate),
        DynamicBlockKind::RCodeRate => Detector::RCodeRate {
            rcode: parse_rcode()?,
            threshold: rate,
        },
        DynamicBlockKind::RCodeRatio => Detector::RCodeRatio {
            rcode: parse_rcode()?,
            threshold: ratio,
        },
        DynamicBlockKind::QTypeRate => Detector::QTypeRate {
            qtype: config
                .qtype
                .parse::<QType>()
                .map_err(|e| DomainError::validation(&context, e))?,
            threshold: rate,
        },
        DynamicBlockKind::CacheMissRatio => Detector::CacheMissRatio {
            threshold: ratio,
            minimum_global_cache_hit_ratio: config.minimum_global_cache_hit_ratio,
        },
        DynamicBlockKind::ResponseByteRate => Detector::ResponseByteRate(rate),
        DynamicBlockKind::SuffixMatch | DynamicBlockKind::SuffixMatchFfi => {
            let ffi = kind == DynamicBlockKind::SuffixMatchFfi;
            let flavour = if ffi {
                ScriptFlavour::Ffi
            } else {
                ScriptFlavour::Native
            };
            let visitor = resolve_function(
                ctx,
                flavour,
                ScriptSource::new(
                    &config.visitor_function_name,
                    &config.visitor_function_code,
                    &config.visitor_function_file,
                ),
                &context,
            )?;
            Detector::SuffixMatch { visitor, ffi }
        }
    };

    Ok(DynamicBlockRule {
        comment: config.comment.clone(),
        seconds: config.seconds,
        action_duration: config.action_duration,
        action,
        tag,
        detector,
    })
}
