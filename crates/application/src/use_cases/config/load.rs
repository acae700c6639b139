use ferrous_proxy_domain::{Config, DomainError, RuntimeSettings};
use std::collections::BTreeMap;
use tracing::{error, info, instrument};

use crate::services::{
    action_builder, backend_assembler, dynamic_rule_builder, frontend_assembler, object_builder,
    rule_assembler, selector_builder, settings_builder, LoadContext, LoadMode, LoadPorts,
    ProxyGeneration,
};

/// Turns configuration text into a complete, immutable generation.
pub struct LoadConfigUseCase {
    ports: LoadPorts,
}

impl LoadConfigUseCase {
    pub fn new(ports: LoadPorts) -> Self {
        Self { ports }
    }

    pub fn ports(&self) -> &LoadPorts {
        &self.ports
    }

    /// Runs one load. On failure nothing is returned, the caller keeps
    /// whatever generation it already had.
    #[instrument(skip(self, source), fields(mode = ?mode))]
    pub fn execute(&self, source: &str, mode: LoadMode) -> Result<ProxyGeneration, DomainError> {
        let config = Config::from_toml(source).map_err(|e| DomainError::Parse(e.to_string()))?;
        self.execute_config(&config, mode)
    }

    /// Same as [`execute`](Self::execute) for an already parsed tree.
    pub fn execute_config(
        &self,
        config: &Config,
        mode: LoadMode,
    ) -> Result<ProxyGeneration, DomainError> {
        let mut ctx = LoadContext::new(mode, &self.ports);
        let result = assemble(&mut ctx, config);
        ctx.registry.clear();

        match &result {
            Ok(generation) => info!(
                frontends = generation.frontends.len(),
                backends = generation.backends.len(),
                pools = generation.pools.len(),
                rules = generation.chains.total_rules(),
                dynamic_block_groups = generation.dynamic_blocks.len(),
                "Configuration loaded"
            ),
            Err(e) => error!(error = %e, "Configuration load failed"),
        }
        result
    }
}

fn assemble(ctx: &mut LoadContext<'_>, config: &Config) -> Result<ProxyGeneration, DomainError> {
    let mut generation = ProxyGeneration {
        mode: ctx.mode,
        logging: config.logging.clone(),
        ..ProxyGeneration::default()
    };
    let mut settings = RuntimeSettings {
        console: settings_builder::console_settings(&config.console)?,
        ..RuntimeSettings::default()
    };
    if ctx.mode == LoadMode::Client {
        generation.settings = settings;
        return Ok(generation);
    }

    settings.acl = settings_builder::netmask_group(&config.acl, "acl")?;
    settings.tls_tuning = settings_builder::tls_tuning(&config.tuning);
    generation.ebpf_filter = object_builder::ebpf_filter(ctx, &config.ebpf)?;

    object_builder::declare_builtin_policies(ctx)?;
    object_builder::declare_netmask_groups(ctx, &config.netmask_groups)?;
    object_builder::declare_key_value_stores(ctx, &config.key_value_stores)?;
    object_builder::declare_remote_loggers(ctx, &config.remote_logging)?;
    generation.xsk_maps = object_builder::declare_xsk_maps(ctx, &config.xsk)?;

    generation.frontends = frontend_assembler::assemble_frontends(ctx, &config.binds)?;
    let mut pools = BTreeMap::new();
    generation.backends = backend_assembler::assemble_backends(ctx, &config.backends, &mut pools)?;

    settings.proxy_protocol_acl =
        settings_builder::netmask_group(&config.proxy_protocol.acl, "proxy protocol ACL")?;
    settings.carbon = settings_builder::carbon_endpoints(&config.metrics)?;
    settings.webserver = settings_builder::webserver_settings(&config.webserver)?;
    settings.query_count = settings_builder::query_count_settings(ctx, &config.query_count)?;

    settings.dynamic_block_default_action =
        settings_builder::dynamic_block_default_action(&config.dynamic_rules_settings)?;
    generation.dynamic_blocks =
        dynamic_rule_builder::build_dynamic_groups(ctx, &config.dynamic_rules)?;

    settings_builder::apply_system_tuning(
        &mut settings,
        &config.tuning,
        &config.general.capabilities_to_retain,
    )?;

    generation.packet_caches = object_builder::declare_packet_caches(ctx, &config.packet_caches)?;
    object_builder::declare_custom_policies(ctx, &config.load_balancing_policies.custom_policies)?;
    generation.default_policy = object_builder::resolve_default_policy(
        ctx,
        &config.load_balancing_policies.default_policy,
    )?;
    object_builder::configure_pools(ctx, &config.pools, &mut pools)?;
    generation.pools = pools;

    selector_builder::declare_selectors(ctx, &config.selectors)?;
    action_builder::declare_actions(ctx, &config.actions)?;
    action_builder::declare_response_actions(ctx, &config.response_actions)?;
    generation.chains = rule_assembler::assemble_chains(ctx, config)?;

    generation.selectors = std::mem::take(&mut ctx.selectors);
    generation.settings = settings;
    Ok(generation)
}
