use ferrous_proxy_domain::config::ScriptSourceConfig;
use ferrous_proxy_domain::{DomainError, ScriptFlavour, ScriptFunction, ScriptOrigin};
use tracing::debug;

use super::context::LoadContext;

/// The three places a callback may come from, tried in field order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptSource<'a> {
    pub name: &'a str,
    pub code: &'a str,
    pub file: &'a str,
}

impl<'a> ScriptSource<'a> {
    pub fn new(name: &'a str, code: &'a str, file: &'a str) -> Self {
        Self { name, code, file }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.code.is_empty() && self.file.is_empty()
    }
}

impl<'a> From<&'a ScriptSourceConfig> for ScriptSource<'a> {
    fn from(config: &'a ScriptSourceConfig) -> Self {
        Self::new(
            &config.function_name,
            &config.function_code,
            &config.function_file,
        )
    }
}

/// Resolves a mandatory callback for `context`.
pub fn resolve_function(
    ctx: &LoadContext<'_>,
    flavour: ScriptFlavour,
    source: ScriptSource<'_>,
    context: &str,
) -> Result<ScriptFunction, DomainError> {
    resolve_optional_function(ctx, flavour, source, context)?.ok_or_else(|| {
        DomainError::validation(
            context,
            "no function name, code or file has been set",
        )
    })
}

/// Resolves a callback when one of the sources is set.
pub fn resolve_optional_function(
    ctx: &LoadContext<'_>,
    flavour: ScriptFlavour,
    source: ScriptSource<'_>,
    context: &str,
) -> Result<Option<ScriptFunction>, DomainError> {
    let runtime = &ctx.ports.scripts;
    if !source.name.is_empty() {
        let handle = runtime
            .lookup_function(flavour, source.name)
            .ok_or_else(|| DomainError::unresolved("function", source.name, context))?;
        debug!(function = %source.name, context = %context, "Resolved named function");
        return Ok(Some(ScriptFunction::new(
            flavour,
            ScriptOrigin::Named(source.name.to_string()),
            handle,
        )));
    }
    if !source.code.is_empty() {
        let handle = runtime
            .compile(flavour, source.code, context)
            .map_err(|e| DomainError::validation(context, e))?;
        return Ok(Some(ScriptFunction::new(
            flavour,
            ScriptOrigin::Inline(source.code.to_string()),
            handle,
        )));
    }
    if !source.file.is_empty() {
        let code = ctx.ports.files.read_to_string(source.file)?;
        let handle = runtime
            .compile(flavour, &code, context)
            .map_err(|e| DomainError::validation(context, e))?;
        return Ok(Some(ScriptFunction::new(
            flavour,
            ScriptOrigin::File(source.file.to_string()),
            handle,
        )));
    }
    Ok(None)
}
