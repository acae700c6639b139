use dashmap::DashMap;
use ferrous_proxy_application::ports::{ScriptHandle, ScriptRuntime};
use ferrous_proxy_domain::ScriptFlavour;
use std::sync::Arc;
use tracing::debug;

/// Source captured for a scripted callback. The proxy engine compiles and
/// runs it; this runtime only keeps it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptChunk {
    pub flavour: ScriptFlavour,
    pub origin: String,
    pub code: Arc<str>,
}

/// Script runtime that stores callbacks without executing them. Global
/// functions are the ones defined through [`define`](Self::define).
#[derive(Default)]
pub struct OpaqueScriptRuntime {
    globals: DashMap<(ScriptFlavour, String), ScriptHandle>,
}

impl OpaqueScriptRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `name` resolvable as an already defined global function.
    pub fn define(&self, flavour: ScriptFlavour, name: &str, code: &str) {
        let chunk = ScriptChunk {
            flavour,
            origin: name.to_string(),
            code: Arc::from(code),
        };
        self.globals
            .insert((flavour, name.to_string()), Arc::new(chunk) as ScriptHandle);
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }
}

impl ScriptRuntime for OpaqueScriptRuntime {
    fn lookup_function(&self, flavour: ScriptFlavour, name: &str) -> Option<ScriptHandle> {
        self.globals
            .get(&(flavour, name.to_string()))
            .map(|entry| entry.value().clone())
    }

    fn compile(
        &self,
        flavour: ScriptFlavour,
        code: &str,
        context: &str,
    ) -> Result<ScriptHandle, String> {
        if code.trim().is_empty() {
            return Err(format!("{}: script is empty", context));
        }
        debug!(context = %context, bytes = code.len(), "Captured script");
        Ok(Arc::new(ScriptChunk {
            flavour,
            origin: context.to_string(),
            code: Arc::from(code),
        }))
    }
}
