use ferrous_proxy_domain::ScriptFlavour;
use std::any::Any;
use std::sync::Arc;

pub type ScriptHandle = Arc<dyn Any + Send + Sync>;

/// Port to the embedded scripting runtime. The loader never executes what
/// it gets back, it only stores the handle.
pub trait ScriptRuntime: Send + Sync {
    /// A function already defined in the runtime's global state.
    fn lookup_function(&self, flavour: ScriptFlavour, name: &str) -> Option<ScriptHandle>;

    /// Evaluates `code`, which must yield a callable.
    fn compile(&self, flavour: ScriptFlavour, code: &str, context: &str)
        -> Result<ScriptHandle, String>;
}
