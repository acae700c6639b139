use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Calling convention of a scripted callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptFlavour {
    Native,
    Ffi,
}

/// Where the callable came from. Only one source is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScriptOrigin {
    Named(String),
    Inline(String),
    File(String),
}

impl fmt::Display for ScriptOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptOrigin::Named(name) => write!(f, "function '{}'", name),
            ScriptOrigin::Inline(_) => f.write_str("inline code"),
            ScriptOrigin::File(path) => write!(f, "file '{}'", path),
        }
    }
}

/// Opaque handle to a callable produced by the scripting runtime.
///
/// The proxy core stores and forwards it; only the runtime that created it
/// knows how to invoke it.
#[derive(Clone)]
pub struct ScriptFunction {
    flavour: ScriptFlavour,
    origin: ScriptOrigin,
    handle: Arc<dyn Any + Send + Sync>,
}

impl ScriptFunction {
    pub fn new(
        flavour: ScriptFlavour,
        origin: ScriptOrigin,
        handle: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            flavour,
            origin,
            handle,
        }
    }

    pub fn flavour(&self) -> ScriptFlavour {
        self.flavour
    }

    pub fn origin(&self) -> &ScriptOrigin {
        &self.origin
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptFunction")
            .field("flavour", &self.flavour)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

// Two handles are equivalent when they were resolved from the same source.
impl PartialEq for ScriptFunction {
    fn eq(&self, other: &Self) -> bool {
        self.flavour == other.flavour && self.origin == other.origin
    }
}
