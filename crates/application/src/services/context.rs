use ferrous_proxy_domain::{DomainError, SelectorArena};
use std::sync::Arc;
use tracing::warn;

use super::registry::{EntityRegistry, Registrable};
use crate::ports::{BuildFeatures, FileSource, ScriptRuntime, TlsContextValidator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Build everything and activate it.
    #[default]
    Normal,
    /// Only console and logging settings are needed.
    Client,
    /// Build everything, validate TLS eagerly, activate nothing.
    ValidateOnly,
}

impl LoadMode {
    /// No traffic is ever evaluated in these modes, so dangling names are
    /// harmless.
    pub fn tolerates_missing_references(&self) -> bool {
        matches!(self, LoadMode::Client | LoadMode::ValidateOnly)
    }

    pub fn activates(&self) -> bool {
        matches!(self, LoadMode::Normal)
    }
}

/// External collaborators used while loading.
#[derive(Clone)]
pub struct LoadPorts {
    pub scripts: Arc<dyn ScriptRuntime>,
    pub files: Arc<dyn FileSource>,
    pub tls: Arc<dyn TlsContextValidator>,
    pub features: BuildFeatures,
}

/// State of one load. Nothing in here outlives the call to `load`.
pub struct LoadContext<'a> {
    pub mode: LoadMode,
    pub registry: EntityRegistry,
    pub selectors: SelectorArena,
    pub ports: &'a LoadPorts,
}

impl<'a> LoadContext<'a> {
    pub fn new(mode: LoadMode, ports: &'a LoadPorts) -> Self {
        Self {
            mode,
            registry: EntityRegistry::new(),
            selectors: SelectorArena::new(),
            ports,
        }
    }

    /// Resolves `name` to an entity of kind `T`.
    ///
    /// `Ok(None)` means the reference is missing but the mode tolerates it.
    pub fn resolve<T: Registrable>(
        &self,
        name: &str,
        context: &str,
    ) -> Result<Option<T>, DomainError> {
        match self.registry.lookup::<T>(name) {
            Some(entity) => Ok(Some(entity)),
            None if self.mode.tolerates_missing_references() => {
                warn!(name = %name, kind = T::KIND, context = %context, "Unresolved reference ignored");
                Ok(None)
            }
            None => Err(DomainError::unresolved(T::KIND, name, context)),
        }
    }

    /// Same as [`resolve`](Self::resolve) but never tolerant.
    pub fn require<T: Registrable>(&self, name: &str, context: &str) -> Result<T, DomainError> {
        self.registry
            .lookup::<T>(name)
            .ok_or_else(|| DomainError::unresolved(T::KIND, name, context))
    }
}
