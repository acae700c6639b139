use ferrous_proxy_application::ports::{
    BuildFeatures, FileSource, GenerationStore, ScriptHandle, ScriptRuntime, TlsContextValidator,
};
use ferrous_proxy_application::{LoadConfigUseCase, LoadPorts, ProxyGeneration};
use ferrous_proxy_domain::endpoint::TlsClientParams;
use ferrous_proxy_domain::listener::TlsServerParams;
use ferrous_proxy_domain::{DomainError, ScriptFlavour};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Knows a fixed set of global functions; code containing `error(` fails to
/// compile.
#[derive(Default)]
pub struct MockScriptRuntime {
    functions: HashSet<String>,
}

impl MockScriptRuntime {
    pub fn with_functions(names: &[&str]) -> Self {
        Self {
            functions: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl ScriptRuntime for MockScriptRuntime {
    fn lookup_function(&self, _flavour: ScriptFlavour, name: &str) -> Option<ScriptHandle> {
        self.functions
            .contains(name)
            .then(|| Arc::new(name.to_string()) as ScriptHandle)
    }

    fn compile(
        &self,
        _flavour: ScriptFlavour,
        code: &str,
        context: &str,
    ) -> Result<ScriptHandle, String> {
        if code.contains("error(") {
            return Err(format!("{} did not evaluate to a function", context));
        }
        Ok(Arc::new(code.to_string()))
    }
}

#[derive(Default)]
pub struct MockFileSource {
    files: RwLock<HashMap<String, String>>,
}

impl MockFileSource {
    pub fn with_file(path: &str, content: &str) -> Self {
        let source = Self::default();
        source.set(path, content);
        source
    }

    pub fn set(&self, path: &str, content: &str) {
        self.files
            .write()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }
}

impl FileSource for MockFileSource {
    fn read_to_string(&self, path: &str) -> Result<String, DomainError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| DomainError::io(path, "No such file or directory"))
    }
}

/// Certificates whose path contains `broken` fail validation, as do server
/// contexts without certificates and client contexts with the `broken` CA
/// store.
#[derive(Default)]
pub struct MockTlsValidator;

impl TlsContextValidator for MockTlsValidator {
    fn validate_server(&self, params: &TlsServerParams) -> Result<(), String> {
        if !params.has_certificates() {
            return Err("no certificate has been configured".to_string());
        }
        match params
            .certificates
            .iter()
            .find(|cert| cert.certificate.contains("broken"))
        {
            Some(cert) => Err(format!("unable to load certificate '{}'", cert.certificate)),
            None => Ok(()),
        }
    }

    fn validate_client(&self, params: &TlsClientParams) -> Result<(), String> {
        if params.ca_store.contains("broken") {
            return Err(format!("unable to load CA store '{}'", params.ca_store));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryGenerationStore {
    current: RwLock<Option<Arc<ProxyGeneration>>>,
}

impl GenerationStore for InMemoryGenerationStore {
    fn current(&self) -> Option<Arc<ProxyGeneration>> {
        self.current.read().unwrap().clone()
    }

    fn publish(&self, generation: Arc<ProxyGeneration>) {
        *self.current.write().unwrap() = Some(generation);
    }
}

pub fn ports_with(files: MockFileSource, features: BuildFeatures) -> LoadPorts {
    LoadPorts {
        scripts: Arc::new(MockScriptRuntime::with_functions(&[
            "is_internal",
            "visitor",
            "healthy",
        ])),
        files: Arc::new(files),
        tls: Arc::new(MockTlsValidator),
        features,
    }
}

pub fn loader() -> LoadConfigUseCase {
    LoadConfigUseCase::new(ports_with(MockFileSource::default(), BuildFeatures::all()))
}

pub fn loader_with_features(features: BuildFeatures) -> LoadConfigUseCase {
    LoadConfigUseCase::new(ports_with(MockFileSource::default(), features))
}
