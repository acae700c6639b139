use ferrous_proxy_application::ports::GenerationStore;
use ferrous_proxy_application::{LoadConfigUseCase, LoadPorts, ReloadConfigUseCase};
use ferrous_proxy_infrastructure::{
    compiled_features, ArcSwapGenerationStore, LocalFileSource, OpaqueScriptRuntime,
    RustlsContextValidator,
};
use std::sync::Arc;
use tracing::debug;

pub struct UseCases {
    pub load_config: Arc<LoadConfigUseCase>,
    pub reload_config: Arc<ReloadConfigUseCase>,
    pub store: Arc<ArcSwapGenerationStore>,
}

impl UseCases {
    pub fn new(config_path: &str) -> Self {
        let features = compiled_features();
        debug!(?features, "Compiled features");

        let ports = LoadPorts {
            scripts: Arc::new(OpaqueScriptRuntime::new()),
            files: Arc::new(LocalFileSource::relative_to(config_path)),
            tls: Arc::new(RustlsContextValidator::new()),
            features,
        };
        let load_config = Arc::new(LoadConfigUseCase::new(ports));
        let store = Arc::new(ArcSwapGenerationStore::new());
        let reload_config = Arc::new(ReloadConfigUseCase::new(
            load_config.clone(),
            store.clone() as Arc<dyn GenerationStore>,
        ));

        Self {
            load_config,
            reload_config,
            store,
        }
    }
}
