mod build_features;
mod file_source;
mod generation_store;
mod script_runtime;
mod tls_context;

pub use build_features::BuildFeatures;
pub use file_source::FileSource;
pub use generation_store::GenerationStore;
pub use script_runtime::{ScriptHandle, ScriptRuntime};
pub use tls_context::TlsContextValidator;
