//! Ferrous Proxy Infrastructure Layer
//!
//! Adapters behind the application ports: rustls context validation, local
//! file access, the compiled-feature probe, the script runtime and the
//! generation store.
pub mod generation;
pub mod scripting;
pub mod system;
pub mod tls;

pub use generation::ArcSwapGenerationStore;
pub use scripting::OpaqueScriptRuntime;
pub use system::{compiled_features, LocalFileSource};
pub use tls::RustlsContextValidator;
