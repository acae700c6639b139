pub mod action_builder;
pub mod backend_assembler;
mod context;
pub mod dynamic_rule_builder;
pub mod frontend_assembler;
mod generation;
pub mod object_builder;
mod registry;
pub mod rule_assembler;
pub mod scripting;
pub mod selector_builder;
pub mod settings_builder;

pub use context::{LoadContext, LoadMode, LoadPorts};
pub use generation::ProxyGeneration;
pub use registry::{EntityRegistry, Registrable, RegisteredEntity};
