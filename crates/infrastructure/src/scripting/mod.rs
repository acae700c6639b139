mod runtime;

pub use runtime::{OpaqueScriptRuntime, ScriptChunk};
