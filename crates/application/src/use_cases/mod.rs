pub mod config;

pub use config::{LoadConfigUseCase, ReloadConfigUseCase};
