//! Ferrous Proxy Application Layer
//!
//! Assembles a configuration tree into a [`ProxyGeneration`]: the entity
//! registry, selector and action builders, rule chains, dynamic block groups,
//! frontends and backends.
pub mod ports;
pub mod services;
pub mod use_cases;

pub use services::{LoadMode, LoadPorts, ProxyGeneration};
pub use use_cases::{LoadConfigUseCase, ReloadConfigUseCase};
