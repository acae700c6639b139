#![allow(dead_code)]
mod tls_fixtures;

pub use tls_fixtures::*;
