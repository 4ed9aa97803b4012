//! Configuration for embedding a mediadex index.
//!
//! Loads view, loader and logging settings from a TOML or JSON file, inline
//! JSON in the environment, or defaults, and installs the tracing subscriber
//! the core logs through.
#![allow(missing_docs)]

pub mod logging;
pub mod models;
pub mod util;

pub use logging::init_tracing;
pub use models::index::{EnvSources, IndexConfig, IndexConfigSource, LoggingConfig};
