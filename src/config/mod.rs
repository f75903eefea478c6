//! Configuration loaded from `secvault.toml` in the config directory.

pub mod settings;

pub use settings::{Settings, StoreKind, CONFIG_DIR_ENV};
