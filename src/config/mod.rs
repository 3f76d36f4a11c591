mod settings;

pub use settings::{DbConfig, ProbeConfig, ServerConfig, Settings};
