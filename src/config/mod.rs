//! Configuration management
//!
//! The curve choice (and with it the codec stride) is the only setting. It
//! comes from a TOML file or defaults, with `LEDGER_CURVE` taking precedence.

pub mod settings;

pub use settings::Config;
