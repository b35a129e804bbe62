//! Pool templates.
//!
//! A [`Config`] is created once and shared by every pool built from it. It
//! is validated on construction, on deserialization, and again when a pool
//! is initialized from it.

mod pool_config;

pub use pool_config::{CollectFeeMode, Config, ConfigParameters};
