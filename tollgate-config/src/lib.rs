//! Configuration for Tollgate.
//!
//! Session lifetimes, sweep sizing and the default log filter are read from
//! a TOML file and overridden by `TOLLGATE_*` environment variables
//! (optionally seeded from a `.env` file). The result is validated into a
//! [`SessionPolicy`](tollgate_core::SessionPolicy) plus warnings for values
//! that are legal but unusual.
#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod telemetry;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{Config, ConfigMetadata, LoggingConfig};
pub use telemetry::init_tracing;
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
