//! Shared runtime plumbing for the aggregation gateway: configuration,
//! a generic application error, and health-check types.
//!
//! Every other `ag-*` crate depends on this one; it carries no business
//! logic of its own.

pub mod config;
pub mod error;
pub mod health;
pub mod logging;

pub use config::{Config, ConfigError, GatewayConfig};
pub use error::AppError;
pub use health::{HealthIndicator, HealthStatus};
