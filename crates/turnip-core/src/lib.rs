//! turnip-core — shared vocabulary for the Turnip wake controller.
//!
//! Holds the per-request data model, the two upstream ports the
//! controller talks through, the error taxonomy, and `turnip.toml`
//! parsing. Nothing in here performs I/O against AWS; the adapters in
//! `turnip-aws` and the fakes in `turnip-wake` implement the ports.
//!
//! # Layout
//!
//! ```text
//! turnip-core
//!   ├── types   ServiceState, TargetHealth, RoutingEndpoint, WakeDecision
//!   ├── ports   Orchestrator, LoadBalancing (+ raw description payloads)
//!   ├── error   PortError, WakeError
//!   └── config  TurnipConfig (turnip.toml)
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod types;

pub use config::{ConfigError, TurnipConfig};
pub use error::{PortError, PortResult, WakeError, WakeResult};
pub use ports::*;
pub use types::*;
