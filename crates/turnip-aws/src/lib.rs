//! turnip-aws — AWS implementations of the Turnip upstream ports.
//!
//! - **`ecs`** — `EcsOrchestrator`, the `Orchestrator` port over Amazon ECS
//! - **`elb`** — `ElbLoadBalancing`, the `LoadBalancing` port over ELBv2
//! - **`sdk`** — shared `SdkConfig` loading (region, endpoint, deadline)
//!
//! Adapters only marshal: they copy API fields into the port payloads and
//! leave presence checks to the readers in `turnip-wake`. SDK retries are
//! disabled; the holding page's refresh is the retry loop.

pub mod ecs;
pub mod elb;
pub mod sdk;

pub use ecs::EcsOrchestrator;
pub use elb::ElbLoadBalancing;
pub use sdk::load_sdk_config;
