//! turnip-wake — the wake-and-redirect state machine.
//!
//! A visitor request names a `(cluster, service)`. The controller reads
//! the service's replica counts, wakes it if dormant, and otherwise checks
//! whether any target behind its load balancer is healthy. The visitor
//! gets either a self-refreshing holding page or a redirect to the live
//! listener.
//!
//! # Architecture
//!
//! ```text
//! WakeController::decide()
//!   ├── service::read_service_state()      Orchestrator
//!   ├── desired == 0   → service::scale_up() → ScaleUp
//!   ├── running  < 1   → Holding
//!   └── running >= 1
//!       ├── load_balancer::parent_load_balancer()
//!       ├── health::read_target_health()  ∥  load_balancer::read_load_balancer()
//!       ├── nothing healthy → Holding
//!       └── listener::resolve_listener()
//!           ├── match    → Redirect(endpoint)
//!           └── no match → Holding
//! ```
//!
//! The controller keeps no state between requests. Re-polling by the
//! holding page's refresh is the only retry mechanism.

mod call;
pub mod controller;
pub mod health;
pub mod holding;
pub mod listener;
pub mod load_balancer;
pub mod response;
pub mod service;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::{WakeController, WakeSettings};
pub use holding::render_holding_page;
pub use listener::RouteTable;
