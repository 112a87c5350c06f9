//! turnip-api — HTTP entry point for Turnip.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/?service=&cluster=` | Wake, hold, or redirect |
//! | GET | `/wake?service=&cluster=` | Same as `/` |
//! | GET | `/healthz` | Liveness of the controller itself |

pub mod handlers;

use axum::Router;
use axum::routing::get;
use turnip_wake::WakeController;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub controller: WakeController,
}

/// Build the complete router.
pub fn build_router(controller: WakeController) -> Router {
    let state = ApiState { controller };

    Router::new()
        .route("/", get(handlers::wake))
        .route("/wake", get(handlers::wake))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
