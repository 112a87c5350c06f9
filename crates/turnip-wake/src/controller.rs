//! Wake controller — the decision state machine.
//!
//! States, by precedence:
//!
//! | State | Condition | Action |
//! |---|---|---|
//! | COLD | `desired == 0` | scale to 1, holding page |
//! | STARTING | `desired > 0 && running < 1` | holding page |
//! | WARMING | `running >= 1`, no healthy target | holding page |
//! | READY | `running >= 1`, healthy target, listener found | 302 to listener |
//!
//! A healthy target with no forwarding listener is a load balancer
//! misconfiguration. It is logged and answered with the holding page.

use std::sync::Arc;
use std::time::Duration;

use http::Response;
use tracing::{debug, error, info, warn};

use turnip_core::{
    any_healthy, ConfigError, LoadBalancing, Orchestrator, RoutingEndpoint, ServiceRef,
    ServiceState, TurnipConfig, WakeDecision, WakeResult,
};

use crate::health::read_target_health;
use crate::listener::resolve_listener;
use crate::load_balancer::{parent_load_balancer, read_load_balancer};
use crate::response::decision_response;
use crate::service::{read_service_state, scale_up};

/// Tunables for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeSettings {
    /// Deadline applied to each remote call.
    pub call_timeout: Duration,
    /// Holding page auto-refresh period.
    pub refresh_secs: u32,
}

impl Default for WakeSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            refresh_secs: 10,
        }
    }
}

impl WakeSettings {
    pub fn from_config(config: &TurnipConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            call_timeout: config.call_timeout()?,
            refresh_secs: config.holding.refresh_secs,
        })
    }
}

/// Decides, per request, whether to wake, hold, or redirect.
///
/// Holds only shared handles to the two control planes; cloning is cheap
/// and concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct WakeController {
    orchestrator: Arc<dyn Orchestrator>,
    load_balancing: Arc<dyn LoadBalancing>,
    settings: WakeSettings,
}

impl WakeController {
    pub fn new(
        orchestrator: Arc<dyn Orchestrator>,
        load_balancing: Arc<dyn LoadBalancing>,
        settings: WakeSettings,
    ) -> Self {
        Self {
            orchestrator,
            load_balancing,
            settings,
        }
    }

    pub fn settings(&self) -> WakeSettings {
        self.settings
    }

    /// Run the state machine once for `target`.
    ///
    /// Any upstream failure aborts the decision; the caller must answer
    /// with an error response, never a holding page.
    pub async fn decide(&self, target: &ServiceRef) -> WakeResult<WakeDecision> {
        self.evaluate(target).await.map(|(_, decision)| decision)
    }

    /// The decision together with the service state it was based on.
    async fn evaluate(&self, target: &ServiceRef) -> WakeResult<(ServiceState, WakeDecision)> {
        let timeout = self.settings.call_timeout;
        let state = read_service_state(self.orchestrator.as_ref(), target, timeout).await?;

        if state.desired_count == 0 {
            scale_up(self.orchestrator.as_ref(), target, timeout).await?;
            return Ok((state, WakeDecision::ScaleUp));
        }

        if state.running_count < 1 {
            debug!(%target, desired = state.desired_count, "no replica running yet");
            return Ok((state, WakeDecision::Holding));
        }

        let decision = self.probe_reachability(target, &state.routing_target_id).await?;
        Ok((state, decision))
    }

    /// Decide and render. Every successful path yields exactly one response.
    pub async fn handle(&self, target: &ServiceRef) -> WakeResult<Response<String>> {
        let result = self.evaluate(target).await.and_then(|(state, decision)| {
            let resp = decision_response(&decision, &target.service, self.settings.refresh_secs)?;
            Ok((state, decision, resp))
        });

        match result {
            Ok((state, decision, resp)) => {
                info!(
                    cluster = %target.cluster,
                    service = %target.service,
                    desired = state.desired_count,
                    running = state.running_count,
                    decision = decision.label(),
                    status = resp.status().as_u16(),
                    "wake request handled"
                );
                Ok(resp)
            }
            Err(e) => {
                error!(%target, error = %e, code = e.code(), "wake request failed");
                Err(e)
            }
        }
    }

    /// At least one replica runs; find out whether traffic can reach it.
    async fn probe_reachability(
        &self,
        target: &ServiceRef,
        target_group_id: &str,
    ) -> WakeResult<WakeDecision> {
        let timeout = self.settings.call_timeout;
        let lb = self.load_balancing.as_ref();

        let load_balancer_id = parent_load_balancer(lb, target_group_id, timeout).await?;

        let (targets, lb_info) = tokio::try_join!(
            read_target_health(lb, target_group_id, timeout),
            read_load_balancer(lb, &load_balancer_id, timeout),
        )?;

        if !any_healthy(&targets) {
            debug!(
                %target,
                %target_group_id,
                targets = targets.len(),
                "running but no healthy target yet"
            );
            return Ok(WakeDecision::Holding);
        }

        match resolve_listener(lb, &load_balancer_id, target_group_id, timeout).await? {
            Some(route) => Ok(WakeDecision::Redirect(RoutingEndpoint {
                load_balancer_id,
                dns_name: lb_info.dns_name,
                port: route.port,
                protocol: route.protocol,
            })),
            None => {
                warn!(
                    %target,
                    %load_balancer_id,
                    load_balancer_name = ?lb_info.name,
                    %target_group_id,
                    "healthy target but no HTTP(S) listener forwards to its target group"
                );
                Ok(WakeDecision::Holding)
            }
        }
    }
}
