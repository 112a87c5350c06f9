//! Domain types for a single wake decision.
//!
//! Everything here is a snapshot taken during one inbound request. None
//! of it is cached or persisted: the orchestration service stays the
//! source of truth for whether a service is awake.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Replica count requested when a dormant service is woken.
pub const WAKE_REPLICAS: u32 = 1;

/// The validated `(cluster, service)` pair carried by an inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub cluster: String,
    pub service: String,
}

impl ServiceRef {
    pub fn new(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            service: service.into(),
        }
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.service)
    }
}

// ── Service ───────────────────────────────────────────────────────

/// Replica counts and routing target of a service, as reported by the
/// orchestration service.
///
/// `running_count` may briefly exceed `desired_count` while the
/// orchestrator converges; consumers must not assume otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    pub desired_count: u32,
    pub running_count: u32,
    /// Target group the service registers its tasks into.
    pub routing_target_id: String,
}

// ── Target health ─────────────────────────────────────────────────

/// Health of a single target as reported by the load balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Unhealthy,
    Draining,
    Initial,
    Unused,
    Unavailable,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Draining => "draining",
            Self::Initial => "initial",
            Self::Unused => "unused",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a health state string is not one of the six known values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHealthState(pub String);

impl FromStr for HealthState {
    type Err = UnknownHealthState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            "draining" => Ok(Self::Draining),
            "initial" => Ok(Self::Initial),
            "unused" => Ok(Self::Unused),
            "unavailable" => Ok(Self::Unavailable),
            other => Err(UnknownHealthState(other.to_string())),
        }
    }
}

/// A registered target and its current health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHealth {
    pub target_id: String,
    pub state: HealthState,
}

/// True when at least one target passes its health checks.
///
/// An empty slice means nothing is registered yet, which is not healthy.
pub fn any_healthy(targets: &[TargetHealth]) -> bool {
    targets.iter().any(|t| t.state == HealthState::Healthy)
}

// ── Routing ───────────────────────────────────────────────────────

/// Listener protocols a browser can be redirected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    /// Parse a load balancer protocol name. Returns `None` for protocols
    /// that cannot carry a browser redirect (TCP, TLS, UDP, GENEVE...).
    pub fn from_listener(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "HTTP" => Some(Self::Http),
            "HTTPS" => Some(Self::Https),
            _ => None,
        }
    }

    /// URL scheme, lowercased.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("HTTP"),
            Self::Https => f.write_str("HTTPS"),
        }
    }
}

/// Externally reachable port/protocol of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRoute {
    pub port: u16,
    pub protocol: Protocol,
}

/// Public DNS name and display name of a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerInfo {
    pub dns_name: String,
    pub name: Option<String>,
}

/// Where a visitor is sent once the service is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEndpoint {
    pub load_balancer_id: String,
    pub dns_name: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl RoutingEndpoint {
    /// The redirect target, `{scheme}://{dns_name}:{port}`.
    pub fn location(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.dns_name, self.port)
    }
}

// ── Decision ──────────────────────────────────────────────────────

/// Outcome of one pass through the wake state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WakeDecision {
    /// The service was dormant and a scale-up was requested. The visitor
    /// sees the holding page.
    ScaleUp,
    /// The service is starting or not yet passing health checks.
    Holding,
    /// The service is reachable.
    Redirect(RoutingEndpoint),
}

impl WakeDecision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ScaleUp => "scale_up",
            Self::Holding => "holding",
            Self::Redirect(_) => "redirect",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: &str, state: HealthState) -> TargetHealth {
        TargetHealth {
            target_id: id.to_string(),
            state,
        }
    }

    #[test]
    fn health_state_parses_known_values() {
        for state in [
            HealthState::Healthy,
            HealthState::Unhealthy,
            HealthState::Draining,
            HealthState::Initial,
            HealthState::Unused,
            HealthState::Unavailable,
        ] {
            assert_eq!(state.as_str().parse::<HealthState>(), Ok(state));
        }
    }

    #[test]
    fn health_state_rejects_unknown() {
        let err = "unhealthy.draining".parse::<HealthState>().unwrap_err();
        assert_eq!(err, UnknownHealthState("unhealthy.draining".to_string()));
    }

    #[test]
    fn any_healthy_empty_is_false() {
        assert!(!any_healthy(&[]));
    }

    #[test]
    fn any_healthy_needs_one_healthy_target() {
        assert!(!any_healthy(&[
            target("t1", HealthState::Initial),
            target("t2", HealthState::Draining),
        ]));
        assert!(any_healthy(&[
            target("t1", HealthState::Unhealthy),
            target("t2", HealthState::Healthy),
        ]));
    }

    #[test]
    fn protocol_only_accepts_http_family() {
        assert_eq!(Protocol::from_listener("HTTPS"), Some(Protocol::Https));
        assert_eq!(Protocol::from_listener("http"), Some(Protocol::Http));
        assert_eq!(Protocol::from_listener("TCP"), None);
        assert_eq!(Protocol::from_listener("TLS"), None);
    }

    #[test]
    fn location_lowercases_scheme() {
        let endpoint = RoutingEndpoint {
            load_balancer_id: "lb-1".to_string(),
            dns_name: "lb.example.com".to_string(),
            port: 8443,
            protocol: Protocol::Https,
        };
        assert_eq!(endpoint.location(), "https://lb.example.com:8443");
    }

    #[test]
    fn decision_labels() {
        assert_eq!(WakeDecision::ScaleUp.label(), "scale_up");
        assert_eq!(WakeDecision::Holding.label(), "holding");
    }

    #[test]
    fn service_ref_display() {
        assert_eq!(ServiceRef::new("demo", "svc-a").to_string(), "demo/svc-a");
    }
}
