//! Upstream ports: the orchestration and load-balancing control planes.
//!
//! Payloads mirror the optionality of the remote APIs. Adapters copy
//! fields across without judging them; the readers in `turnip-wake`
//! decide which absences are fatal.

use async_trait::async_trait;

use crate::error::PortResult;

/// Remote operation names, used in errors and logs.
pub mod operation {
    pub const DESCRIBE_SERVICES: &str = "DescribeServices";
    pub const UPDATE_SERVICE: &str = "UpdateService";
    pub const DESCRIBE_TARGET_GROUPS: &str = "DescribeTargetGroups";
    pub const DESCRIBE_TARGET_HEALTH: &str = "DescribeTargetHealth";
    pub const DESCRIBE_LOAD_BALANCERS: &str = "DescribeLoadBalancers";
    pub const DESCRIBE_LISTENERS: &str = "DescribeListeners";
}

// ── Orchestration ─────────────────────────────────────────────────

/// A service as described by the orchestration service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescription {
    pub name: Option<String>,
    pub desired_count: i32,
    pub running_count: i32,
    /// Load balancer attachments in API order.
    pub load_balancers: Vec<LoadBalancerAttachment>,
}

/// One load balancer attachment on a service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancerAttachment {
    pub target_group_id: Option<String>,
    pub container_name: Option<String>,
    pub container_port: Option<i32>,
}

/// Control plane holding desired/running replica counts.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Describe a single service. `Ok(None)` when the cluster does not
    /// know the service.
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> PortResult<Option<ServiceDescription>>;

    /// Set the desired replica count. Returns once the update is accepted,
    /// not once replicas are running.
    async fn update_desired_count(&self, cluster: &str, service: &str, count: u32)
        -> PortResult<()>;
}

// ── Load balancing ────────────────────────────────────────────────

/// A target group and the load balancers routing to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetGroupDescription {
    pub target_group_id: String,
    pub load_balancer_ids: Vec<String>,
}

/// Raw health entry for one registered target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetHealthDescription {
    pub target_id: Option<String>,
    /// Lowercase state string, e.g. `healthy`.
    pub state: Option<String>,
    pub reason: Option<String>,
}

/// A load balancer's addressing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadBalancerDescription {
    pub load_balancer_id: String,
    pub dns_name: Option<String>,
    pub name: Option<String>,
}

/// A listener and the target groups its default actions forward to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListenerDescription {
    pub listener_id: Option<String>,
    pub port: Option<i32>,
    pub protocol: Option<String>,
    /// Forwarding references across all default actions, in action order
    /// then in forward-config order.
    pub forward_target_groups: Vec<String>,
}

/// Control plane holding listeners, target groups and target health.
#[async_trait]
pub trait LoadBalancing: Send + Sync {
    async fn describe_target_group(
        &self,
        target_group_id: &str,
    ) -> PortResult<Option<TargetGroupDescription>>;

    async fn describe_target_health(
        &self,
        target_group_id: &str,
    ) -> PortResult<Vec<TargetHealthDescription>>;

    async fn describe_load_balancer(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Option<LoadBalancerDescription>>;

    /// All listeners of a load balancer, in the order the API enumerates them.
    async fn describe_listeners(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Vec<ListenerDescription>>;
}
