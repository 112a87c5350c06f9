//! In-memory port fakes for tests.
//!
//! Both fakes record every call so tests can assert on what the
//! controller asked for, not just on what it decided.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use turnip_core::operation::*;
use turnip_core::*;

// ── Orchestrator ──────────────────────────────────────────────────

/// Orchestrator backed by a map of `(cluster, service)` descriptions.
///
/// `update_desired_count` writes through to the stored description, so a
/// second invocation after a wake sees the new desired count.
#[derive(Default)]
pub struct FakeOrchestrator {
    services: Mutex<HashMap<(String, String), ServiceDescription>>,
    failures: HashMap<&'static str, String>,
    delay: Option<Duration>,
    scale_calls: Mutex<Vec<(String, String, u32)>>,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(self, cluster: &str, service: &str, desc: ServiceDescription) -> Self {
        self.services
            .lock()
            .expect("services lock")
            .insert((cluster.to_string(), service.to_string()), desc);
        self
    }

    /// Make `operation` fail with `message`.
    pub fn failing(mut self, operation: &'static str, message: &str) -> Self {
        self.failures.insert(operation, message.to_string());
        self
    }

    /// Delay every call, for deadline tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every `(cluster, service, count)` passed to `update_desired_count`.
    pub fn scale_calls(&self) -> Vec<(String, String, u32)> {
        self.scale_calls.lock().expect("scale calls lock").clone()
    }

    async fn enter(&self, operation: &'static str) -> PortResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failures.get(operation) {
            Some(message) => Err(PortError::new(operation, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Orchestrator for FakeOrchestrator {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> PortResult<Option<ServiceDescription>> {
        self.enter(DESCRIBE_SERVICES).await?;
        let services = self.services.lock().expect("services lock");
        Ok(services
            .get(&(cluster.to_string(), service.to_string()))
            .cloned())
    }

    async fn update_desired_count(&self, cluster: &str, service: &str, count: u32) -> PortResult<()> {
        self.enter(UPDATE_SERVICE).await?;
        self.scale_calls
            .lock()
            .expect("scale calls lock")
            .push((cluster.to_string(), service.to_string(), count));

        let mut services = self.services.lock().expect("services lock");
        if let Some(desc) = services.get_mut(&(cluster.to_string(), service.to_string())) {
            desc.desired_count = count as i32;
        }
        Ok(())
    }
}

/// A service description with one load balancer attachment.
pub fn service_desc(desired: i32, running: i32, target_group_id: &str) -> ServiceDescription {
    ServiceDescription {
        name: Some("svc".to_string()),
        desired_count: desired,
        running_count: running,
        load_balancers: vec![LoadBalancerAttachment {
            target_group_id: Some(target_group_id.to_string()),
            container_name: Some("web".to_string()),
            container_port: Some(8080),
        }],
    }
}

// ── Load balancing ────────────────────────────────────────────────

/// Load-balancing control plane backed by plain maps.
#[derive(Default)]
pub struct FakeLoadBalancing {
    target_groups: HashMap<String, TargetGroupDescription>,
    health: HashMap<String, Vec<TargetHealthDescription>>,
    load_balancers: HashMap<String, LoadBalancerDescription>,
    listeners: HashMap<String, Vec<ListenerDescription>>,
    failures: HashMap<&'static str, String>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeLoadBalancing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target group attached to a single load balancer.
    pub fn with_target_group(mut self, target_group_id: &str, load_balancer_id: &str) -> Self {
        self.target_groups.insert(
            target_group_id.to_string(),
            TargetGroupDescription {
                target_group_id: target_group_id.to_string(),
                load_balancer_ids: vec![load_balancer_id.to_string()],
            },
        );
        self
    }

    pub fn with_target_group_desc(mut self, desc: TargetGroupDescription) -> Self {
        self.target_groups.insert(desc.target_group_id.clone(), desc);
        self
    }

    /// Register targets as `(target_id, state)` pairs.
    pub fn with_health(mut self, target_group_id: &str, targets: &[(&str, &str)]) -> Self {
        let descs = targets
            .iter()
            .map(|(id, state)| TargetHealthDescription {
                target_id: Some(id.to_string()),
                state: Some(state.to_string()),
                reason: None,
            })
            .collect();
        self.health.insert(target_group_id.to_string(), descs);
        self
    }

    pub fn with_health_descs(mut self, target_group_id: &str, descs: Vec<TargetHealthDescription>) -> Self {
        self.health.insert(target_group_id.to_string(), descs);
        self
    }

    pub fn with_load_balancer(mut self, load_balancer_id: &str, dns_name: &str) -> Self {
        self.load_balancers.insert(
            load_balancer_id.to_string(),
            LoadBalancerDescription {
                load_balancer_id: load_balancer_id.to_string(),
                dns_name: Some(dns_name.to_string()),
                name: Some(format!("{load_balancer_id}-name")),
            },
        );
        self
    }

    pub fn with_load_balancer_desc(mut self, desc: LoadBalancerDescription) -> Self {
        self.load_balancers.insert(desc.load_balancer_id.clone(), desc);
        self
    }

    pub fn with_listeners(mut self, load_balancer_id: &str, listeners: Vec<ListenerDescription>) -> Self {
        self.listeners.insert(load_balancer_id.to_string(), listeners);
        self
    }

    /// Make `operation` fail with `message`.
    pub fn failing(mut self, operation: &'static str, message: &str) -> Self {
        self.failures.insert(operation, message.to_string());
        self
    }

    /// Operation names in call order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn was_called(&self, operation: &str) -> bool {
        self.calls().contains(&operation)
    }

    fn enter(&self, operation: &'static str) -> PortResult<()> {
        self.calls.lock().expect("calls lock").push(operation);
        match self.failures.get(operation) {
            Some(message) => Err(PortError::new(operation, message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LoadBalancing for FakeLoadBalancing {
    async fn describe_target_group(
        &self,
        target_group_id: &str,
    ) -> PortResult<Option<TargetGroupDescription>> {
        self.enter(DESCRIBE_TARGET_GROUPS)?;
        Ok(self.target_groups.get(target_group_id).cloned())
    }

    async fn describe_target_health(
        &self,
        target_group_id: &str,
    ) -> PortResult<Vec<TargetHealthDescription>> {
        self.enter(DESCRIBE_TARGET_HEALTH)?;
        Ok(self.health.get(target_group_id).cloned().unwrap_or_default())
    }

    async fn describe_load_balancer(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Option<LoadBalancerDescription>> {
        self.enter(DESCRIBE_LOAD_BALANCERS)?;
        Ok(self.load_balancers.get(load_balancer_id).cloned())
    }

    async fn describe_listeners(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Vec<ListenerDescription>> {
        self.enter(DESCRIBE_LISTENERS)?;
        Ok(self.listeners.get(load_balancer_id).cloned().unwrap_or_default())
    }
}

/// A listener forwarding to the given target groups.
pub fn listener(port: i32, protocol: &str, target_groups: &[&str]) -> ListenerDescription {
    ListenerDescription {
        listener_id: Some(format!("listener-{port}")),
        port: Some(port),
        protocol: Some(protocol.to_string()),
        forward_target_groups: target_groups.iter().map(|s| s.to_string()).collect(),
    }
}
