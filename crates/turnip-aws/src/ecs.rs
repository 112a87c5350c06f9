//! `Orchestrator` over Amazon ECS.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{Failure, Service};
use aws_sdk_ecs::Client;
use tracing::debug;

use turnip_core::operation::{DESCRIBE_SERVICES, UPDATE_SERVICE};
use turnip_core::{LoadBalancerAttachment, Orchestrator, PortError, PortResult, ServiceDescription};

/// ECS services as the orchestration control plane.
#[derive(Clone)]
pub struct EcsOrchestrator {
    client: Client,
}

impl EcsOrchestrator {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl Orchestrator for EcsOrchestrator {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> PortResult<Option<ServiceDescription>> {
        let out = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(|e| PortError::new(DESCRIBE_SERVICES, DisplayErrorContext(e).to_string()))?;

        for failure in out.failures() {
            debug!(
                %cluster,
                %service,
                arn = ?failure.arn(),
                reason = ?failure.reason(),
                detail = ?failure.detail(),
                "ecs reported service lookup failure"
            );
        }

        let found = out
            .services()
            .iter()
            .find(|s| is_active(s))
            .map(service_description);

        if found.is_none() {
            if let Some(reasons) = failure_reasons(out.failures()) {
                return Err(PortError::new(
                    DESCRIBE_SERVICES,
                    format!("service {cluster}/{service} not found: {reasons}"),
                ));
            }
        }
        Ok(found)
    }

    async fn update_desired_count(&self, cluster: &str, service: &str, count: u32) -> PortResult<()> {
        let desired = i32::try_from(count)
            .map_err(|_| PortError::new(UPDATE_SERVICE, format!("desired count {count} out of range")))?;

        self.client
            .update_service()
            .cluster(cluster)
            .service(service)
            .desired_count(desired)
            .send()
            .await
            .map_err(|e| PortError::new(UPDATE_SERVICE, DisplayErrorContext(e).to_string()))?;

        Ok(())
    }
}

/// Deleted services keep answering DescribeServices with status
/// `INACTIVE`; they are treated as missing.
fn is_active(service: &Service) -> bool {
    service.status() != Some("INACTIVE")
}

/// Reasons from the `failures` list (e.g. `MISSING`), comma separated.
fn failure_reasons(failures: &[Failure]) -> Option<String> {
    let reasons: Vec<&str> = failures.iter().filter_map(|f| f.reason()).collect();
    if reasons.is_empty() {
        None
    } else {
        Some(reasons.join(", "))
    }
}

fn service_description(service: &Service) -> ServiceDescription {
    ServiceDescription {
        name: service.service_name().map(str::to_string),
        desired_count: service.desired_count(),
        running_count: service.running_count(),
        load_balancers: service
            .load_balancers()
            .iter()
            .map(|lb| LoadBalancerAttachment {
                target_group_id: lb.target_group_arn().map(str::to_string),
                container_name: lb.container_name().map(str::to_string),
                container_port: lb.container_port(),
            })
            .collect(),
    }
}
