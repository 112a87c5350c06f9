//! Service state reads and the wake-up scale call.

use std::time::Duration;

use tracing::{debug, info};

use turnip_core::operation::{DESCRIBE_SERVICES, UPDATE_SERVICE};
use turnip_core::{Orchestrator, ServiceRef, ServiceState, WakeError, WakeResult, WAKE_REPLICAS};

use crate::call::bounded;

/// Read a service's replica counts and routing target.
///
/// Only the first load balancer attachment is consulted. A service with
/// no attachment, or whose first attachment names no target group, cannot
/// be redirected to and is reported as `MalformedResponse`.
pub async fn read_service_state(
    orchestrator: &dyn Orchestrator,
    target: &ServiceRef,
    timeout: Duration,
) -> WakeResult<ServiceState> {
    let desc = bounded(
        DESCRIBE_SERVICES,
        timeout,
        orchestrator.describe_service(&target.cluster, &target.service),
    )
    .await?
    .ok_or_else(|| WakeError::unavailable(DESCRIBE_SERVICES, format!("service {target} not found")))?;

    let desired_count = u32::try_from(desc.desired_count).map_err(|_| {
        WakeError::malformed(
            DESCRIBE_SERVICES,
            format!("negative desiredCount {}", desc.desired_count),
        )
    })?;
    let running_count = u32::try_from(desc.running_count).map_err(|_| {
        WakeError::malformed(
            DESCRIBE_SERVICES,
            format!("negative runningCount {}", desc.running_count),
        )
    })?;

    let attachment = desc.load_balancers.first().ok_or_else(|| {
        WakeError::malformed(
            DESCRIBE_SERVICES,
            format!("service {target} has no load balancer attached"),
        )
    })?;

    let routing_target_id = attachment
        .target_group_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            WakeError::malformed(
                DESCRIBE_SERVICES,
                format!("load balancer attachment of {target} has no target group"),
            )
        })?
        .to_string();

    debug!(
        %target,
        desired_count,
        running_count,
        %routing_target_id,
        "service state read"
    );

    Ok(ServiceState {
        desired_count,
        running_count,
        routing_target_id,
    })
}

/// Ask the orchestrator to run `WAKE_REPLICAS` replicas.
///
/// Returns as soon as the update is accepted; the replicas are not
/// awaited. Setting the same count twice is harmless upstream.
pub async fn scale_up(
    orchestrator: &dyn Orchestrator,
    target: &ServiceRef,
    timeout: Duration,
) -> WakeResult<()> {
    bounded(
        UPDATE_SERVICE,
        timeout,
        orchestrator.update_desired_count(&target.cluster, &target.service, WAKE_REPLICAS),
    )
    .await?;

    info!(%target, desired = WAKE_REPLICAS, "scale-up requested");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{service_desc, FakeOrchestrator};
    use turnip_core::{LoadBalancerAttachment, ServiceDescription};

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn target() -> ServiceRef {
        ServiceRef::new("demo", "svc-a")
    }

    #[tokio::test]
    async fn reads_counts_and_target_group() {
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", service_desc(2, 1, "tg-1"));

        let state = read_service_state(&orch, &target(), TIMEOUT).await.unwrap();
        assert_eq!(
            state,
            ServiceState {
                desired_count: 2,
                running_count: 1,
                routing_target_id: "tg-1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn tolerates_running_above_desired() {
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", service_desc(0, 3, "tg-1"));

        let state = read_service_state(&orch, &target(), TIMEOUT).await.unwrap();
        assert_eq!(state.desired_count, 0);
        assert_eq!(state.running_count, 3);
    }

    #[tokio::test]
    async fn unknown_service_is_unavailable() {
        let orch = FakeOrchestrator::new();

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            WakeError::UpstreamUnavailable { operation: DESCRIBE_SERVICES, .. }
        ));
        assert!(err.to_string().contains("demo/svc-a not found"));
    }

    #[tokio::test]
    async fn reported_lookup_failure_keeps_its_reason() {
        let orch = FakeOrchestrator::new()
            .failing(DESCRIBE_SERVICES, "service demo/svc-a not found: MISSING");

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("not found: MISSING"));
    }

    #[tokio::test]
    async fn api_error_is_unavailable() {
        let orch = FakeOrchestrator::new()
            .with_service("demo", "svc-a", service_desc(1, 1, "tg-1"))
            .failing(DESCRIBE_SERVICES, "AccessDenied");

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn missing_load_balancer_is_malformed() {
        let desc = ServiceDescription {
            load_balancers: Vec::new(),
            ..service_desc(1, 1, "unused")
        };
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", desc);

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert!(matches!(err, WakeError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn attachment_without_target_group_is_malformed() {
        let desc = ServiceDescription {
            load_balancers: vec![LoadBalancerAttachment {
                target_group_id: None,
                container_name: Some("web".to_string()),
                container_port: Some(80),
            }],
            ..service_desc(1, 1, "unused")
        };
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", desc);

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert!(err.to_string().contains("has no target group"));
    }

    #[tokio::test]
    async fn negative_count_is_malformed() {
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", service_desc(-1, 0, "tg-1"));

        let err = read_service_state(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert!(matches!(err, WakeError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn first_attachment_wins() {
        let mut desc = service_desc(1, 1, "tg-first");
        desc.load_balancers.push(LoadBalancerAttachment {
            target_group_id: Some("tg-second".to_string()),
            ..Default::default()
        });
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", desc);

        let state = read_service_state(&orch, &target(), TIMEOUT).await.unwrap();
        assert_eq!(state.routing_target_id, "tg-first");
    }

    #[tokio::test]
    async fn scale_up_requests_one_replica() {
        let orch = FakeOrchestrator::new().with_service("demo", "svc-a", service_desc(0, 0, "tg-1"));

        scale_up(&orch, &target(), TIMEOUT).await.unwrap();
        assert_eq!(
            orch.scale_calls(),
            vec![("demo".to_string(), "svc-a".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn scale_up_failure_is_unavailable() {
        let orch = FakeOrchestrator::new().failing(UPDATE_SERVICE, "ThrottlingException");

        let err = scale_up(&orch, &target(), TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            WakeError::UpstreamUnavailable { operation: UPDATE_SERVICE, .. }
        ));
        assert!(orch.scale_calls().is_empty());
    }
}
