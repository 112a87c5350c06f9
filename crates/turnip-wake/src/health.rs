//! Target health reads.

use std::time::Duration;

use tracing::{debug, warn};

use turnip_core::operation::DESCRIBE_TARGET_HEALTH;
use turnip_core::{
    HealthState, LoadBalancing, TargetHealth, TargetHealthDescription, UnknownHealthState,
    WakeError, WakeResult,
};

use crate::call::bounded;

/// Read the health of every target registered in a target group.
///
/// An empty result is valid: nothing is registered yet.
pub async fn read_target_health(
    load_balancing: &dyn LoadBalancing,
    target_group_id: &str,
    timeout: Duration,
) -> WakeResult<Vec<TargetHealth>> {
    let descs = bounded(
        DESCRIBE_TARGET_HEALTH,
        timeout,
        load_balancing.describe_target_health(target_group_id),
    )
    .await?;

    let targets = descs
        .into_iter()
        .map(to_target_health)
        .collect::<WakeResult<Vec<_>>>()?;

    debug!(
        %target_group_id,
        targets = targets.len(),
        healthy = targets.iter().filter(|t| t.state == HealthState::Healthy).count(),
        "target health read"
    );
    Ok(targets)
}

fn to_target_health(desc: TargetHealthDescription) -> WakeResult<TargetHealth> {
    let target_id = desc
        .target_id
        .ok_or_else(|| WakeError::malformed(DESCRIBE_TARGET_HEALTH, "target without id"))?;
    let raw_state = desc.state.ok_or_else(|| {
        WakeError::malformed(
            DESCRIBE_TARGET_HEALTH,
            format!("target {target_id} has no health state"),
        )
    })?;

    // Newer states (e.g. `unhealthy.draining`) are never healthy.
    let state = raw_state.parse::<HealthState>().unwrap_or_else(|UnknownHealthState(other)| {
        warn!(%target_id, state = %other, "unrecognized target state, treating as unavailable");
        HealthState::Unavailable
    });

    Ok(TargetHealth { target_id, state })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeLoadBalancing;
    use turnip_core::any_healthy;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn reads_states_in_order() {
        let lb = FakeLoadBalancing::new()
            .with_health("tg-1", &[("t1", "initial"), ("t2", "healthy")]);

        let targets = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap();
        assert_eq!(
            targets,
            vec![
                TargetHealth { target_id: "t1".to_string(), state: HealthState::Initial },
                TargetHealth { target_id: "t2".to_string(), state: HealthState::Healthy },
            ]
        );
        assert!(any_healthy(&targets));
    }

    #[tokio::test]
    async fn empty_group_is_not_an_error() {
        let lb = FakeLoadBalancing::new();

        let targets = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap();
        assert!(targets.is_empty());
        assert!(!any_healthy(&targets));
    }

    #[tokio::test]
    async fn unknown_state_is_unavailable() {
        let lb = FakeLoadBalancing::new().with_health("tg-1", &[("t1", "unhealthy.draining")]);

        let targets = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap();
        assert_eq!(targets[0].state, HealthState::Unavailable);
    }

    #[tokio::test]
    async fn missing_state_is_malformed() {
        let lb = FakeLoadBalancing::new().with_health_descs(
            "tg-1",
            vec![TargetHealthDescription {
                target_id: Some("t1".to_string()),
                state: None,
                reason: Some("Elb.InternalError".to_string()),
            }],
        );

        let err = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap_err();
        assert!(matches!(
            err,
            WakeError::MalformedResponse { operation: DESCRIBE_TARGET_HEALTH, .. }
        ));
    }

    #[tokio::test]
    async fn missing_target_id_is_malformed() {
        let lb = FakeLoadBalancing::new().with_health_descs(
            "tg-1",
            vec![TargetHealthDescription {
                target_id: None,
                state: Some("healthy".to_string()),
                reason: None,
            }],
        );

        let err = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn api_error_is_unavailable() {
        let lb = FakeLoadBalancing::new().failing(DESCRIBE_TARGET_HEALTH, "TargetGroupNotFound");

        let err = read_target_health(&lb, "tg-1", TIMEOUT).await.unwrap_err();
        assert!(matches!(err, WakeError::UpstreamUnavailable { .. }));
    }
}
