//! Load balancer lookups: which load balancer fronts a target group, and
//! what its public DNS name is.

use std::time::Duration;

use tracing::debug;

use turnip_core::operation::{DESCRIBE_LOAD_BALANCERS, DESCRIBE_TARGET_GROUPS};
use turnip_core::{LoadBalancerInfo, LoadBalancing, WakeError, WakeResult};

use crate::call::bounded;

/// Resolve the load balancer a target group is attached to.
///
/// Only the first load balancer listed for the group is used.
pub async fn parent_load_balancer(
    load_balancing: &dyn LoadBalancing,
    target_group_id: &str,
    timeout: Duration,
) -> WakeResult<String> {
    let group = bounded(
        DESCRIBE_TARGET_GROUPS,
        timeout,
        load_balancing.describe_target_group(target_group_id),
    )
    .await?
    .ok_or_else(|| {
        WakeError::unavailable(
            DESCRIBE_TARGET_GROUPS,
            format!("target group {target_group_id} not found"),
        )
    })?;

    let load_balancer_id = group.load_balancer_ids.into_iter().next().ok_or_else(|| {
        WakeError::malformed(
            DESCRIBE_TARGET_GROUPS,
            format!("target group {target_group_id} is not attached to a load balancer"),
        )
    })?;

    debug!(%target_group_id, %load_balancer_id, "parent load balancer resolved");
    Ok(load_balancer_id)
}

/// Read a load balancer's DNS name and display name.
pub async fn read_load_balancer(
    load_balancing: &dyn LoadBalancing,
    load_balancer_id: &str,
    timeout: Duration,
) -> WakeResult<LoadBalancerInfo> {
    let desc = bounded(
        DESCRIBE_LOAD_BALANCERS,
        timeout,
        load_balancing.describe_load_balancer(load_balancer_id),
    )
    .await?
    .ok_or_else(|| {
        WakeError::unavailable(
            DESCRIBE_LOAD_BALANCERS,
            format!("load balancer {load_balancer_id} not found"),
        )
    })?;

    let dns_name = desc.dns_name.filter(|d| !d.is_empty()).ok_or_else(|| {
        WakeError::malformed(
            DESCRIBE_LOAD_BALANCERS,
            format!("load balancer {load_balancer_id} has no DNS name"),
        )
    })?;

    debug!(%load_balancer_id, %dns_name, name = ?desc.name, "load balancer read");
    Ok(LoadBalancerInfo {
        dns_name,
        name: desc.name,
    })
}
