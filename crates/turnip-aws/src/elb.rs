//! `LoadBalancing` over Elastic Load Balancing v2.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticloadbalancingv2::error::DisplayErrorContext;
use aws_sdk_elasticloadbalancingv2::types::{Action, Listener};
use aws_sdk_elasticloadbalancingv2::Client;
use tracing::debug;

use turnip_core::operation::{
    DESCRIBE_LISTENERS, DESCRIBE_LOAD_BALANCERS, DESCRIBE_TARGET_GROUPS, DESCRIBE_TARGET_HEALTH,
};
use turnip_core::{
    ListenerDescription, LoadBalancerDescription, LoadBalancing, PortError, PortResult,
    TargetGroupDescription, TargetHealthDescription,
};

/// Application/network load balancers as the load-balancing control plane.
#[derive(Clone)]
pub struct ElbLoadBalancing {
    client: Client,
}

impl ElbLoadBalancing {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl LoadBalancing for ElbLoadBalancing {
    async fn describe_target_group(
        &self,
        target_group_id: &str,
    ) -> PortResult<Option<TargetGroupDescription>> {
        let out = match self
            .client
            .describe_target_groups()
            .target_group_arns(target_group_id)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_target_group_not_found_exception()) =>
            {
                return Ok(None);
            }
            Err(e) => {
                return Err(PortError::new(
                    DESCRIBE_TARGET_GROUPS,
                    DisplayErrorContext(e).to_string(),
                ));
            }
        };

        Ok(out.target_groups().first().map(|tg| TargetGroupDescription {
            target_group_id: tg
                .target_group_arn()
                .unwrap_or(target_group_id)
                .to_string(),
            load_balancer_ids: tg.load_balancer_arns().to_vec(),
        }))
    }

    async fn describe_target_health(
        &self,
        target_group_id: &str,
    ) -> PortResult<Vec<TargetHealthDescription>> {
        let out = self
            .client
            .describe_target_health()
            .target_group_arn(target_group_id)
            .send()
            .await
            .map_err(|e| PortError::new(DESCRIBE_TARGET_HEALTH, DisplayErrorContext(e).to_string()))?;

        Ok(out
            .target_health_descriptions()
            .iter()
            .map(|d| TargetHealthDescription {
                target_id: d.target().and_then(|t| t.id()).map(str::to_string),
                state: d
                    .target_health()
                    .and_then(|h| h.state())
                    .map(|s| s.as_str().to_string()),
                reason: d
                    .target_health()
                    .and_then(|h| h.reason())
                    .map(|r| r.as_str().to_string()),
            })
            .collect())
    }

    async fn describe_load_balancer(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Option<LoadBalancerDescription>> {
        let out = match self
            .client
            .describe_load_balancers()
            .load_balancer_arns(load_balancer_id)
            .send()
            .await
        {
            Ok(out) => out,
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_load_balancer_not_found_exception()) =>
            {
                return Ok(None);
            }
            Err(e) => {
                return Err(PortError::new(
                    DESCRIBE_LOAD_BALANCERS,
                    DisplayErrorContext(e).to_string(),
                ));
            }
        };

        Ok(out.load_balancers().first().map(|lb| LoadBalancerDescription {
            load_balancer_id: lb
                .load_balancer_arn()
                .unwrap_or(load_balancer_id)
                .to_string(),
            dns_name: lb.dns_name().map(str::to_string),
            name: lb.load_balancer_name().map(str::to_string),
        }))
    }

    async fn describe_listeners(
        &self,
        load_balancer_id: &str,
    ) -> PortResult<Vec<ListenerDescription>> {
        let mut listeners = Vec::new();
        let mut marker: Option<String> = None;

        // Follow NextMarker so enumeration order spans every page.
        loop {
            let out = self
                .client
                .describe_listeners()
                .load_balancer_arn(load_balancer_id)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| PortError::new(DESCRIBE_LISTENERS, DisplayErrorContext(e).to_string()))?;

            listeners.extend(out.listeners().iter().map(listener_description));

            match out.next_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(%load_balancer_id, listeners = listeners.len(), "listeners described");
        Ok(listeners)
    }
}

fn listener_description(listener: &Listener) -> ListenerDescription {
    ListenerDescription {
        listener_id: listener.listener_arn().map(str::to_string),
        port: listener.port(),
        protocol: listener.protocol().map(|p| p.as_str().to_string()),
        forward_target_groups: listener
            .default_actions()
            .iter()
            .flat_map(action_target_groups)
            .collect(),
    }
}

fn action_target_groups(action: &Action) -> Vec<String> {
    let weighted: Vec<&str> = action
        .forward_config()
        .map(|fc| {
            fc.target_groups()
                .iter()
                .filter_map(|tg| tg.target_group_arn())
                .collect()
        })
        .unwrap_or_default();
    forward_targets(action.target_group_arn(), &weighted)
}

/// Target groups an action forwards to.
///
/// A single-group forward reports the group both in `TargetGroupArn` and
/// in `ForwardConfig`; the weighted list is authoritative when present.
fn forward_targets(single: Option<&str>, weighted: &[&str]) -> Vec<String> {
    if !weighted.is_empty() {
        weighted.iter().map(|s| s.to_string()).collect()
    } else {
        single.map(str::to_string).into_iter().collect()
    }
}
