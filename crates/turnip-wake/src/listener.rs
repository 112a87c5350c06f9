//! Listener resolution: which externally reachable port/protocol forwards
//! to a target group.
//!
//! The listener enumeration is flattened once per request into a
//! `RouteTable` of `(target_group_id, route)` entries. Entry order is the
//! order the load-balancing API returned the listeners in, then action
//! order, then forward-config order. Lookups take the first entry for a
//! target group, so when several listeners forward to the same group the
//! earliest enumerated listener wins.

use std::time::Duration;

use tracing::debug;

use turnip_core::operation::DESCRIBE_LISTENERS;
use turnip_core::{ListenerDescription, ListenerRoute, LoadBalancing, Protocol, WakeError, WakeResult};

use crate::call::bounded;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteEntry {
    target_group_id: String,
    /// `Err` holds the reason an HTTP(S) listener could not be turned into
    /// a route. Only surfaced if a lookup actually lands on it.
    route: Result<ListenerRoute, String>,
}

/// Flattened target group → listener route table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build the table from listeners in API enumeration order.
    ///
    /// Listeners on protocols a browser cannot be redirected to (TCP, TLS,
    /// UDP...) contribute no entries.
    pub fn from_listeners(listeners: &[ListenerDescription]) -> Self {
        let mut entries = Vec::new();

        for listener in listeners {
            if listener.forward_target_groups.is_empty() {
                continue;
            }

            let route = match listener.protocol.as_deref() {
                None => Err(format!("listener {} has no protocol", listener_name(listener))),
                Some(raw) => match Protocol::from_listener(raw) {
                    Some(protocol) => listener_port(listener).map(|port| ListenerRoute { port, protocol }),
                    None => {
                        debug!(
                            listener = %listener_name(listener),
                            protocol = raw,
                            "skipping listener that cannot carry a redirect"
                        );
                        continue;
                    }
                },
            };

            for target_group_id in &listener.forward_target_groups {
                entries.push(RouteEntry {
                    target_group_id: target_group_id.clone(),
                    route: route.clone(),
                });
            }
        }

        Self { entries }
    }

    /// First route forwarding to `target_group_id`, or `None` when no
    /// listener forwards there.
    pub fn lookup(&self, target_group_id: &str) -> WakeResult<Option<ListenerRoute>> {
        match self
            .entries
            .iter()
            .find(|e| e.target_group_id == target_group_id)
        {
            Some(entry) => entry
                .route
                .clone()
                .map(Some)
                .map_err(|detail| WakeError::malformed(DESCRIBE_LISTENERS, detail)),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn listener_name(listener: &ListenerDescription) -> &str {
    listener.listener_id.as_deref().unwrap_or("<unnamed>")
}

fn listener_port(listener: &ListenerDescription) -> Result<u16, String> {
    let port = listener
        .port
        .ok_or_else(|| format!("listener {} has no port", listener_name(listener)))?;
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(format!(
            "listener {} has out-of-range port {port}",
            listener_name(listener)
        )),
    }
}

/// Find the port/protocol of the first listener on `load_balancer_id`
/// that forwards to `target_group_id`.
///
/// `Ok(None)` means the group is not attached to any HTTP(S) listener.
pub async fn resolve_listener(
    load_balancing: &dyn LoadBalancing,
    load_balancer_id: &str,
    target_group_id: &str,
    timeout: Duration,
) -> WakeResult<Option<ListenerRoute>> {
    let listeners = bounded(
        DESCRIBE_LISTENERS,
        timeout,
        load_balancing.describe_listeners(load_balancer_id),
    )
    .await?;

    let table = RouteTable::from_listeners(&listeners);
    let route = table.lookup(target_group_id)?;

    debug!(
        %load_balancer_id,
        %target_group_id,
        listeners = listeners.len(),
        routes = table.len(),
        matched = route.is_some(),
        "listener resolution"
    );
    Ok(route)
}
