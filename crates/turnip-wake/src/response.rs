//! HTTP responses for wake decisions.
//!
//! Built as plain `http::Response<String>` so any host (axum, a function
//! runtime, tests) can send them without conversion logic of its own.

use http::header::{CACHE_CONTROL, CONTENT_TYPE, LOCATION};
use http::{HeaderValue, Response, StatusCode};

use turnip_core::operation::DESCRIBE_LOAD_BALANCERS;
use turnip_core::{RoutingEndpoint, WakeDecision, WakeError, WakeResult};

use crate::holding::render_holding_page;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// 200 with the holding page.
pub fn holding_response(service: &str, refresh_secs: u32) -> Response<String> {
    let mut resp = Response::new(render_holding_page(service, refresh_secs));
    *resp.status_mut() = StatusCode::OK;
    let headers = resp.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    resp
}

/// 302 to the live endpoint.
///
/// Fails only if the load balancer reported a DNS name that cannot be
/// placed in a header.
pub fn redirect_response(endpoint: &RoutingEndpoint) -> WakeResult<Response<String>> {
    let location = endpoint.location();
    let value = HeaderValue::from_str(&location).map_err(|_| {
        WakeError::malformed(
            DESCRIBE_LOAD_BALANCERS,
            format!("redirect location {location:?} is not a valid header value"),
        )
    })?;

    let mut resp = Response::new(String::new());
    *resp.status_mut() = StatusCode::FOUND;
    let headers = resp.headers_mut();
    headers.insert(LOCATION, value);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(resp)
}

/// Map a decision to exactly one response.
pub fn decision_response(
    decision: &WakeDecision,
    service: &str,
    refresh_secs: u32,
) -> WakeResult<Response<String>> {
    match decision {
        WakeDecision::ScaleUp | WakeDecision::Holding => Ok(holding_response(service, refresh_secs)),
        WakeDecision::Redirect(endpoint) => redirect_response(endpoint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnip_core::Protocol;

    fn endpoint(dns_name: &str) -> RoutingEndpoint {
        RoutingEndpoint {
            load_balancer_id: "lb-a".to_string(),
            dns_name: dns_name.to_string(),
            port: 8443,
            protocol: Protocol::Https,
        }
    }

    #[test]
    fn holding_is_html_200() {
        let resp = holding_response("svc-a", 10);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], HTML_CONTENT_TYPE);
        assert!(resp.body().contains("svc-a"));
    }

    #[test]
    fn redirect_is_302_with_location() {
        let resp = redirect_response(&endpoint("lb.example.com")).unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "https://lb.example.com:8443");
        assert!(resp.body().is_empty());
    }

    #[test]
    fn redirect_rejects_unsendable_location() {
        let err = redirect_response(&endpoint("lb.example.com\r\nx: y")).unwrap_err();
        assert!(matches!(err, WakeError::MalformedResponse { .. }));
    }

    #[test]
    fn scale_up_renders_holding() {
        let resp = decision_response(&WakeDecision::ScaleUp, "svc-a", 10).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().contains(r#"content="10""#));
    }
}
