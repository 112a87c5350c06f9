//! The holding page shown while a service wakes up.

use askama::Template;
use tracing::error;

#[derive(Template)]
#[template(path = "holding.html")]
struct HoldingTemplate<'a> {
    service: &'a str,
    refresh_secs: u32,
}

/// Render the self-refreshing holding page for `service`.
///
/// The service name comes straight from the query string and is
/// HTML-escaped by the template.
pub fn render_holding_page(service: &str, refresh_secs: u32) -> String {
    HoldingTemplate {
        service,
        refresh_secs,
    }
    .render()
    .unwrap_or_else(|e| {
        error!(error = %e, "holding page template failed");
        format!(
            "<html><head><meta http-equiv=\"refresh\" content=\"{refresh_secs}\"></head><body>Starting up.</body></html>"
        )
    })
}
