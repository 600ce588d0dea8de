//! Traefik routing and Mafl dashboard label synthesis.
//!
//! Both label sets are keyed by the service name derived from the template
//! `name`. Hostnames are left as `<service>.{$TRAEFIK_INGRESS_DOMAIN}`; the
//! placeholder is expanded by the orchestrator that deploys the template.

use crate::catalog::{Label, Template};
use crate::error::LabelError;
use crate::markdown::first_sentence;

/// Unexpanded ingress domain reference written into host rules and links.
pub const INGRESS_DOMAIN_PLACEHOLDER: &str = "{$TRAEFIK_INGRESS_DOMAIN}";
/// Dashboard group used when a template has no categories.
pub const DEFAULT_GROUP: &str = "Services";
/// Category assigned to templates that had none.
pub const UNCATEGORIZED: &str = "Uncategorized Services";
const DEFAULT_ICON: &str = "simple-icons:docker";
const ICON_COLOR: &str = "#007acc";
const STATUS_INTERVAL_SECS: u32 = 60;

/// Port/protocol split of a `host:container/proto` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping<'a> {
    pub port: &'a str,
    pub protocol: &'a str,
}

impl<'a> PortMapping<'a> {
    /// Parse a published port. Entries without a `:` are not routable and
    /// yield `None`. The port is always the second `:` segment, so an
    /// `ip:host:container` entry resolves to its host port. A missing
    /// protocol means tcp.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let segment = raw.split(':').nth(1)?;
        let mut parts = segment.split('/');
        let port = parts.next().unwrap_or(segment);
        let protocol = parts.next().unwrap_or("tcp");
        Some(Self { port, protocol })
    }

    /// Exact match; `TCP` is not tcp.
    pub fn is_tcp(&self) -> bool {
        self.protocol == "tcp"
    }
}

/// Port of the first tcp mapping among `ports`, scanning in order.
pub fn service_port(ports: &[String]) -> Result<&str, LabelError> {
    ports
        .iter()
        .filter_map(|raw| PortMapping::parse(raw))
        .find(PortMapping::is_tcp)
        .map(|mapping| mapping.port)
        .ok_or_else(|| LabelError::NoTcpPort {
            ports: ports.to_vec(),
        })
}

/// Lowercased `name` reduced to alphanumerics, `-`, `_` and `.`.
pub fn service_name(name: &str) -> Result<String, LabelError> {
    let sanitized: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if sanitized.is_empty() {
        return Err(LabelError::EmptyServiceName {
            name: name.to_string(),
        });
    }
    Ok(sanitized)
}

/// Host the service is published under.
pub fn service_host(service: &str) -> String {
    format!("{service}.{INGRESS_DOMAIN_PLACEHOLDER}")
}

/// Traefik labels routing HTTPS traffic for `service` to `port`.
pub fn proxy_labels(service: &str, port: &str) -> Vec<Label> {
    let router = format!("traefik.http.routers.{service}");
    vec![
        Label::new("traefik.enable", "true"),
        Label::new(
            format!("{router}.rule"),
            format!("Host(`{}`)", service_host(service)),
        ),
        Label::new(format!("{router}.entrypoints"), "https"),
        Label::new(
            format!("traefik.http.services.{service}.loadbalancer.server.port"),
            port,
        ),
        Label::new(format!("{router}.tls"), "true"),
        Label::new(format!("{router}.tls.certresolver"), "default"),
        Label::new(format!("{router}.middlewares"), "traefik-forward-auth"),
    ]
}

/// Mafl dashboard labels for a template published as `service`.
///
/// Expects the description to be sanitized already. The description label is
/// omitted when the template has no description.
pub fn dashboard_labels(template: &Template, service: &str) -> Vec<Label> {
    let mut labels = vec![Label::new("mafl.enable", "true")];

    if let Some(title) = template.title.as_ref().or(template.name.as_ref()) {
        labels.push(Label::new("mafl.title", title.as_str()));
    }
    if let Some(description) = &template.description {
        labels.push(Label::new("mafl.description", first_sentence(description)));
    }
    labels.extend([
        Label::new("mafl.link", format!("https://{}", service_host(service))),
        Label::new("mafl.icon.wrap", "true"),
        Label::new("mafl.icon.color", ICON_COLOR),
        Label::new("mafl.status.enabled", "true"),
        Label::new("mafl.status.interval", STATUS_INTERVAL_SECS.to_string()),
    ]);

    let group = template
        .categories
        .as_ref()
        .and_then(|categories| categories.first())
        .map(String::as_str)
        .unwrap_or(DEFAULT_GROUP);
    labels.push(Label::new("mafl.group", group));

    match &template.logo {
        Some(logo) => labels.push(Label::new("mafl.icon.url", logo.as_str())),
        None => labels.push(Label::new("mafl.icon.name", DEFAULT_ICON)),
    }
    labels
}
