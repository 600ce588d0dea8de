//! Per-template normalization and label synthesis.
//!
//! `annotate` folds the input templates into a new catalog, in order. Each
//! template is normalized (description, volumes, network) and, when it
//! publishes ports under a name, merged with Traefik and Mafl labels. A
//! template whose labels cannot be built is handled by the configured
//! [`PortPolicy`].

pub mod routing;
pub mod volumes;

use crate::catalog::{Catalog, Template, merge_labels};
use crate::error::{AnnotateError, LabelError};
use crate::markdown::strip_markdown;
use routing::{UNCATEGORIZED, dashboard_labels, proxy_labels, service_name, service_port};
use tracing::{debug, info, warn};

/// Network every non-bridge template is attached to.
pub const DEFAULT_NETWORK: &str = "web";
const BRIDGE_NETWORK: &str = "bridge";

/// What to do with a template whose labels cannot be synthesized.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PortPolicy {
    /// Leave the template unlabeled, warn, and keep going.
    #[default]
    Skip,
    /// Fail the whole batch.
    Abort,
}

/// Result of annotating one template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Labels were merged under this service name.
    Labeled { service: String },
    /// No ports or no name; only normalization applied.
    NotRoutable,
    /// Synthesis was attempted and failed.
    Skipped(LabelError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTemplate {
    pub index: usize,
    pub name: String,
    pub reason: LabelError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Counts gathered over one annotation pass.
pub struct AnnotationReport {
    pub labeled: usize,
    pub not_routable: usize,
    pub skipped: Vec<SkippedTemplate>,
}

impl AnnotationReport {
    pub fn total(&self) -> usize {
        self.labeled + self.not_routable + self.skipped.len()
    }
}

#[derive(Clone, Debug)]
pub struct Annotated {
    pub catalog: Catalog,
    pub report: AnnotationReport,
}

/// Template annotator configured with a partial-result policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct Annotator {
    policy: PortPolicy,
}

impl Annotator {
    pub fn new(policy: PortPolicy) -> Self {
        Self { policy }
    }

    /// Annotate every template, preserving input order.
    pub fn annotate(&self, templates: Vec<Template>) -> Result<Annotated, AnnotateError> {
        let mut report = AnnotationReport::default();
        let mut annotated = Vec::with_capacity(templates.len());

        for (index, template) in templates.into_iter().enumerate() {
            let (template, outcome) = annotate_template(template);
            match outcome {
                Outcome::Labeled { service } => {
                    debug!(index, %service, "labeled template");
                    report.labeled += 1;
                }
                Outcome::NotRoutable => report.not_routable += 1,
                Outcome::Skipped(reason) => {
                    let name = display_name(&template);
                    if self.policy == PortPolicy::Abort {
                        return Err(AnnotateError::Template {
                            index,
                            name,
                            source: reason,
                        });
                    }
                    warn!(index, %name, error = %reason, "skipping label synthesis");
                    report.skipped.push(SkippedTemplate {
                        index,
                        name,
                        reason,
                    });
                }
            }
            annotated.push(template);
        }

        Ok(Annotated {
            catalog: Catalog::new(annotated),
            report,
        })
    }
}

/// Annotate a catalog, skipping templates whose labels cannot be built.
pub fn annotate(templates: Vec<Template>) -> Catalog {
    let annotated = templates
        .into_iter()
        .map(|template| {
            let (template, outcome) = annotate_template(template);
            if let Outcome::Skipped(reason) = outcome {
                warn!(name = %display_name(&template), error = %reason, "skipping label synthesis");
            }
            template
        })
        .collect();
    Catalog::new(annotated)
}

/// Apply every normalization step to one template, then synthesize labels if
/// it is routable.
pub fn annotate_template(mut template: Template) -> (Template, Outcome) {
    normalize(&mut template);

    let outcome = match synthesize_labels(&mut template) {
        Ok(Some(service)) => {
            log_labeled(&template);
            Outcome::Labeled { service }
        }
        Ok(None) => Outcome::NotRoutable,
        Err(reason) => Outcome::Skipped(reason),
    };
    (template, outcome)
}

/// Description, volume and network fixes; independent of label synthesis.
pub fn normalize(template: &mut Template) {
    if let Some(description) = template.description.as_mut() {
        *description = strip_markdown(description);
    }

    if let Some(volumes) = template.volumes.as_mut() {
        volumes::rewrite_binds(volumes);
        volumes::collapse_single_config_volume(volumes);
    }

    if template.network.as_deref() != Some(BRIDGE_NETWORK) {
        template.network = Some(DEFAULT_NETWORK.to_string());
    }
}

/// Merge proxy and dashboard labels. Returns the service name, or `None` when
/// the template has no ports or no name. Nothing is modified on error.
fn synthesize_labels(template: &mut Template) -> Result<Option<String>, LabelError> {
    let (Some(ports), Some(name)) = (template.published_ports(), template.name.as_deref()) else {
        return Ok(None);
    };
    let port = service_port(ports)?.to_string();
    let service = service_name(name)?;

    let mut additions = proxy_labels(&service, &port);
    additions.extend(dashboard_labels(template, &service));

    if template
        .categories
        .as_ref()
        .is_none_or(|categories| categories.is_empty())
    {
        template.categories = Some(vec![UNCATEGORIZED.to_string()]);
    }
    merge_labels(template.labels.get_or_insert_with(Vec::new), additions);
    Ok(Some(service))
}

fn display_name(template: &Template) -> String {
    template
        .name
        .clone()
        .or_else(|| template.title.clone())
        .unwrap_or_else(|| "<unnamed>".to_string())
}

fn log_labeled(template: &Template) {
    match serde_json::to_string_pretty(template) {
        Ok(rendered) => info!("annotated template:\n{rendered}"),
        Err(err) => warn!(error = %err, "unable to render annotated template"),
    }
}
