use thiserror::Error;

/// Reasons label synthesis cannot complete for a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("no tcp port mapping among {ports:?}")]
    NoTcpPort { ports: Vec<String> },

    #[error("name {name:?} has no characters usable in a service name")]
    EmptyServiceName { name: String },
}

/// Batch-level failure raised when the abort policy is in effect.
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("template #{index} ({name}) cannot be labeled")]
    Template {
        index: usize,
        name: String,
        #[source]
        source: LabelError,
    },
}
