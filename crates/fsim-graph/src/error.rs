use fsim_core::ResourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("tool graph has no nodes")]
    EmptyGraph,

    #[error("duplicate tool node '{0}'")]
    DuplicateNode(String),

    #[error("edge references unknown tool node '{0}'")]
    UnknownNode(String),

    #[error("cycle detected in tool graph involving: {}", involved.join(", "))]
    Cycle { involved: Vec<String> },

    #[error("no tool template named '{0}'")]
    MissingTemplate(String),

    #[error("template '{template}' declares an invalid {resource} load ({load})")]
    InvalidLoad {
        template: String,
        resource: ResourceKind,
        load:     f64,
    },
}

pub type GraphResult<T> = Result<T, GraphError>;
