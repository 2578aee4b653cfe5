use thiserror::Error;

use crate::types::DataType;

pub type Result<T> = std::result::Result<T, SqlshimError>;

#[derive(Debug, Error)]
pub enum SqlshimError {
    #[error("unsupported function {name}: {reason} in `{fragment}`")]
    UnsupportedFunction {
        name: String,
        reason: String,
        fragment: String,
    },
    #[error("unsupported conversion from {from} to {to} in `{fragment}`")]
    UnsupportedConversion {
        from: DataType,
        to: DataType,
        fragment: String,
    },
    #[error("unsupported construct {construct} in `{fragment}`")]
    UnsupportedConstruct { construct: String, fragment: String },
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SqlshimError {
    pub(crate) fn unsupported_function(
        name: impl Into<String>,
        reason: impl Into<String>,
        fragment: impl ToString,
    ) -> Self {
        SqlshimError::UnsupportedFunction {
            name: name.into(),
            reason: reason.into(),
            fragment: fragment.to_string(),
        }
    }

    pub(crate) fn unsupported_construct(
        construct: impl Into<String>,
        fragment: impl ToString,
    ) -> Self {
        SqlshimError::UnsupportedConstruct {
            construct: construct.into(),
            fragment: fragment.to_string(),
        }
    }
}
