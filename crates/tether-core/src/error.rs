use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("template parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("invalid selector: {selector:?}")]
    InvalidSelector { selector: String },

    #[error("hierarchy error: {message}")]
    Hierarchy { message: String },

    #[error("`{event}` listener failed: {source}")]
    Listener {
        event: String,
        #[source]
        source: Box<dyn std::error::Error>,
    },
}

impl DomError {
    #[must_use]
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn hierarchy(message: impl Into<String>) -> Self {
        Self::Hierarchy {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_selector(selector: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
        }
    }
}
