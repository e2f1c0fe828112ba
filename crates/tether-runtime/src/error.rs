use tether_core::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("unknown property: {key}")]
    UnknownProperty { key: String },

    #[error("unknown method: {name}")]
    UnknownMethod { name: String },

    #[error("watcher for `{key}` failed: {message}")]
    Callback { key: String, message: String },

    #[error("method `{name}` failed: {message}")]
    Method { name: String, message: String },
}

impl Error {
    #[must_use]
    pub fn callback(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Callback {
            key: key.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn method(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Method {
            name: name.into(),
            message: message.into(),
        }
    }
}
