//! Hub error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HubError {
    #[error("listener for `{event}` failed: {source}")]
    Listener {
        event: String,
        #[source]
        source: anyhow::Error,
    },
}

impl HubError {
    pub fn listener(event: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Listener {
            event: event.into(),
            source,
        }
    }

    /// Name of the channel whose listener failed. For the wildcard pass this
    /// is the wildcard name, not the dispatched event.
    pub fn event(&self) -> &str {
        match self {
            Self::Listener { event, .. } => event,
        }
    }
}
