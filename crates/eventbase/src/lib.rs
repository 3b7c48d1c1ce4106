mod args;
mod error;
mod hub;
mod listener;
mod source;

pub use args::Args;
pub use error::HubError;
pub use hub::{EventHub, HubStats};
pub use listener::{Listener, ListenerResult};
pub use source::EventSource;
pub use serde_json::Value;

pub mod config;

pub use config::{load_config_from_file, ConfigFormat, ErrorPolicy, HubConfig};
