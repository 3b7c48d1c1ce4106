use crate::args::Args;
use crate::error::HubError;
use crate::hub::EventHub;
use crate::listener::Listener;

/// Turns any type that owns an [`EventHub`] into an event source.
///
/// Only `events` is required; the provided methods forward to the hub and
/// hand back the host so calls chain on the host type. Listeners still
/// receive the hub, not the host.
pub trait EventSource {
    fn events(&self) -> &EventHub;

    fn on(&self, event: &str, listener: impl Into<Listener>) -> &Self
    where
        Self: Sized,
    {
        self.events().on(event, listener);
        self
    }

    fn off(&self, event: Option<&str>, listener: Option<&Listener>) -> &Self
    where
        Self: Sized,
    {
        self.events().off(event, listener);
        self
    }

    fn once(&self, event: &str, listener: impl Into<Listener>) -> &Self
    where
        Self: Sized,
    {
        self.events().once(event, listener);
        self
    }

    fn emit(&self, event: &str, args: impl Into<Args>) -> Result<&Self, HubError>
    where
        Self: Sized,
    {
        self.events().emit(event, args)?;
        Ok(self)
    }
}

impl EventSource for EventHub {
    fn events(&self) -> &EventHub {
        self
    }
}
