use crate::args::Args;
use crate::config::{ErrorPolicy, HubConfig};
use crate::error::HubError;
use crate::listener::{Listener, ListenerId, Slot};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

type Channels = HashMap<String, Vec<Slot>>;

/// Snapshot of what a hub currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    /// Events (wildcard included) with at least one live listener.
    pub events: usize,
    /// Live listeners across every event, wildcard included.
    pub listeners: usize,
    pub wildcard_listeners: usize,
    /// Removed slots not yet compacted by a dispatch walk.
    pub tombstones: usize,
}

/// Synchronous publish/subscribe hub.
///
/// Listeners run on the caller's stack, in registration order, and receive
/// the hub itself so they can register, remove or dispatch re-entrantly. The
/// internal lock is never held while a listener runs.
///
/// ```
/// use eventbase::{args, EventHub};
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use std::sync::Arc;
///
/// let total = Arc::new(AtomicI64::new(0));
/// let hub = EventHub::new();
///
/// let t = total.clone();
/// hub.on("ping", move |_: &EventHub, args: &eventbase::Args| -> eventbase::ListenerResult {
///     t.fetch_add(args[0].as_i64().unwrap_or(0), Ordering::SeqCst);
///     Ok(())
/// });
///
/// hub.emit("ping", args![5]).unwrap();
/// assert_eq!(total.load(Ordering::SeqCst), 5);
/// ```
pub struct EventHub {
    config: HubConfig,
    /// Created on first registration.
    channels: Mutex<Option<Channels>>,
    next_id: AtomicU64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            config,
            channels: Mutex::new(None),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn wildcard(&self) -> &str {
        &self.config.wildcard
    }

    /// Append `listener` to `event`'s sequence. Registering the same handle
    /// again adds a second, independent slot.
    ///
    /// Empty names are ignored: `off` reads an empty name as "every event",
    /// so such a registration could never be removed on its own.
    pub fn on(&self, event: &str, listener: impl Into<Listener>) -> &Self {
        if event.is_empty() {
            tracing::warn!("ignoring listener registered under an empty event name");
            return self;
        }
        let listener = listener.into();
        let mut channels = self.channels.lock();
        // Ids are issued under the lock so each sequence stays sorted by id.
        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        channels
            .get_or_insert_with(HashMap::new)
            .entry(event.to_string())
            .or_default()
            .push(Slot::Active(id, listener));
        tracing::debug!(event, id, "listener registered");
        self
    }

    pub fn bind(&self, event: &str, listener: impl Into<Listener>) -> &Self {
        self.on(event, listener)
    }

    pub fn add_listener(&self, event: &str, listener: impl Into<Listener>) -> &Self {
        self.on(event, listener)
    }

    /// Remove listeners.
    ///
    /// - no event (or an empty name): every listener of every event is dropped
    /// - event only: that event's sequence is emptied
    /// - both: the first live registration of `listener` under `event` is
    ///   neutralized in place and compacted by the next dispatch walk
    ///
    /// Unknown events and listeners are ignored.
    pub fn off(&self, event: Option<&str>, listener: Option<&Listener>) -> &Self {
        // Dropped listeners may own values whose `Drop` re-enters the hub, so
        // they are released only after the lock.
        let removed: Vec<Slot> = {
            let mut guard = self.channels.lock();
            let channels = guard.get_or_insert_with(HashMap::new);

            match (event.filter(|e| !e.is_empty()), listener) {
                (None, _) => {
                    tracing::debug!("all listeners removed");
                    std::mem::take(channels).into_values().flatten().collect()
                }
                (Some(event), None) => {
                    tracing::debug!(event, "event listeners cleared");
                    channels
                        .insert(event.to_string(), Vec::new())
                        .unwrap_or_default()
                }
                (Some(event), Some(listener)) => channels
                    .get_mut(event)
                    .and_then(|slots| slots.iter_mut().find(|slot| slot.holds(listener)))
                    .map(|slot| {
                        let id = slot.id();
                        tracing::debug!(event, id, "listener removed");
                        vec![std::mem::replace(slot, Slot::Removed(id))]
                    })
                    .unwrap_or_default(),
            }
        };
        drop(removed);
        self
    }

    pub fn unbind(&self, event: Option<&str>, listener: Option<&Listener>) -> &Self {
        self.off(event, listener)
    }

    pub fn remove_listener(&self, event: Option<&str>, listener: Option<&Listener>) -> &Self {
        self.off(event, listener)
    }

    /// Register `listener` to run on the next dispatch of `event` only.
    ///
    /// The hub holds a wrapper, not `listener` itself, so `off(event, listener)`
    /// does not cancel a pending one-shot; `off(event)` does. Empty names are
    /// ignored as in [`EventHub::on`].
    pub fn once(&self, event: &str, listener: impl Into<Listener>) -> &Self {
        let wrapper = Listener::once(event.to_string(), listener.into());
        self.on(event, wrapper)
    }

    /// Dispatch `event`.
    ///
    /// Listeners of `event` receive `args`; wildcard listeners then receive
    /// `args` with the event name in front. Under [`ErrorPolicy::Propagate`]
    /// the first failing listener ends the call, skipping every listener
    /// after it including the wildcard pass.
    pub fn emit(&self, event: &str, args: impl Into<Args>) -> Result<&Self, HubError> {
        let args = args.into();
        tracing::trace!(event, args = args.len(), "dispatch");

        self.run_pass(event, &args)?;
        let wildcard = self.wildcard();
        if self.has_channel(wildcard) {
            self.run_pass(wildcard, &args.with_event(event))?;
        }
        Ok(self)
    }

    pub fn trigger(&self, event: &str, args: impl Into<Args>) -> Result<&Self, HubError> {
        self.emit(event, args)
    }

    pub fn fire(&self, event: &str, args: impl Into<Args>) -> Result<&Self, HubError> {
        self.emit(event, args)
    }

    /// Walk one channel. Only slots registered before the walk started are
    /// visited; later registrations wait for the next dispatch.
    fn run_pass(&self, channel: &str, args: &Args) -> Result<(), HubError> {
        let bound = self.next_id.load(Ordering::Acquire);
        let mut cursor = None;

        while let Some((id, listener)) = self.next_live(channel, cursor, bound) {
            cursor = Some(id);
            if let Err(source) = listener.call(self, args) {
                match self.config.error_policy {
                    ErrorPolicy::Propagate => return Err(HubError::listener(channel, source)),
                    ErrorPolicy::Isolate => {
                        tracing::warn!(event = channel, id, error = %source, "listener failed");
                    }
                }
            }
        }
        Ok(())
    }

    /// Find the first live slot after `after`, compacting the tombstones in
    /// between. Resuming by id rather than index keeps the walk stable when
    /// listeners (or nested dispatches) reshape the sequence.
    fn next_live(
        &self,
        channel: &str,
        after: Option<ListenerId>,
        bound: ListenerId,
    ) -> Option<(ListenerId, Listener)> {
        let mut guard = self.channels.lock();
        let slots = guard.as_mut()?.get_mut(channel)?;
        let mut index = match after {
            Some(after) => slots.partition_point(|slot| slot.id() <= after),
            None => 0,
        };

        while let Some(slot) = slots.get(index) {
            match slot {
                Slot::Active(id, _) if *id >= bound => return None,
                Slot::Active(id, listener) => return Some((*id, listener.clone())),
                Slot::Removed(id) => {
                    tracing::trace!(event = channel, id = *id, "compacting removed listener");
                    slots.remove(index);
                }
            }
        }
        None
    }

    fn has_channel(&self, channel: &str) -> bool {
        self.channels
            .lock()
            .as_ref()
            .is_some_and(|channels| channels.contains_key(channel))
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Live registrations for `event`; tombstones are not counted.
    pub fn listener_count(&self, event: &str) -> usize {
        self.channels
            .lock()
            .as_ref()
            .and_then(|channels| channels.get(event))
            .map(|slots| slots.iter().filter(|slot| slot.is_active()).count())
            .unwrap_or(0)
    }

    /// Events with at least one live listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let guard = self.channels.lock();
        let mut names: Vec<String> = guard
            .iter()
            .flat_map(|channels| channels.iter())
            .filter(|(_, slots)| slots.iter().any(Slot::is_active))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> HubStats {
        let guard = self.channels.lock();
        let Some(channels) = guard.as_ref() else {
            return HubStats::default();
        };

        let mut stats = HubStats::default();
        for (name, slots) in channels {
            let live = slots.iter().filter(|slot| slot.is_active()).count();
            stats.listeners += live;
            stats.tombstones += slots.len() - live;
            if live > 0 {
                stats.events += 1;
            }
            if *name == self.config.wildcard {
                stats.wildcard_listeners = live;
            }
        }
        stats
    }

    #[cfg(test)]
    fn is_allocated(&self) -> bool {
        self.channels.lock().is_some()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
