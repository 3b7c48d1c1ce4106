use crate::args::Args;
use crate::hub::EventHub;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

/// Result returned by every listener.
pub type ListenerResult = anyhow::Result<()>;

type Callback = dyn Fn(&EventHub, &Args) -> ListenerResult + Send + Sync;

/// Registration id, unique per hub and increasing in registration order.
pub(crate) type ListenerId = u64;

/// A registered unit of behavior.
///
/// Clones share identity: registering the same handle twice creates two
/// slots, and removing by that handle neutralizes the first one still live.
#[derive(Clone)]
pub struct Listener {
    callback: Arc<Callback>,
}

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventHub, &Args) -> ListenerResult + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Wraps `callback` so it runs at most once, after which the wrapper
    /// unregisters itself from `event`.
    pub(crate) fn once(event: String, callback: Listener) -> Self {
        let this: Arc<OnceLock<Weak<Callback>>> = Arc::default();
        let fired = AtomicBool::new(false);

        let wrapper = Listener::new({
            let this = Arc::clone(&this);
            move |hub: &EventHub, args: &Args| {
                if fired.swap(true, Ordering::AcqRel) {
                    return Ok(());
                }
                let result = callback.call(hub, args);
                if let Some(callback) = this.get().and_then(Weak::upgrade) {
                    hub.off(Some(event.as_str()), Some(&Listener { callback }));
                }
                result
            }
        });
        this.set(Arc::downgrade(&wrapper.callback)).ok();
        wrapper
    }

    pub fn call(&self, hub: &EventHub, args: &Args) -> ListenerResult {
        (self.callback)(hub, args)
    }

    pub fn ptr_eq(&self, other: &Listener) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<F> From<F> for Listener
where
    F: Fn(&EventHub, &Args) -> ListenerResult + Send + Sync + 'static,
{
    fn from(callback: F) -> Self {
        Self::new(callback)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Arc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// One position in an event's listener sequence.
///
/// `Removed` keeps the position (and id) of a listener that was taken off
/// while a walk may still be running; the next walk to reach it compacts it.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Active(ListenerId, Listener),
    Removed(ListenerId),
}

impl Slot {
    pub(crate) fn id(&self) -> ListenerId {
        match self {
            Slot::Active(id, _) | Slot::Removed(id) => *id,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self, Slot::Active(..))
    }

    pub(crate) fn holds(&self, listener: &Listener) -> bool {
        matches!(self, Slot::Active(_, current) if current.ptr_eq(listener))
    }
}
